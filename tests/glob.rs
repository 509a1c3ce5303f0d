mod common;

use std::path::{Path, PathBuf};

use code_tools_fs::{Error, GlobRequest, GlobResponse};
use common::{mkdir, set_mtime, test_context, test_context_with_max_results, write_file};
use tokio_util::sync::CancellationToken;

fn glob(root: &Path, pattern: &str) -> GlobResponse {
    let ctx = test_context(root);
    ctx.glob_paths(
        GlobRequest {
            pattern: pattern.to_string(),
            path: None,
            limit: None,
        },
        &CancellationToken::new(),
    )
    .expect("glob")
}

fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|path| {
            path.strip_prefix(root)
                .expect("under root")
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn star_matches_within_one_directory_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_file(dir.path(), "a.go", "a");
    write_file(dir.path(), "sub/b.go", "b");
    set_mtime(&dir.path().join("a.go"), 1_000);

    let resp = glob(dir.path(), "*.go");
    assert_eq!(relative(dir.path(), &resp.files), vec!["a.go"]);
    assert!(!resp.truncated);
    assert_eq!(resp.root, dir.path());
}

#[test]
fn recursive_wildcard_matches_every_depth_newest_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let top = write_file(dir.path(), "top.go", "t");
    let mid = write_file(dir.path(), "a/mid.go", "m");
    let deep = write_file(dir.path(), "a/b/c/deep.go", "d");
    write_file(dir.path(), "a/b/skip.txt", "s");
    set_mtime(&top, 1_000);
    set_mtime(&mid, 3_000);
    set_mtime(&deep, 2_000);

    let resp = glob(dir.path(), "**/*.go");
    assert_eq!(
        relative(dir.path(), &resp.files),
        vec!["a/mid.go", "top.go", "a/b/c/deep.go"]
    );
}

#[test]
fn equal_mtimes_are_ordered_by_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in ["c.txt", "a.txt", "b.txt"] {
        let path = write_file(dir.path(), name, name);
        set_mtime(&path, 5_000);
    }

    let resp = glob(dir.path(), "*.txt");
    assert_eq!(
        relative(dir.path(), &resp.files),
        vec!["a.txt", "b.txt", "c.txt"]
    );
}

#[test]
fn recursive_wildcard_in_the_middle_matches_zero_components() {
    let dir = tempfile::tempdir().expect("tempdir");
    let direct = write_file(dir.path(), "src/mod.rs", "m");
    let nested = write_file(dir.path(), "src/a/b/mod.rs", "m");
    write_file(dir.path(), "lib/a/mod.rs", "m");
    set_mtime(&direct, 2_000);
    set_mtime(&nested, 1_000);

    let resp = glob(dir.path(), "src/**/mod.rs");
    assert_eq!(
        relative(dir.path(), &resp.files),
        vec!["src/mod.rs", "src/a/b/mod.rs"]
    );
}

#[test]
fn directories_are_never_returned() {
    let dir = tempfile::tempdir().expect("tempdir");
    mkdir(dir.path(), "match_dir");
    write_file(dir.path(), "match_file", "f");

    let resp = glob(dir.path(), "match_*");
    assert_eq!(relative(dir.path(), &resp.files), vec!["match_file"]);

    let resp = glob(dir.path(), "**");
    assert_eq!(relative(dir.path(), &resp.files), vec!["match_file"]);
}

#[test]
fn literal_components_and_leading_dot_slash_resolve() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_file(dir.path(), "src/a.txt", "a");

    let resp = glob(dir.path(), "./src/*.txt");
    assert_eq!(relative(dir.path(), &resp.files), vec!["src/a.txt"]);

    let resp = glob(dir.path(), "src/a.txt");
    assert_eq!(relative(dir.path(), &resp.files), vec!["src/a.txt"]);

    let resp = glob(dir.path(), "missing/*.txt");
    assert!(resp.files.is_empty());
}

#[test]
fn path_selects_the_search_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_file(dir.path(), "one/a.txt", "a");
    write_file(dir.path(), "two/b.txt", "b");

    let ctx = test_context(dir.path());
    let resp = ctx
        .glob_paths(
            GlobRequest {
                pattern: "*.txt".to_string(),
                path: Some(PathBuf::from("two")),
                limit: None,
            },
            &CancellationToken::new(),
        )
        .expect("glob");
    assert_eq!(resp.root, dir.path().join("two"));
    assert_eq!(relative(&resp.root, &resp.files), vec!["b.txt"]);
}

#[test]
fn limit_keeps_the_newest_matches() {
    let dir = tempfile::tempdir().expect("tempdir");
    for (index, name) in ["a.txt", "b.txt", "c.txt"].into_iter().enumerate() {
        let path = write_file(dir.path(), name, name);
        set_mtime(&path, 1_000 + index as u64);
    }

    let ctx = test_context(dir.path());
    let resp = ctx
        .glob_paths(
            GlobRequest {
                pattern: "*.txt".to_string(),
                path: None,
                limit: Some(2),
            },
            &CancellationToken::new(),
        )
        .expect("glob");
    assert_eq!(relative(dir.path(), &resp.files), vec!["c.txt", "b.txt"]);
    assert!(resp.truncated);

    let capped = test_context_with_max_results(dir.path(), 3);
    let resp = capped
        .glob_paths(
            GlobRequest {
                pattern: "*.txt".to_string(),
                path: None,
                limit: None,
            },
            &CancellationToken::new(),
        )
        .expect("glob");
    assert_eq!(resp.files.len(), 3);
    assert!(!resp.truncated);
}

#[test]
fn invalid_and_empty_patterns_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());
    let cancel = CancellationToken::new();

    for pattern in ["", "   ", "[abc", "../*.txt"] {
        let err = ctx
            .glob_paths(
                GlobRequest {
                    pattern: pattern.to_string(),
                    path: None,
                    limit: None,
                },
                &cancel,
            )
            .expect_err("invalid pattern");
        assert!(
            matches!(err, Error::InvalidPattern { .. }),
            "{pattern:?}: {err:?}"
        );
    }
}

#[test]
fn glob_rejects_a_missing_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());
    let err = ctx
        .glob_paths(
            GlobRequest {
                pattern: "*".to_string(),
                path: Some(PathBuf::from("nope")),
                limit: None,
            },
            &CancellationToken::new(),
        )
        .expect_err("missing root");
    assert_eq!(err.code(), Error::CODE_NOT_FOUND);
}

#[cfg(unix)]
#[test]
fn recursive_glob_skips_unreadable_directories() {
    if common::skip_when_root("recursive_glob_skips_unreadable_directories") {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let locked = mkdir(dir.path(), "locked");
    write_file(dir.path(), "locked/a.txt", "a");
    write_file(dir.path(), "open/b.txt", "b");
    let _guard = common::PermissionRestoreGuard::set(&locked, 0o000);

    let resp = glob(dir.path(), "**/*.txt");
    assert_eq!(relative(dir.path(), &resp.files), vec!["open/b.txt"]);
}

#[cfg(unix)]
#[test]
fn recursive_glob_does_not_follow_directory_symlinks() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_file(dir.path(), "real/a.txt", "a");
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link"))
        .expect("symlink");

    let resp = glob(dir.path(), "**/*.txt");
    assert_eq!(relative(dir.path(), &resp.files), vec!["real/a.txt"]);
}
