mod common;

use std::path::PathBuf;

use code_tools_fs::{DeleteRequest, EntryKind, Error, RemoveRequest};
use common::{mkdir, test_context, write_file};
use tokio_util::sync::CancellationToken;

fn delete_request(path: &str) -> DeleteRequest {
    DeleteRequest {
        path: PathBuf::from(path),
    }
}

fn remove_request(path: &str, recursive: bool) -> RemoveRequest {
    RemoveRequest {
        path: PathBuf::from(path),
        recursive,
    }
}

#[test]
fn delete_removes_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_file(dir.path(), "a.txt", "a");

    let ctx = test_context(dir.path());
    let resp = ctx
        .delete(delete_request("a.txt"), &CancellationToken::new())
        .expect("delete");

    assert_eq!(resp.kind, EntryKind::File);
    assert_eq!(resp.path, file);
    assert!(!file.exists());
}

#[test]
fn delete_refuses_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sub = mkdir(dir.path(), "sub");

    let ctx = test_context(dir.path());
    let err = ctx
        .delete(delete_request("sub"), &CancellationToken::new())
        .expect_err("directory");

    assert!(matches!(err, Error::IsADirectory(_)), "{err:?}");
    assert!(sub.is_dir());
}

#[test]
fn delete_reports_missing_paths() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());
    let err = ctx
        .delete(delete_request("missing.txt"), &CancellationToken::new())
        .expect_err("missing");
    assert!(
        matches!(err, Error::NotFound(ref path) if path.ends_with("missing.txt")),
        "{err:?}"
    );
}

#[test]
fn cancelled_delete_leaves_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_file(dir.path(), "a.txt", "a");
    let ctx = test_context(dir.path());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = ctx
        .delete(delete_request("a.txt"), &cancel)
        .expect_err("cancelled");
    assert_eq!(err.code(), Error::CODE_CANCELLED);
    assert!(file.exists());
}

#[cfg(unix)]
#[test]
fn delete_unlinks_symlinks_without_touching_the_target() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = write_file(dir.path(), "target.txt", "keep");
    let link = dir.path().join("link.txt");
    std::os::unix::fs::symlink(&target, &link).expect("symlink");

    let ctx = test_context(dir.path());
    let resp = ctx
        .delete(delete_request("link.txt"), &CancellationToken::new())
        .expect("delete");

    assert_eq!(resp.kind, EntryKind::Symlink);
    assert!(std::fs::symlink_metadata(&link).is_err());
    assert_eq!(std::fs::read_to_string(&target).expect("read"), "keep");
}

#[cfg(unix)]
#[test]
fn delete_unlinks_dangling_and_directory_symlinks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let real = mkdir(dir.path(), "real");
    std::os::unix::fs::symlink(&real, dir.path().join("dir_link")).expect("symlink");
    std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling"))
        .expect("symlink");

    let ctx = test_context(dir.path());
    let cancel = CancellationToken::new();
    for name in ["dir_link", "dangling"] {
        let resp = ctx.delete(delete_request(name), &cancel).expect("delete");
        assert_eq!(resp.kind, EntryKind::Symlink);
        assert!(std::fs::symlink_metadata(dir.path().join(name)).is_err());
    }
    assert!(real.is_dir());
}

#[test]
fn remove_deletes_files_and_empty_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_file(dir.path(), "a.txt", "a");
    mkdir(dir.path(), "empty");

    let ctx = test_context(dir.path());
    let cancel = CancellationToken::new();

    let resp = ctx
        .remove(remove_request("a.txt", false), &cancel)
        .expect("remove file");
    assert_eq!(resp.kind, EntryKind::File);
    assert!(!resp.recursive);

    let resp = ctx
        .remove(remove_request("empty", false), &cancel)
        .expect("remove dir");
    assert_eq!(resp.kind, EntryKind::Dir);
    assert!(!dir.path().join("empty").exists());
}

#[test]
fn remove_requires_recursive_for_non_empty_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_file(dir.path(), "tree/a/b.txt", "b");

    let ctx = test_context(dir.path());
    let cancel = CancellationToken::new();

    let err = ctx
        .remove(remove_request("tree", false), &cancel)
        .expect_err("non-empty");
    assert!(err.is_underlying(), "{err:?}");
    assert!(dir.path().join("tree/a/b.txt").exists());

    let resp = ctx
        .remove(remove_request("tree", true), &cancel)
        .expect("recursive remove");
    assert!(resp.recursive);
    assert!(!dir.path().join("tree").exists());
}

#[test]
fn remove_refuses_the_filesystem_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());
    let root = if cfg!(windows) { "C:\\" } else { "/" };

    let err = ctx
        .remove(remove_request(root, true), &CancellationToken::new())
        .expect_err("root");
    assert_eq!(err.code(), Error::CODE_INVALID_PATH);
}

#[test]
fn remove_reports_missing_paths() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = test_context(dir.path());
    let err = ctx
        .remove(remove_request("missing", true), &CancellationToken::new())
        .expect_err("missing");
    assert_eq!(err.code(), Error::CODE_NOT_FOUND);
}

#[cfg(unix)]
#[test]
fn recursive_remove_does_not_follow_symlinks_out_of_the_tree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let outside = write_file(dir.path(), "outside/keep.txt", "keep");
    mkdir(dir.path(), "tree");
    std::os::unix::fs::symlink(dir.path().join("outside"), dir.path().join("tree/link"))
        .expect("symlink");

    let ctx = test_context(dir.path());
    ctx.remove(remove_request("tree", true), &CancellationToken::new())
        .expect("remove");

    assert!(!dir.path().join("tree").exists());
    assert_eq!(std::fs::read_to_string(outside).expect("read"), "keep");
}
