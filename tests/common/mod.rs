#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use code_tools_fs::{Config, Context};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub fn test_config(base_dir: &Path) -> Config {
    Config {
        base_dir: Some(base_dir.to_path_buf()),
        ..Config::default()
    }
}

pub fn test_context(base_dir: &Path) -> Context {
    Context::new(test_config(base_dir)).expect("ctx")
}

pub fn test_context_with_max_results(base_dir: &Path, max_results: usize) -> Context {
    let mut config = test_config(base_dir);
    config.limits.max_results = Some(max_results);
    Context::new(config).expect("ctx")
}

/// Writes `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(&path, content).expect("write");
    path
}

pub fn mkdir(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(&path).expect("mkdir");
    path
}

/// Sets a file's modification time to `secs` after the Unix epoch.
pub fn set_mtime(path: &Path, secs: u64) {
    let file = fs::OpenOptions::new()
        .write(true)
        .open(path)
        .expect("open for mtime");
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .expect("set mtime");
}

/// Collects every path under `root` (relative, `/`-separated) with file contents, sorted.
pub fn snapshot(root: &Path) -> Vec<(String, Option<Vec<u8>>)> {
    let mut out = Vec::new();
    collect(root, root, &mut out);
    out.sort();
    out
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<(String, Option<Vec<u8>>)>) {
    for entry in fs::read_dir(dir).expect("read_dir") {
        let entry = entry.expect("entry");
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .expect("relative")
            .to_string_lossy()
            .replace('\\', "/");
        let file_type = entry.file_type().expect("file_type");
        if file_type.is_dir() {
            out.push((relative, None));
            collect(root, &path, out);
        } else {
            out.push((relative, Some(fs::read(&path).expect("read"))));
        }
    }
}

#[cfg(unix)]
pub fn is_running_as_root() -> bool {
    // SAFETY: `geteuid` has no preconditions and does not dereference pointers.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(unix)]
pub fn skip_when_root(test_name: &str) -> bool {
    if is_running_as_root() {
        eprintln!("{test_name} skipped: requires non-root to validate permission-denied behavior");
        return true;
    }
    false
}

#[cfg(unix)]
pub struct PermissionRestoreGuard {
    path: PathBuf,
    mode: u32,
}

#[cfg(unix)]
impl PermissionRestoreGuard {
    pub fn set(path: &Path, mode: u32) -> Self {
        let prev = fs::symlink_metadata(path)
            .expect("stat before chmod")
            .permissions()
            .mode()
            & 0o777;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).expect("chmod");
        Self {
            path: path.to_path_buf(),
            mode: prev,
        }
    }
}

#[cfg(unix)]
impl Drop for PermissionRestoreGuard {
    fn drop(&mut self) {
        if let Err(err) = fs::set_permissions(&self.path, fs::Permissions::from_mode(self.mode)) {
            eprintln!(
                "failed to restore permissions for {}: {err}",
                self.path.display()
            );
        }
    }
}
