use std::ffi::OsStr;
use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::path_utils::ResolvedPath;

mod walk;

pub use walk::{ListOptions, Listing, list_entries};
#[cfg(test)]
pub(crate) use walk::list_entries_observed;

/// Node kind as reported by `lstat`; symlinks are never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Other,
}

impl EntryKind {
    pub fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Dir
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
            Self::Symlink => "symlink",
            Self::Other => "other",
        }
    }
}

/// One filesystem node found by a traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size_bytes: u64,
    pub mode: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_ms: Option<u64>,
}

impl Entry {
    pub(crate) fn from_metadata(path: PathBuf, meta: &fs::Metadata) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = EntryKind::from_file_type(meta.file_type());
        Self {
            path,
            name,
            is_dir: kind == EntryKind::Dir,
            kind,
            size_bytes: meta.len(),
            mode: permission_mode(meta),
            modified_ms: modified_ms(meta),
        }
    }
}

/// Result-count bound for list/tree/glob. Zero means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalLimit(Option<NonZeroUsize>);

impl TraversalLimit {
    pub fn new(limit: usize) -> Self {
        Self(NonZeroUsize::new(limit))
    }

    pub const fn unbounded() -> Self {
        Self(None)
    }

    pub fn get(self) -> Option<usize> {
        self.0.map(NonZeroUsize::get)
    }

    pub fn is_reached(self, count: usize) -> bool {
        self.0.is_some_and(|limit| count >= limit.get())
    }
}

impl From<Option<usize>> for TraversalLimit {
    fn from(value: Option<usize>) -> Self {
        Self::new(value.unwrap_or(0))
    }
}

pub(crate) fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().first() == Some(&b'.')
}

pub(crate) fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Stats `root` (following a symlinked root) and requires a directory.
pub(crate) fn ensure_directory(root: &ResolvedPath) -> Result<()> {
    let meta = fs::metadata(root.as_path())
        .map_err(|err| Error::io_path_or_missing("metadata", root.as_path(), err))?;
    if !meta.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

#[cfg(unix)]
fn permission_mode(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    meta.permissions().mode()
}

#[cfg(not(unix))]
fn permission_mode(meta: &fs::Metadata) -> u32 {
    let mut mode = if meta.permissions().readonly() {
        0o444
    } else {
        0o666
    };
    if meta.is_dir() {
        mode |= 0o111;
    }
    mode
}

fn modified_ms(meta: &fs::Metadata) -> Option<u64> {
    let since_epoch = meta.modified().ok()?.duration_since(UNIX_EPOCH).ok()?;
    Some(u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX))
}
