use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::path_utils::ResolvedPath;

use super::Context;
use super::traversal::{EntryKind, check_cancelled};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub path: PathBuf,
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveResponse {
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub recursive: bool,
}

fn unlink_symlink(target: &Path) -> std::io::Result<()> {
    #[cfg(windows)]
    {
        match fs::remove_file(target) {
            Ok(()) => Ok(()),
            // Directory symlinks and junctions need remove_dir on Windows.
            Err(remove_file_err) => match fs::remove_dir(target) {
                Ok(()) => Ok(()),
                Err(_) => Err(remove_file_err),
            },
        }
    }

    #[cfg(not(windows))]
    {
        fs::remove_file(target)
    }
}

/// Removes an entry whose `lstat` metadata is `meta`: directories with everything below them,
/// symlinks without touching their target.
pub(crate) fn remove_existing(path: &Path, meta: &fs::Metadata) -> std::io::Result<()> {
    let file_type = meta.file_type();
    if file_type.is_dir() {
        fs::remove_dir_all(path)
    } else if file_type.is_symlink() {
        unlink_symlink(path)
    } else {
        fs::remove_file(path)
    }
}

fn lstat_existing(path: &ResolvedPath) -> Result<fs::Metadata> {
    fs::symlink_metadata(path.as_path())
        .map_err(|err| Error::io_path_or_missing("metadata", path.as_path(), err))
}

/// Deletes a single non-directory entry. A symlink is unlinked, never followed.
pub fn delete_file(path: &ResolvedPath) -> Result<EntryKind> {
    let meta = lstat_existing(path)?;
    let kind = EntryKind::from_file_type(meta.file_type());
    let removed = match kind {
        EntryKind::Dir => return Err(Error::IsADirectory(path.to_path_buf())),
        EntryKind::Symlink => unlink_symlink(path.as_path()),
        EntryKind::File | EntryKind::Other => fs::remove_file(path.as_path()),
    };
    removed.map_err(|err| Error::io_path("remove_file", path.as_path(), err))?;
    tracing::debug!(path = %path, kind = kind.as_str(), "deleted");
    Ok(kind)
}

/// Removes a file, symlink or directory. Non-empty directories need `recursive`.
pub fn remove_path(path: &ResolvedPath, recursive: bool) -> Result<EntryKind> {
    if path.parent().is_none() {
        return Err(Error::InvalidPath(format!(
            "refusing to remove the filesystem root {path}"
        )));
    }
    let meta = lstat_existing(path)?;
    let kind = EntryKind::from_file_type(meta.file_type());
    match kind {
        EntryKind::Dir if recursive => fs::remove_dir_all(path.as_path())
            .map_err(|err| Error::io_path("remove_dir_all", path.as_path(), err))?,
        EntryKind::Dir => fs::remove_dir(path.as_path())
            .map_err(|err| Error::io_path("remove_dir", path.as_path(), err))?,
        _ => remove_existing(path.as_path(), &meta)
            .map_err(|err| Error::io_path("remove_file", path.as_path(), err))?,
    }
    tracing::debug!(path = %path, kind = kind.as_str(), recursive, "removed");
    Ok(kind)
}

pub fn delete(
    ctx: &Context,
    request: DeleteRequest,
    cancel: &CancellationToken,
) -> Result<DeleteResponse> {
    check_cancelled(cancel)?;
    let path = ctx.resolve(&request.path)?;
    let kind = delete_file(&path)?;
    Ok(DeleteResponse {
        path: path.into_path_buf(),
        kind,
    })
}

pub fn remove(
    ctx: &Context,
    request: RemoveRequest,
    cancel: &CancellationToken,
) -> Result<RemoveResponse> {
    check_cancelled(cancel)?;
    let path = ctx.resolve(&request.path)?;
    let kind = remove_path(&path, request.recursive)?;
    Ok(RemoveResponse {
        path: path.into_path_buf(),
        kind,
        recursive: request.recursive,
    })
}
