//! Copy and move engine shared by the `copy` and `move` operations.
//!
//! Every transfer starts from a [`TransferPlan`] that is validated before anything on disk
//! changes:
//! - the source must exist (`lstat`, so a dangling symlink still counts);
//! - an existing destination is an error unless `overwrite` is set, in which case it is
//!   removed entirely before the transfer;
//! - source and destination must not be the same entry or nested inside each other.
//!
//! Files are written to a temporary sibling and persisted into place, so a destination file is
//! either absent or complete. Moves try an atomic rename first and fall back to copy + remove
//! when the rename would cross filesystems.
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::path_utils::ResolvedPath;
use crate::platform::rename;

use super::delete::remove_existing;
use super::traversal::check_cancelled;

const TEMP_PREFIX: &str = ".code-tools-fs.";
const TEMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Clone)]
pub struct TransferPlan {
    pub source: ResolvedPath,
    pub destination: ResolvedPath,
    pub overwrite: bool,
}

/// What validation learned about the two ends of a plan.
#[derive(Debug)]
pub(crate) struct CheckedPlan {
    source_meta: fs::Metadata,
    destination_meta: Option<fs::Metadata>,
}

impl TransferPlan {
    pub fn new(source: ResolvedPath, destination: ResolvedPath, overwrite: bool) -> Self {
        Self {
            source,
            destination,
            overwrite,
        }
    }

    /// Validates the plan without touching the filesystem beyond `lstat`.
    pub(crate) fn check(&self) -> Result<CheckedPlan> {
        let source_meta = fs::symlink_metadata(self.source.as_path())
            .map_err(|err| Error::io_path_or_missing("metadata", self.source.as_path(), err))?;

        let destination_meta = match fs::symlink_metadata(self.destination.as_path()) {
            Ok(meta) => Some(meta),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(Error::io_path("metadata", self.destination.as_path(), err)),
        };
        if destination_meta.is_some() && !self.overwrite {
            return Err(Error::AlreadyExists(self.destination.to_path_buf()));
        }

        if self.destination.is_within(&self.source) {
            return Err(Error::InvalidPath(format!(
                "destination {} is the source or lies inside it",
                self.destination
            )));
        }
        if self.source.is_within(&self.destination) {
            return Err(Error::InvalidPath(format!(
                "destination {} contains the source {}",
                self.destination, self.source
            )));
        }
        if self.destination.parent().is_none() {
            return Err(Error::InvalidPath(format!(
                "destination {} has no parent directory",
                self.destination
            )));
        }

        Ok(CheckedPlan {
            source_meta,
            destination_meta,
        })
    }

    /// Removes an existing destination (overwrite) and creates missing parent directories.
    fn prepare_destination(&self, checked: &CheckedPlan) -> Result<()> {
        let destination = self.destination.as_path();
        if let Some(meta) = &checked.destination_meta {
            tracing::debug!(destination = %self.destination, "removing destination before overwrite");
            remove_existing(destination, meta)
                .map_err(|err| Error::io_path("remove", destination, err))?;
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|err| Error::io_path("create_dir", parent, err))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyStats {
    pub files: u64,
    pub bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStrategy {
    Rename,
    CopyAndRemove,
}

impl MoveStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rename => "rename",
            Self::CopyAndRemove => "copy_and_remove",
        }
    }
}

/// Copies the plan's source to its destination.
pub fn copy_entry(plan: &TransferPlan, cancel: &CancellationToken) -> Result<CopyStats> {
    check_cancelled(cancel)?;
    let checked = plan.check()?;
    plan.prepare_destination(&checked)?;
    let stats = copy_or_clean_up(plan, &checked.source_meta, cancel)?;
    tracing::debug!(
        source = %plan.source,
        destination = %plan.destination,
        files = stats.files,
        bytes = stats.bytes,
        "copied"
    );
    Ok(stats)
}

/// Moves the plan's source to its destination and reports which strategy ran.
pub fn move_entry(plan: &TransferPlan, cancel: &CancellationToken) -> Result<MoveStrategy> {
    move_entry_with(plan, cancel, MoveHooks::SYSTEM)
}

/// Filesystem primitives used by a move; swapped out in tests to simulate other devices.
#[derive(Clone, Copy)]
pub(crate) struct MoveHooks {
    pub(crate) same_device: fn(&Path, &Path) -> io::Result<Option<bool>>,
    pub(crate) rename: fn(&Path, &Path) -> io::Result<()>,
    pub(crate) remove_source: fn(&Path) -> io::Result<()>,
}

impl MoveHooks {
    pub(crate) const SYSTEM: Self = Self {
        same_device: rename::same_device,
        rename: rename::rename_synced,
        remove_source: remove_source_tree,
    };
}

pub(crate) fn move_entry_with(
    plan: &TransferPlan,
    cancel: &CancellationToken,
    hooks: MoveHooks,
) -> Result<MoveStrategy> {
    check_cancelled(cancel)?;
    let checked = plan.check()?;
    let source = plan.source.as_path();
    let destination = plan.destination.as_path();

    let same_device = match (hooks.same_device)(source, destination) {
        Ok(same) => same,
        Err(err) => {
            tracing::debug!(source = %plan.source, error = %err, "device pre-check unavailable");
            None
        }
    };
    plan.prepare_destination(&checked)?;

    if same_device != Some(false) {
        match (hooks.rename)(source, destination) {
            Ok(()) => {
                tracing::debug!(source = %plan.source, destination = %plan.destination, "moved by rename");
                return Ok(MoveStrategy::Rename);
            }
            Err(err) if rename::is_cross_device(&err) => {
                tracing::debug!(source = %plan.source, "rename crosses devices; copying instead");
            }
            Err(err) => return Err(Error::io_path("rename", source, err)),
        }
    } else {
        tracing::debug!(source = %plan.source, "source and destination are on different devices");
    }

    let stats = copy_or_clean_up(plan, &checked.source_meta, cancel)?;
    if let Err(err) = (hooks.remove_source)(source) {
        return Err(Error::PartialFailure {
            source_path: source.to_path_buf(),
            destination: destination.to_path_buf(),
            source: err,
        });
    }
    tracing::debug!(
        source = %plan.source,
        destination = %plan.destination,
        files = stats.files,
        bytes = stats.bytes,
        "moved by copy and remove"
    );
    Ok(MoveStrategy::CopyAndRemove)
}

fn remove_source_tree(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    remove_existing(path, &meta)
}

/// Runs the copy; on failure removes whatever part of the destination was written.
fn copy_or_clean_up(
    plan: &TransferPlan,
    source_meta: &fs::Metadata,
    cancel: &CancellationToken,
) -> Result<CopyStats> {
    let result = copy_tree(
        plan.source.as_path(),
        plan.destination.as_path(),
        source_meta,
        cancel,
        &mut |_| {},
    );
    if result.is_err() {
        discard_partial(plan.destination.as_path());
    }
    result
}

fn discard_partial(destination: &Path) {
    let Ok(meta) = fs::symlink_metadata(destination) else {
        return;
    };
    if let Err(err) = remove_existing(destination, &meta) {
        tracing::warn!(
            destination = %destination.display(),
            error = %err,
            "failed to remove partially copied destination"
        );
    }
}

/// Copies `source` to `destination`: directories recursively in pre-order, everything else as
/// a single file whose content is read through any symlink. `on_file` runs after each file.
pub(crate) fn copy_tree(
    source: &Path,
    destination: &Path,
    source_meta: &fs::Metadata,
    cancel: &CancellationToken,
    on_file: &mut dyn FnMut(&Path),
) -> Result<CopyStats> {
    let mut stats = CopyStats::default();
    if !source_meta.is_dir() {
        check_cancelled(cancel)?;
        stats.bytes = copy_file(source, destination)?;
        stats.files = 1;
        on_file(destination);
        return Ok(stats);
    }

    for item in WalkDir::new(source).follow_links(false).sort_by_file_name() {
        let entry = item?;
        let relative = entry.path().strip_prefix(source).map_err(|_| {
            Error::InvalidPath(format!(
                "walked path {} escaped {}",
                entry.path().display(),
                source.display()
            ))
        })?;
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|err| Error::io_path("create_dir", &target, err))?;
            continue;
        }
        check_cancelled(cancel)?;
        stats.bytes = stats.bytes.saturating_add(copy_file(entry.path(), &target)?);
        stats.files = stats.files.saturating_add(1);
        on_file(&target);
    }
    Ok(stats)
}

fn copy_file(source: &Path, destination: &Path) -> Result<u64> {
    let mut input =
        fs::File::open(source).map_err(|err| Error::io_path("open", source, err))?;
    let permissions = input
        .metadata()
        .map_err(|err| Error::io_path("metadata", source, err))?
        .permissions();
    let parent = destination.parent().ok_or_else(|| {
        Error::InvalidPath(format!(
            "destination {} has no parent directory",
            destination.display()
        ))
    })?;

    let mut tmp_file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(parent)
        .map_err(|err| Error::io_path("create_temp", destination, err))?;
    let bytes = io::copy(&mut input, tmp_file.as_file_mut())
        .map_err(|err| Error::io_path("copy", source, err))?;
    tmp_file
        .as_file()
        .set_permissions(permissions)
        .map_err(|err| Error::io_path("set_permissions", destination, err))?;
    tmp_file
        .persist(destination)
        .map_err(|err| Error::io_path("persist", destination, err.error))?;
    Ok(bytes)
}
