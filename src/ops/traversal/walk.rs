use std::fs;

use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::path_utils::ResolvedPath;

use super::{Entry, TraversalLimit, check_cancelled, ensure_directory, is_hidden};

#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    pub recursive: bool,
    pub show_hidden: bool,
    pub limit: TraversalLimit,
}

#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub entries: Vec<Entry>,
    /// The limit was reached and the walk stopped early.
    pub truncated: bool,
    pub skipped_io_errors: u64,
}

impl Listing {
    /// Pushes an entry and reports whether the walk must stop.
    fn push(&mut self, entry: Entry, limit: TraversalLimit) -> bool {
        self.entries.push(entry);
        if limit.is_reached(self.entries.len()) {
            self.truncated = true;
            return true;
        }
        false
    }

    fn skip_io_error(&mut self) {
        self.skipped_io_errors = self.skipped_io_errors.saturating_add(1);
    }
}

/// Lists the nodes under `root` (the root itself excluded).
///
/// Recursive listings are depth-first pre-order with siblings sorted by file name; flat
/// listings are the immediate children sorted by file name. Hidden entries are skipped unless
/// `show_hidden` is set, and hidden directories are not descended into. Unreadable entries are
/// counted in [`Listing::skipped_io_errors`] and otherwise ignored.
pub fn list_entries(
    root: &ResolvedPath,
    options: ListOptions,
    cancel: &CancellationToken,
) -> Result<Listing> {
    list_entries_observed(root, options, cancel, |_| {})
}

/// Like [`list_entries`], calling `on_entry` after each entry is collected.
pub(crate) fn list_entries_observed(
    root: &ResolvedPath,
    options: ListOptions,
    cancel: &CancellationToken,
    mut on_entry: impl FnMut(&Entry),
) -> Result<Listing> {
    check_cancelled(cancel)?;
    ensure_directory(root)?;

    let listing = if options.recursive {
        walk_recursive(root, options, cancel, &mut on_entry)?
    } else {
        read_immediate(root, options, cancel, &mut on_entry)?
    };
    tracing::debug!(
        root = %root,
        recursive = options.recursive,
        entries = listing.entries.len(),
        truncated = listing.truncated,
        skipped_io_errors = listing.skipped_io_errors,
        "listed directory"
    );
    Ok(listing)
}

fn walk_recursive(
    root: &ResolvedPath,
    options: ListOptions,
    cancel: &CancellationToken,
    on_entry: &mut dyn FnMut(&Entry),
) -> Result<Listing> {
    let mut listing = Listing::default();
    let show_hidden = options.show_hidden;
    let walker = WalkDir::new(root.as_path())
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| {
            entry.depth() == 0 || show_hidden || !is_hidden(entry.file_name())
        });

    for item in walker {
        check_cancelled(cancel)?;
        let entry = match item {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(Error::WalkDir(err)),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                listing.skip_io_error();
                continue;
            }
        };
        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), error = %err, "skipping entry without metadata");
                listing.skip_io_error();
                continue;
            }
        };
        let entry = Entry::from_metadata(entry.into_path(), &meta);
        on_entry(&entry);
        if listing.push(entry, options.limit) {
            break;
        }
    }
    Ok(listing)
}

fn read_immediate(
    root: &ResolvedPath,
    options: ListOptions,
    cancel: &CancellationToken,
    on_entry: &mut dyn FnMut(&Entry),
) -> Result<Listing> {
    let mut listing = Listing::default();
    let mut rows = Vec::new();
    for row in
        fs::read_dir(root.as_path()).map_err(|err| Error::io_path("read_dir", root.as_path(), err))?
    {
        match row {
            Ok(row) => rows.push(row),
            Err(err) => {
                tracing::warn!(root = %root, error = %err, "skipping unreadable entry");
                listing.skip_io_error();
            }
        }
    }
    rows.sort_by_key(|row| row.file_name());

    for row in rows {
        check_cancelled(cancel)?;
        if !options.show_hidden && is_hidden(&row.file_name()) {
            continue;
        }
        let meta = match row.metadata() {
            Ok(meta) => meta,
            Err(err) => {
                tracing::warn!(path = %row.path().display(), error = %err, "skipping entry without metadata");
                listing.skip_io_error();
                continue;
            }
        };
        let entry = Entry::from_metadata(row.path(), &meta);
        on_entry(&entry);
        if listing.push(entry, options.limit) {
            break;
        }
    }
    Ok(listing)
}
