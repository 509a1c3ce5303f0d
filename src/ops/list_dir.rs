use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

use super::Context;
use super::traversal::{Entry, ListOptions, list_entries};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDirRequest {
    pub path: PathBuf,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub show_hidden: bool,
    /// `0`/absent => the configured cap (unbounded when none is configured).
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDirResponse {
    pub path: PathBuf,
    pub entries: Vec<Entry>,
    pub truncated: bool,
    pub skipped_io_errors: u64,
}

/// Lists a directory. Entries come back directories first, then by path.
pub fn list_dir(
    ctx: &Context,
    request: ListDirRequest,
    cancel: &CancellationToken,
) -> Result<ListDirResponse> {
    let root = ctx.resolve(&request.path)?;
    let options = ListOptions {
        recursive: request.recursive,
        show_hidden: request.show_hidden,
        limit: ctx.config().effective_limit(request.limit),
    };
    let listing = list_entries(&root, options, cancel)?;

    let mut entries = listing.entries;
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.path.cmp(&b.path)));

    Ok(ListDirResponse {
        path: root.into_path_buf(),
        entries,
        truncated: listing.truncated,
        skipped_io_errors: listing.skipped_io_errors,
    })
}
