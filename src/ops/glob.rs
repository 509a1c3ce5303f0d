use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::path_utils::ResolvedPath;
use crate::pattern::{Pattern, PatternToken};

use super::Context;
use super::traversal::{TraversalLimit, check_cancelled, ensure_directory};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobRequest {
    pub pattern: String,
    /// Directory to search in. Absent => the context base directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobResponse {
    pub root: PathBuf,
    /// Matching non-directory paths, newest first.
    pub files: Vec<PathBuf>,
    pub truncated: bool,
}

struct GlobMatch {
    path: PathBuf,
    modified: SystemTime,
}

pub fn glob_paths(
    ctx: &Context,
    request: GlobRequest,
    cancel: &CancellationToken,
) -> Result<GlobResponse> {
    if request.pattern.trim().is_empty() {
        return Err(Error::InvalidPattern {
            pattern: request.pattern,
            message: "pattern must not be empty".to_string(),
        });
    }
    let pattern = Pattern::new(&request.pattern)?;
    let root = match &request.path {
        Some(path) => ctx.resolve(path)?,
        None => ctx.base_dir().clone(),
    };
    let limit = ctx.config().effective_limit(request.limit);
    let (files, truncated) = glob_under(&root, &pattern, limit, cancel)?;
    Ok(GlobResponse {
        root: root.into_path_buf(),
        files,
        truncated,
    })
}

/// Expands `pattern` beneath `root`, dropping directories.
///
/// Patterns without `**` are expanded one component at a time; patterns with `**` walk the
/// whole tree without following symlinks. Results are ordered by modification time (newest
/// first, ties by path) and then cut to `limit`.
pub(crate) fn glob_under(
    root: &ResolvedPath,
    pattern: &Pattern,
    limit: TraversalLimit,
    cancel: &CancellationToken,
) -> Result<(Vec<PathBuf>, bool)> {
    check_cancelled(cancel)?;
    ensure_directory(root)?;

    let candidates = if pattern.requires_tree_walk() {
        walk_matches(root, pattern, cancel)?
    } else {
        expand_components(root, pattern, cancel)?
    };

    let mut matches = Vec::with_capacity(candidates.len());
    for path in candidates {
        check_cancelled(cancel)?;
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };
        if meta.is_dir() {
            continue;
        }
        matches.push(GlobMatch {
            path,
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }
    matches.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.path.cmp(&b.path))
    });

    let truncated = limit
        .get()
        .is_some_and(|limit| matches.len() > limit);
    if let Some(limit) = limit.get() {
        matches.truncate(limit);
    }
    tracing::debug!(
        root = %root,
        pattern = pattern.as_str(),
        matches = matches.len(),
        truncated,
        "expanded glob"
    );
    Ok((matches.into_iter().map(|m| m.path).collect(), truncated))
}

fn expand_components(
    root: &ResolvedPath,
    pattern: &Pattern,
    cancel: &CancellationToken,
) -> Result<Vec<PathBuf>> {
    let mut candidates = vec![root.to_path_buf()];
    for token in pattern.tokens() {
        let PatternToken::Component(token) = token else {
            // Recursive patterns take the walk path.
            continue;
        };
        let mut next = Vec::new();
        for dir in &candidates {
            check_cancelled(cancel)?;
            if token.is_literal() {
                let candidate = dir.join(token.as_str());
                if fs::symlink_metadata(&candidate).is_ok() {
                    next.push(candidate);
                }
                continue;
            }
            let Ok(rows) = fs::read_dir(dir) else {
                continue;
            };
            let mut matched = rows
                .filter_map(|row| row.ok())
                .filter(|row| token.is_match(&row.file_name().to_string_lossy()))
                .map(|row| row.path())
                .collect::<Vec<_>>();
            matched.sort();
            next.append(&mut matched);
        }
        candidates = next;
        if candidates.is_empty() {
            break;
        }
    }
    Ok(candidates)
}

fn walk_matches(
    root: &ResolvedPath,
    pattern: &Pattern,
    cancel: &CancellationToken,
) -> Result<Vec<PathBuf>> {
    let mut matches = Vec::new();
    for item in WalkDir::new(root.as_path())
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        check_cancelled(cancel)?;
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root.as_path()) else {
            continue;
        };
        if pattern.matches(relative) {
            matches.push(entry.into_path());
        }
    }
    Ok(matches)
}
