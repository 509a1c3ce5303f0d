use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::path_utils::ResolvedPath;

use super::Context;
use super::traversal::{TraversalLimit, check_cancelled, ensure_directory, is_hidden};

const BRANCH: &str = "|-- ";
const LAST_BRANCH: &str = "\\-- ";
const PIPE_INDENT: &str = "|   ";
const BLANK_INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeOptions {
    /// `0` => unlimited.
    pub max_depth: usize,
    pub show_hidden: bool,
    pub limit: TraversalLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRender {
    pub text: String,
    pub nodes: usize,
    pub truncated: bool,
}

/// Renders `root` as an ASCII tree.
///
/// The first line is the root path; children follow in the order the OS enumerates them.
/// Unreadable subdirectories contribute no lines; an unreadable root is an error. Hitting the
/// node limit stops the whole render and marks it truncated.
pub fn render_tree(
    root: &ResolvedPath,
    options: TreeOptions,
    cancel: &CancellationToken,
) -> Result<TreeRender> {
    check_cancelled(cancel)?;
    ensure_directory(root)?;

    let mut renderer = TreeRenderer {
        text: format!("{root}\n"),
        nodes: 0,
        options,
        cancel,
    };
    // Only the node limit breaks out of the walk.
    let truncated = renderer.walk(root.as_path(), "", 1)?.is_break();

    let TreeRenderer { mut text, nodes, .. } = renderer;
    let trimmed = text.trim_end_matches('\n').len();
    text.truncate(trimmed);
    tracing::debug!(root = %root, nodes, truncated, "rendered tree");
    Ok(TreeRender {
        text,
        nodes,
        truncated,
    })
}

struct TreeRenderer<'a> {
    text: String,
    nodes: usize,
    options: TreeOptions,
    cancel: &'a CancellationToken,
}

impl TreeRenderer<'_> {
    fn walk(&mut self, dir: &Path, prefix: &str, depth: usize) -> Result<ControlFlow<()>> {
        check_cancelled(self.cancel)?;
        if self.options.max_depth > 0 && depth > self.options.max_depth {
            return Ok(ControlFlow::Continue(()));
        }

        let rows = match fs::read_dir(dir) {
            Ok(rows) => rows,
            Err(err) if depth == 1 => return Err(Error::io_path("read_dir", dir, err)),
            Err(err) => {
                tracing::debug!(dir = %dir.display(), error = %err, "skipping unreadable directory");
                return Ok(ControlFlow::Continue(()));
            }
        };
        let children = rows
            .filter_map(|row| row.ok())
            .filter(|row| self.options.show_hidden || !is_hidden(&row.file_name()))
            .collect::<Vec<_>>();

        for (index, child) in children.iter().enumerate() {
            check_cancelled(self.cancel)?;
            if self.options.limit.is_reached(self.nodes) {
                return Ok(ControlFlow::Break(()));
            }

            let is_last = index + 1 == children.len();
            let (connector, indent) = if is_last {
                (LAST_BRANCH, BLANK_INDENT)
            } else {
                (BRANCH, PIPE_INDENT)
            };
            let is_dir = child.file_type().is_ok_and(|file_type| file_type.is_dir());

            self.text.push_str(prefix);
            self.text.push_str(connector);
            self.text.push_str(&child.file_name().to_string_lossy());
            if is_dir {
                self.text.push('/');
            }
            self.text.push('\n');
            self.nodes += 1;

            if is_dir {
                let child_prefix = format!("{prefix}{indent}");
                if self
                    .walk(&child.path(), &child_prefix, depth + 1)?
                    .is_break()
                {
                    return Ok(ControlFlow::Break(()));
                }
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeRequest {
    pub path: PathBuf,
    /// Absent => `limits.default_tree_depth`; `0` => unlimited.
    #[serde(default)]
    pub depth: Option<usize>,
    #[serde(default)]
    pub show_hidden: bool,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResponse {
    pub path: PathBuf,
    pub tree: String,
    pub nodes: usize,
    pub truncated: bool,
}

pub fn tree(ctx: &Context, request: TreeRequest, cancel: &CancellationToken) -> Result<TreeResponse> {
    let root = ctx.resolve(&request.path)?;
    let options = TreeOptions {
        max_depth: request
            .depth
            .unwrap_or(ctx.config().limits.default_tree_depth),
        show_hidden: request.show_hidden,
        limit: ctx.config().effective_limit(request.limit),
    };
    let render = render_tree(&root, options, cancel)?;
    Ok(TreeResponse {
        path: root.into_path_buf(),
        tree: render.text,
        nodes: render.nodes,
        truncated: render.truncated,
    })
}
