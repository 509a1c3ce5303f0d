//! `code-tools-fs` provides the filesystem operations behind a tool-calling client: directory
//! listing, ASCII tree rendering, glob expansion with recursive `**`, and copy/move/delete/remove
//! with cancellation, result limits and cross-device moves.
//!
//! Every operation takes a serde request record and a [`CancellationToken`] and returns a
//! response record; [`summary`] turns responses into human-readable text.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod config;
mod error;
pub mod ops;
pub mod path_utils;
pub mod pattern;
mod platform;
pub mod summary;

pub use config::{Config, ConfigFormat, Limits, LoggingConfig, load_config, parse_config};
pub use error::{Error, Result};
pub use path_utils::{ResolvedPath, resolve, resolve_from};
pub use pattern::{Pattern, glob_match, match_components};

pub use ops::{
    Context, CopyRequest, CopyResponse, DeleteRequest, DeleteResponse, Entry, EntryKind,
    GlobRequest, GlobResponse, ListDirRequest, ListDirResponse, MovePathRequest,
    MovePathResponse, MoveStrategy, RemoveRequest, RemoveResponse, TraversalLimit, TreeRequest,
    TreeResponse, copy_path, delete, glob_paths, list_dir, move_path, remove, tree,
};
