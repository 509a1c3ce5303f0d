use crate::config::Config;
use crate::path_utils::ResolvedPath;

mod context;
mod copy_path;
mod delete;
mod glob;
mod list_dir;
mod move_path;
pub mod transfer;
pub mod traversal;
mod tree;

pub use copy_path::{CopyRequest, CopyResponse, copy_path};
pub use delete::{
    DeleteRequest, DeleteResponse, RemoveRequest, RemoveResponse, delete, delete_file, remove,
    remove_path,
};
pub use glob::{GlobRequest, GlobResponse, glob_paths};
pub use list_dir::{ListDirRequest, ListDirResponse, list_dir};
pub use move_path::{MovePathRequest, MovePathResponse, move_path};
pub use transfer::{CopyStats, MoveStrategy, TransferPlan, copy_entry, move_entry};
pub use traversal::{Entry, EntryKind, ListOptions, Listing, TraversalLimit, list_entries};
pub use tree::{TreeOptions, TreeRender, TreeRequest, TreeResponse, render_tree, tree};


/// Shared state for every operation: the loaded config and the directory relative request
/// paths resolve against.
#[derive(Debug, Clone)]
pub struct Context {
    config: Config,
    base_dir: ResolvedPath,
}
