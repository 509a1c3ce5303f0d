use std::fs;
use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::path_utils::{self, ResolvedPath};

use super::{
    Context, CopyRequest, CopyResponse, DeleteRequest, DeleteResponse, GlobRequest, GlobResponse,
    ListDirRequest, ListDirResponse, MovePathRequest, MovePathResponse, RemoveRequest,
    RemoveResponse, TreeRequest, TreeResponse,
};

impl Context {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let base_dir = match &config.base_dir {
            Some(dir) => {
                let meta = fs::metadata(dir).map_err(|err| {
                    Error::InvalidConfig(format!(
                        "failed to stat base_dir {}: {err}",
                        dir.display()
                    ))
                })?;
                if !meta.is_dir() {
                    return Err(Error::InvalidConfig(format!(
                        "base_dir {} is not a directory",
                        dir.display()
                    )));
                }
                path_utils::resolve(dir)?
            }
            None => path_utils::resolve(".")?,
        };
        tracing::debug!(base_dir = %base_dir, "context ready");

        Ok(Self { config, base_dir })
    }

    pub fn from_config_path(path: impl AsRef<Path>) -> Result<Self> {
        let config = crate::config::load_config(path)?;
        Self::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory that relative request paths resolve against.
    pub fn base_dir(&self) -> &ResolvedPath {
        &self.base_dir
    }

    pub fn resolve(&self, raw: impl AsRef<Path>) -> Result<ResolvedPath> {
        path_utils::resolve_from(self.base_dir.as_path(), raw)
    }

    pub fn list_dir(
        &self,
        request: ListDirRequest,
        cancel: &CancellationToken,
    ) -> Result<ListDirResponse> {
        super::list_dir(self, request, cancel)
    }

    pub fn tree(&self, request: TreeRequest, cancel: &CancellationToken) -> Result<TreeResponse> {
        super::tree(self, request, cancel)
    }

    pub fn glob_paths(
        &self,
        request: GlobRequest,
        cancel: &CancellationToken,
    ) -> Result<GlobResponse> {
        super::glob_paths(self, request, cancel)
    }

    pub fn copy_path(&self, request: CopyRequest, cancel: &CancellationToken) -> Result<CopyResponse> {
        super::copy_path(self, request, cancel)
    }

    pub fn move_path(
        &self,
        request: MovePathRequest,
        cancel: &CancellationToken,
    ) -> Result<MovePathResponse> {
        super::move_path(self, request, cancel)
    }

    pub fn delete(&self, request: DeleteRequest, cancel: &CancellationToken) -> Result<DeleteResponse> {
        super::delete(self, request, cancel)
    }

    pub fn remove(&self, request: RemoveRequest, cancel: &CancellationToken) -> Result<RemoveResponse> {
        super::remove(self, request, cancel)
    }
}
