use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

use super::Context;
use super::transfer::{TransferPlan, copy_entry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyResponse {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub files: u64,
    pub bytes: u64,
}

pub fn copy_path(
    ctx: &Context,
    request: CopyRequest,
    cancel: &CancellationToken,
) -> Result<CopyResponse> {
    let plan = TransferPlan::new(
        ctx.resolve(&request.source)?,
        ctx.resolve(&request.destination)?,
        request.overwrite,
    );
    let stats = copy_entry(&plan, cancel)?;
    Ok(CopyResponse {
        source: plan.source.into_path_buf(),
        destination: plan.destination.into_path_buf(),
        files: stats.files,
        bytes: stats.bytes,
    })
}
