use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

use super::Context;
use super::transfer::{MoveStrategy, TransferPlan, move_entry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovePathRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Replace an existing destination (removed before the move).
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovePathResponse {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub strategy: MoveStrategy,
}

pub fn move_path(
    ctx: &Context,
    request: MovePathRequest,
    cancel: &CancellationToken,
) -> Result<MovePathResponse> {
    let plan = TransferPlan::new(
        ctx.resolve(&request.source)?,
        ctx.resolve(&request.destination)?,
        request.overwrite,
    );
    let strategy = move_entry(&plan, cancel)?;
    Ok(MovePathResponse {
        source: plan.source.into_path_buf(),
        destination: plan.destination.into_path_buf(),
        strategy,
    })
}
