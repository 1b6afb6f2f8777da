// server/src/pipelines/common_steps.rs

//! Pieces shared by several pipelines.

use storeflow::PipelineResult;
use tracing::{info, instrument, warn};

use crate::db::TxHandle;
use crate::errors::{AppError, Result as AppResult};
use crate::models::User;
use crate::services::token_service::{TokenIssuer, TokenPair, UserClaims};

/// Signs a fresh access/refresh pair for `user`.
#[instrument(name = "common_step::issue_session", skip_all, fields(user_id = %user.id), err(Display))]
pub fn issue_session(tokens: &TokenIssuer, user: &User) -> AppResult<TokenPair> {
  let pair = tokens.issue_pair(&UserClaims::from(user))?;
  info!("Session tokens issued.");
  Ok(pair)
}

/// Commits `tx` when the pipeline completed, rolls it back otherwise.
pub async fn commit_if_completed(tx: &TxHandle, outcome: PipelineResult, pipeline: &'static str) -> AppResult<()> {
  if outcome.is_completed() {
    tx.commit().await?;
    info!(pipeline, "Pipeline completed and committed.");
    return Ok(());
  }
  warn!(pipeline, "Pipeline was stopped by a handler; rolling back.");
  tx.rollback().await?;
  Err(AppError::PipelineHaltedByHandler)
}
