// server/src/lib.rs

//! Department store backend: catalog browsing, carts, reviews and order
//! placement over a JSON HTTP API. Multi-step writes run as `storeflow`
//! pipelines inside a single database transaction.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod web;

use std::sync::Arc;

use sqlx::PgPool;
use storeflow::FlowRegistry;

use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use crate::services::token_service::TokenIssuer;
use crate::state::AppState;

/// Assembles the shared state and registers every pipeline.
pub fn build_state(config: &AppConfig, db_pool: PgPool) -> AppResult<AppState> {
  let flows = Arc::new(FlowRegistry::<AppError>::new());
  pipelines::register_all_pipelines(&flows)?;

  let tokens = TokenIssuer::from_config(config)?;
  Ok(AppState {
    db_pool,
    flows,
    tokens,
  })
}
