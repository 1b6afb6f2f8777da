// server/src/state.rs
use crate::errors::AppError;
use crate::services::token_service::TokenIssuer;
use sqlx::PgPool;
use std::sync::Arc;
use storeflow::FlowRegistry;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub tokens: TokenIssuer,
}
