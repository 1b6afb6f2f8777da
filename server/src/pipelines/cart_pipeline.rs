// server/src/pipelines/cart_pipeline.rs

use std::collections::HashSet;

use storeflow::{ContextData, FlowRegistry, FlowResult, Pipeline, PipelineControl};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db::{carts, TxHandle};
use crate::errors::{AppError, Result as AppResult};
use crate::models::CartLineInput;
use crate::pipelines::common_steps;
use crate::pipelines::contexts::CartCtxData;
use crate::services::pricing;
use crate::state::AppState;

/// Registers the full-replace cart pipeline.
pub fn register_cart_pipeline(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut p = Pipeline::<CartCtxData, AppError>::new(&[
    ("normalize_lines", false, None),
    ("verify_products_exist", false, None),
    ("ensure_cart", false, None),
    ("replace_lines", false, None),
  ]);

  p.on_root("normalize_lines", normalize_lines)?;
  p.on_root("verify_products_exist", verify_products_exist)?;
  p.on_root("ensure_cart", ensure_cart)?;
  p.on_root("replace_lines", replace_lines)?;

  registry.register_pipeline(p);
  info!("Cart pipeline registered.");
  Ok(())
}

/// Replaces the whole content of the user's cart. Returns the number of
/// distinct products now in it.
#[instrument(name = "cart::replace_cart", skip(app_state, lines), fields(requested = lines.len()))]
pub async fn replace_cart(app_state: &AppState, user_id: Uuid, lines: Vec<CartLineInput>) -> AppResult<usize> {
  let tx = TxHandle::begin(&app_state.db_pool).await?;
  let ctx = ContextData::new(CartCtxData {
    tx: tx.clone(),
    user_id,
    requested_lines: lines,
    lines: Vec::new(),
    cart_id: None,
  });

  let outcome = app_state.flows.run(ctx.clone()).await?;
  let stored = { ctx.read().lines.len() };
  common_steps::commit_if_completed(&tx, outcome, "cart").await?;
  Ok(stored)
}

async fn normalize_lines(ctx: ContextData<CartCtxData>) -> AppResult<PipelineControl> {
  let mut guard = ctx.write();
  guard.lines = pricing::normalize_cart_lines(&guard.requested_lines)?;
  Ok(PipelineControl::Continue)
}

async fn verify_products_exist(ctx: ContextData<CartCtxData>) -> AppResult<PipelineControl> {
  let (tx, product_ids) = {
    let guard = ctx.read();
    let ids: Vec<Uuid> = guard.lines.iter().map(|l| l.product_id).collect();
    (guard.tx.clone(), ids)
  };
  if product_ids.is_empty() {
    return Ok(PipelineControl::Continue);
  }

  let found: HashSet<Uuid> = {
    let mut conn = tx.conn().await?;
    carts::existing_products(&mut *conn, &product_ids).await?.into_iter().collect()
  };
  if let Some(missing) = product_ids.iter().find(|id| !found.contains(*id)) {
    warn!(product_id = %missing, "Cart references an unknown product.");
    return Err(AppError::NotFound(format!("Product {} not found.", missing)));
  }
  Ok(PipelineControl::Continue)
}

async fn ensure_cart(ctx: ContextData<CartCtxData>) -> AppResult<PipelineControl> {
  let (tx, user_id) = {
    let guard = ctx.read();
    (guard.tx.clone(), guard.user_id)
  };
  let cart_id = {
    let mut conn = tx.conn().await?;
    carts::ensure_cart(&mut *conn, user_id).await?
  };
  ctx.write().cart_id = Some(cart_id);
  Ok(PipelineControl::Continue)
}

async fn replace_lines(ctx: ContextData<CartCtxData>) -> AppResult<PipelineControl> {
  let (tx, cart_id, lines) = {
    let guard = ctx.read();
    (guard.tx.clone(), guard.cart_id, guard.lines.clone())
  };
  let cart_id = cart_id.ok_or_else(|| AppError::Internal("Cart was not resolved.".to_string()))?;

  let mut conn = tx.conn().await?;
  let removed = carts::delete_lines(&mut *conn, cart_id).await?;
  carts::insert_lines(&mut conn, cart_id, &lines).await?;
  info!(%cart_id, removed, inserted = lines.len(), "Cart lines replaced.");
  Ok(PipelineControl::Continue)
}
