// server/src/pipelines/review_pipeline.rs

use storeflow::{ContextData, FlowRegistry, FlowResult, Pipeline, PipelineControl};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db::{reviews, TxHandle};
use crate::errors::{AppError, Result as AppResult};
use crate::models::ProductReview;
use crate::pipelines::common_steps;
use crate::pipelines::contexts::ReviewCtxData;
use crate::services::pricing;
use crate::state::AppState;

/// Registers the review aggregation pipeline.
pub fn register_review_pipeline(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut p = Pipeline::<ReviewCtxData, AppError>::new(&[
    ("validate_review", false, None),
    ("lock_product", false, None),
    ("load_rating_totals", false, None),
    ("insert_review", false, None),
    ("update_average_rating", false, None),
  ]);

  p.on_root("validate_review", validate_review)?;
  p.on_root("lock_product", lock_product)?;
  p.on_root("load_rating_totals", load_rating_totals)?;
  p.on_root("insert_review", insert_review)?;
  p.on_root("update_average_rating", update_average_rating)?;

  registry.register_pipeline(p);
  info!("Review pipeline registered.");
  Ok(())
}

/// Appends a review and recomputes the product's average rating in one
/// transaction. Returns the stored review and the new average.
#[instrument(name = "review::add_review", skip(app_state, review_text))]
pub async fn add_review(
  app_state: &AppState,
  product_id: Uuid,
  user_id: Uuid,
  review_text: String,
  rating: i32,
) -> AppResult<(ProductReview, f64)> {
  let tx = TxHandle::begin(&app_state.db_pool).await?;
  let ctx = ContextData::new(ReviewCtxData {
    tx: tx.clone(),
    product_id,
    user_id,
    review: review_text,
    rating,
    prior_totals: None,
    created_review: None,
    average_rating: None,
  });

  let outcome = app_state.flows.run(ctx.clone()).await?;
  let result = {
    let mut guard = ctx.write();
    guard.created_review.take().zip(guard.average_rating)
  };
  common_steps::commit_if_completed(&tx, outcome, "review").await?;
  result.ok_or_else(|| AppError::Internal("Review pipeline completed without a review.".to_string()))
}

async fn validate_review(ctx: ContextData<ReviewCtxData>) -> AppResult<PipelineControl> {
  let (text_empty, rating) = {
    let guard = ctx.read();
    (guard.review.trim().is_empty(), guard.rating)
  };
  if text_empty {
    return Err(AppError::Validation("Review text is required.".to_string()));
  }
  if rating < 0 {
    return Err(AppError::Validation("Rating must not be negative.".to_string()));
  }
  Ok(PipelineControl::Continue)
}

async fn lock_product(ctx: ContextData<ReviewCtxData>) -> AppResult<PipelineControl> {
  let (tx, product_id) = {
    let guard = ctx.read();
    (guard.tx.clone(), guard.product_id)
  };
  let mut conn = tx.conn().await?;
  if !reviews::lock_product(&mut *conn, product_id).await? {
    warn!(%product_id, "Review for unknown product.");
    return Err(AppError::NotFound(format!("Product {} not found.", product_id)));
  }
  Ok(PipelineControl::Continue)
}

async fn load_rating_totals(ctx: ContextData<ReviewCtxData>) -> AppResult<PipelineControl> {
  let (tx, product_id) = {
    let guard = ctx.read();
    (guard.tx.clone(), guard.product_id)
  };
  let totals = {
    let mut conn = tx.conn().await?;
    reviews::rating_totals(&mut *conn, product_id).await?
  };
  ctx.write().prior_totals = Some(totals);
  Ok(PipelineControl::Continue)
}

async fn insert_review(ctx: ContextData<ReviewCtxData>) -> AppResult<PipelineControl> {
  let (tx, product_id, user_id, review, rating) = {
    let guard = ctx.read();
    (guard.tx.clone(), guard.product_id, guard.user_id, guard.review.trim().to_string(), guard.rating)
  };
  let created = {
    let mut conn = tx.conn().await?;
    reviews::insert(&mut *conn, product_id, user_id, &review, rating).await?
  };
  info!(review_id = %created.id, %product_id, "Review stored.");
  ctx.write().created_review = Some(created);
  Ok(PipelineControl::Continue)
}

async fn update_average_rating(ctx: ContextData<ReviewCtxData>) -> AppResult<PipelineControl> {
  let (tx, product_id, rating, prior_totals) = {
    let guard = ctx.read();
    (guard.tx.clone(), guard.product_id, guard.rating, guard.prior_totals)
  };
  let (prior_sum, prior_count) =
    prior_totals.ok_or_else(|| AppError::Internal("Rating totals were not loaded.".to_string()))?;

  let average = pricing::next_average(prior_sum, prior_count, rating);
  {
    let mut conn = tx.conn().await?;
    reviews::set_average_rating(&mut *conn, product_id, average).await?;
  }
  info!(%product_id, average, "Average rating updated.");
  ctx.write().average_rating = Some(average);
  Ok(PipelineControl::Continue)
}
