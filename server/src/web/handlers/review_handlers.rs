// server/src/web/handlers/review_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipelines::review_pipeline;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
  #[serde(default)]
  pub review: String,
  pub rating: i32,
}

#[instrument(
  name = "handler::add_review",
  skip(app_state, path, auth_user, payload),
  fields(product_id = %*path, user_id = %auth_user.user_id(), rating = payload.rating)
)]
pub async fn add_review_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
  payload: web::Json<ReviewPayload>,
) -> Result<HttpResponse, AppError> {
  let ReviewPayload { review, rating } = payload.into_inner();
  let (review, average_rating) =
    review_pipeline::add_review(&app_state, path.into_inner(), auth_user.user_id(), review, rating).await?;

  info!(review_id = %review.id, average_rating, "Review added.");
  Ok(HttpResponse::Ok().json(json!({
    "detail": "Product review has been added",
    "review": review,
    "average_rating": average_rating,
  })))
}
