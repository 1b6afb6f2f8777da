// server/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::db::carts;
use crate::errors::AppError;
use crate::models::CartLineInput;
use crate::pipelines::cart_pipeline;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::get_cart", skip_all, fields(user_id = %auth_user.user_id()))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let lines = carts::lines_for_user(&app_state.db_pool, auth_user.user_id()).await?;
  Ok(HttpResponse::Ok().json(lines))
}

/// Replaces the cart with the posted lines.
#[instrument(
  name = "handler::replace_cart",
  skip_all,
  fields(user_id = %auth_user.user_id(), requested = payload.len())
)]
pub async fn replace_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<Vec<CartLineInput>>,
) -> Result<HttpResponse, AppError> {
  let stored = cart_pipeline::replace_cart(&app_state, auth_user.user_id(), payload.into_inner()).await?;
  info!(stored, "Cart replaced.");
  Ok(HttpResponse::Ok().json(json!({ "detail": "The cart has been successfully updated" })))
}
