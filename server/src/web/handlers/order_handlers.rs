// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::db::orders;
use crate::errors::AppError;
use crate::pipelines::checkout_pipeline::{self, OrderRequest};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::list_orders", skip_all, fields(user_id = %auth_user.user_id()))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let list = orders::list_for_user(&app_state.db_pool, auth_user.user_id()).await?;
  Ok(HttpResponse::Ok().json(list))
}

#[instrument(
  name = "handler::place_order",
  skip_all,
  fields(user_id = %auth_user.user_id(), pickup = payload.pickup, has_promo = payload.promo_id.is_some())
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<OrderRequest>,
) -> Result<HttpResponse, AppError> {
  let order_number = checkout_pipeline::place_order(&app_state, auth_user.user_id(), payload.into_inner()).await?;
  info!(order_number, "Order placement succeeded.");
  Ok(HttpResponse::Ok().json(json!({ "order_number": order_number })))
}
