// server/src/web/handlers/address_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};

use crate::db::addresses;
use crate::errors::AppError;
use crate::models::NewAddress;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::list_addresses", skip_all, fields(user_id = %auth_user.user_id()))]
pub async fn list_addresses_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let list = addresses::list_for_user(&app_state.db_pool, auth_user.user_id()).await?;
  Ok(HttpResponse::Ok().json(list))
}

#[instrument(name = "handler::create_address", skip_all, fields(user_id = %auth_user.user_id()))]
pub async fn create_address_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<NewAddress>,
) -> Result<HttpResponse, AppError> {
  payload.validate()?;
  let address = addresses::insert(&app_state.db_pool, auth_user.user_id(), &payload).await?;
  info!(address_id = %address.id, "Address created.");
  Ok(HttpResponse::Ok().json(address))
}
