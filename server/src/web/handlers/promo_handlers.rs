// server/src/web/handlers/promo_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::db::promos;
use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::get_promo", skip(app_state))]
pub async fn get_promo_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let code = path.into_inner();
  let promo = promos::find_by_code(&app_state.db_pool, &code)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Promo code '{}' not found.", code)))?;
  Ok(HttpResponse::Ok().json(promo))
}
