// server/src/web/handlers/catalog_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::db::catalog::{self, ProductFilter};
use crate::errors::AppError;
use crate::services::catalog::group_departments;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubcategoryQuery {
  pub department_number: Option<i32>,
}

#[instrument(name = "handler::list_departments", skip(app_state))]
pub async fn list_departments_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let departments = catalog::list_departments(&app_state.db_pool).await?;
  let subcategories = catalog::list_subcategories(&app_state.db_pool, None).await?;
  Ok(HttpResponse::Ok().json(group_departments(departments, subcategories)))
}

#[instrument(name = "handler::list_subcategories", skip(app_state))]
pub async fn list_subcategories_handler(
  app_state: web::Data<AppState>,
  query: web::Query<SubcategoryQuery>,
) -> Result<HttpResponse, AppError> {
  let subcategories = catalog::list_subcategories(&app_state.db_pool, query.department_number).await?;
  Ok(HttpResponse::Ok().json(subcategories))
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  filter: web::Query<ProductFilter>,
) -> Result<HttpResponse, AppError> {
  let products = catalog::list_products(&app_state.db_pool, &filter).await?;
  info!(count = products.len(), "Products listed.");
  Ok(HttpResponse::Ok().json(products))
}

/// Product detail with its reviews, oldest first.
#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %*path))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();

  let Some(product) = catalog::find_product(&app_state.db_pool, product_id).await? else {
    warn!("Product not found.");
    return Err(AppError::NotFound(format!("Product {} not found.", product_id)));
  };
  let reviews = catalog::reviews_for_product(&app_state.db_pool, product_id).await?;

  let mut body = serde_json::to_value(&product).map_err(|e| AppError::Internal(e.to_string()))?;
  body["reviews"] = json!(reviews);
  Ok(HttpResponse::Ok().json(body))
}
