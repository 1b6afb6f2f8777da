// server/src/db/catalog.rs

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::review::ReviewWithAuthorRow;
use crate::models::{Department, ProductListing, ReviewWithAuthor, Subcategory};

const PRODUCT_COLUMNS: &str = "SELECT p.id, p.name, p.price, p.stock_quantity, p.brand, p.average_rating, p.image, \
   d.department_number, s.subcategory_number, p.description \
   FROM product p \
   JOIN department d ON d.id = p.department_id \
   JOIN subcategory s ON s.id = p.subcategory_id";

/// Query-string filters accepted by `GET /product`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
  pub department_number: Option<i32>,
  pub subcategory_number: Option<i32>,
  pub name: Option<String>,
  pub brand: Option<String>,
  pub stock_quantity_gte: Option<i32>,
  pub stock_quantity_lte: Option<i32>,
  pub price_gte: Option<Decimal>,
  pub price_lte: Option<Decimal>,
  pub average_rating_gte: Option<f64>,
  pub average_rating_lte: Option<f64>,
}

/// `%needle%` with LIKE wildcards in `needle` escaped.
pub fn contains_pattern(needle: &str) -> String {
  let mut escaped = String::with_capacity(needle.len() + 2);
  escaped.push('%');
  for ch in needle.chars() {
    if matches!(ch, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(ch);
  }
  escaped.push('%');
  escaped
}

pub async fn list_departments(executor: impl PgExecutor<'_>) -> Result<Vec<Department>, sqlx::Error> {
  sqlx::query_as::<_, Department>(
    "SELECT id, name, department_number, image FROM department ORDER BY department_number ASC",
  )
  .fetch_all(executor)
  .await
}

pub async fn list_subcategories(
  executor: impl PgExecutor<'_>,
  department_number: Option<i32>,
) -> Result<Vec<Subcategory>, sqlx::Error> {
  sqlx::query_as::<_, Subcategory>(
    "SELECT s.name, s.subcategory_number, s.image, d.department_number \
     FROM subcategory s JOIN department d ON d.id = s.department_id \
     WHERE ($1::INTEGER IS NULL OR d.department_number = $1) \
     ORDER BY s.subcategory_number ASC",
  )
  .bind(department_number)
  .fetch_all(executor)
  .await
}

pub fn product_query(filter: &ProductFilter) -> QueryBuilder<'static, Postgres> {
  let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_COLUMNS);
  qb.push(" WHERE p.stock_quantity > 0");

  if let Some(n) = filter.department_number {
    qb.push(" AND d.department_number = ").push_bind(n);
  }
  if let Some(n) = filter.subcategory_number {
    qb.push(" AND s.subcategory_number = ").push_bind(n);
  }
  if let Some(name) = filter.name.as_deref().filter(|s| !s.is_empty()) {
    qb.push(" AND p.name ILIKE ").push_bind(contains_pattern(name));
  }
  if let Some(brand) = filter.brand.as_deref().filter(|s| !s.is_empty()) {
    qb.push(" AND p.brand ILIKE ").push_bind(contains_pattern(brand));
  }
  if let Some(v) = filter.stock_quantity_gte {
    qb.push(" AND p.stock_quantity >= ").push_bind(v);
  }
  if let Some(v) = filter.stock_quantity_lte {
    qb.push(" AND p.stock_quantity <= ").push_bind(v);
  }
  if let Some(v) = filter.price_gte {
    qb.push(" AND p.price >= ").push_bind(v);
  }
  if let Some(v) = filter.price_lte {
    qb.push(" AND p.price <= ").push_bind(v);
  }
  if let Some(v) = filter.average_rating_gte {
    qb.push(" AND p.average_rating >= ").push_bind(v);
  }
  if let Some(v) = filter.average_rating_lte {
    qb.push(" AND p.average_rating <= ").push_bind(v);
  }

  qb.push(" ORDER BY d.department_number ASC, p.name ASC");
  qb
}

pub async fn list_products(
  executor: impl PgExecutor<'_>,
  filter: &ProductFilter,
) -> Result<Vec<ProductListing>, sqlx::Error> {
  let mut qb = product_query(filter);
  qb.build_query_as::<ProductListing>().fetch_all(executor).await
}

pub async fn find_product(executor: impl PgExecutor<'_>, product_id: Uuid) -> Result<Option<ProductListing>, sqlx::Error> {
  sqlx::query_as::<_, ProductListing>(&format!("{} WHERE p.id = $1", PRODUCT_COLUMNS))
    .bind(product_id)
    .fetch_optional(executor)
    .await
}

/// Reviews of a product, oldest first, with the reviewer's names.
pub async fn reviews_for_product(
  executor: impl PgExecutor<'_>,
  product_id: Uuid,
) -> Result<Vec<ReviewWithAuthor>, sqlx::Error> {
  let rows = sqlx::query_as::<_, ReviewWithAuthorRow>(
    "SELECT u.first_name, u.last_name, u.middle_name, r.review, r.rating \
     FROM product_review r JOIN \"user\" u ON u.id = r.user_id \
     WHERE r.product_id = $1 \
     ORDER BY r.created_at ASC, r.id ASC",
  )
  .bind(product_id)
  .fetch_all(executor)
  .await?;
  Ok(rows.into_iter().map(ReviewWithAuthor::from).collect())
}
