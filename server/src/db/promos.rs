// server/src/db/promos.rs

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::Promo;

pub async fn find_by_id(executor: impl PgExecutor<'_>, promo_id: Uuid) -> Result<Option<Promo>, sqlx::Error> {
  sqlx::query_as::<_, Promo>("SELECT id, promo_code, percentage FROM promo WHERE id = $1")
    .bind(promo_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_code(executor: impl PgExecutor<'_>, promo_code: &str) -> Result<Option<Promo>, sqlx::Error> {
  sqlx::query_as::<_, Promo>("SELECT id, promo_code, percentage FROM promo WHERE promo_code = $1")
    .bind(promo_code)
    .fetch_optional(executor)
    .await
}
