// server/src/db/reviews.rs

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::ProductReview;

/// Locks the product row. `false` when the product does not exist.
pub async fn lock_product(executor: impl PgExecutor<'_>, product_id: Uuid) -> Result<bool, sqlx::Error> {
  let row = sqlx::query_scalar::<_, Uuid>("SELECT id FROM product WHERE id = $1 FOR UPDATE")
    .bind(product_id)
    .fetch_optional(executor)
    .await?;
  Ok(row.is_some())
}

/// Sum and count of the product's existing ratings.
pub async fn rating_totals(executor: impl PgExecutor<'_>, product_id: Uuid) -> Result<(i64, i64), sqlx::Error> {
  sqlx::query_as::<_, (i64, i64)>(
    "SELECT COALESCE(SUM(rating), 0)::BIGINT, COUNT(*) FROM product_review WHERE product_id = $1",
  )
  .bind(product_id)
  .fetch_one(executor)
  .await
}

pub async fn insert(
  executor: impl PgExecutor<'_>,
  product_id: Uuid,
  user_id: Uuid,
  review: &str,
  rating: i32,
) -> Result<ProductReview, sqlx::Error> {
  sqlx::query_as::<_, ProductReview>(
    "INSERT INTO product_review (product_id, user_id, review, rating) VALUES ($1, $2, $3, $4) \
     RETURNING id, product_id, user_id, review, rating, created_at",
  )
  .bind(product_id)
  .bind(user_id)
  .bind(review)
  .bind(rating)
  .fetch_one(executor)
  .await
}

pub async fn set_average_rating(
  executor: impl PgExecutor<'_>,
  product_id: Uuid,
  average_rating: f64,
) -> Result<(), sqlx::Error> {
  sqlx::query("UPDATE product SET average_rating = $1 WHERE id = $2")
    .bind(average_rating)
    .bind(product_id)
    .execute(executor)
    .await?;
  Ok(())
}
