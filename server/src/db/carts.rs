// server/src/db/carts.rs

use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::models::{CartLine, CartLineInput, CartLineRow, PricedCartLine};

/// Returns the user's cart id, creating the cart when absent.
pub async fn ensure_cart(executor: impl PgExecutor<'_>, user_id: Uuid) -> Result<Uuid, sqlx::Error> {
  sqlx::query_scalar::<_, Uuid>(
    "INSERT INTO cart (user_id) VALUES ($1) \
     ON CONFLICT (user_id) DO UPDATE SET updated_at = now() \
     RETURNING id",
  )
  .bind(user_id)
  .fetch_one(executor)
  .await
}

pub async fn find_cart_id(executor: impl PgExecutor<'_>, user_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
  sqlx::query_scalar::<_, Uuid>("SELECT id FROM cart WHERE user_id = $1")
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Ids among `product_ids` that have a product row.
pub async fn existing_products(executor: impl PgExecutor<'_>, product_ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error> {
  sqlx::query_scalar::<_, Uuid>("SELECT id FROM product WHERE id = ANY($1)")
    .bind(product_ids)
    .fetch_all(executor)
    .await
}

pub async fn delete_lines(executor: impl PgExecutor<'_>, cart_id: Uuid) -> Result<u64, sqlx::Error> {
  let result = sqlx::query("DELETE FROM cart_product WHERE cart_id = $1")
    .bind(cart_id)
    .execute(executor)
    .await?;
  Ok(result.rows_affected())
}

pub async fn insert_lines(conn: &mut PgConnection, cart_id: Uuid, lines: &[CartLineInput]) -> Result<(), sqlx::Error> {
  for line in lines {
    sqlx::query("INSERT INTO cart_product (cart_id, product_id, quantity) VALUES ($1, $2, $3)")
      .bind(cart_id)
      .bind(line.product_id)
      .bind(line.quantity)
      .execute(&mut *conn)
      .await?;
  }
  Ok(())
}

pub async fn lines_for_user(executor: impl PgExecutor<'_>, user_id: Uuid) -> Result<Vec<CartLine>, sqlx::Error> {
  let rows = sqlx::query_as::<_, CartLineRow>(
    "SELECT p.id AS product_id, p.name, p.price, p.image, cp.quantity \
     FROM cart_product cp \
     JOIN cart c ON c.id = cp.cart_id \
     JOIN product p ON p.id = cp.product_id \
     WHERE c.user_id = $1 \
     ORDER BY cp.created_at DESC, cp.id DESC",
  )
  .bind(user_id)
  .fetch_all(executor)
  .await?;
  Ok(rows.into_iter().map(CartLine::from).collect())
}

/// Locks the user's cart row until the surrounding transaction ends.
/// Concurrent checkouts of the same cart queue here.
pub async fn lock_cart(executor: impl PgExecutor<'_>, user_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
  sqlx::query_scalar::<_, Uuid>("SELECT id FROM cart WHERE user_id = $1 FOR UPDATE")
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Cart lines with current price and stock. Call after [`lock_cart`] so the
/// lines are read after any competing checkout has committed. The product
/// rows stay locked until the surrounding transaction ends.
pub async fn priced_lines_for_update(
  executor: impl PgExecutor<'_>,
  user_id: Uuid,
) -> Result<Vec<PricedCartLine>, sqlx::Error> {
  sqlx::query_as::<_, PricedCartLine>(
    "SELECT cp.product_id, cp.quantity, p.price, p.stock_quantity \
     FROM cart_product cp \
     JOIN cart c ON c.id = cp.cart_id \
     JOIN product p ON p.id = cp.product_id \
     WHERE c.user_id = $1 \
     ORDER BY p.id ASC \
     FOR UPDATE OF p",
  )
  .bind(user_id)
  .fetch_all(executor)
  .await
}

/// Removes every line of the user's cart. The cart row is kept.
pub async fn clear_lines_for_user(executor: impl PgExecutor<'_>, user_id: Uuid) -> Result<u64, sqlx::Error> {
  let result = sqlx::query("DELETE FROM cart_product WHERE cart_id IN (SELECT id FROM cart WHERE user_id = $1)")
    .bind(user_id)
    .execute(executor)
    .await?;
  Ok(result.rows_affected())
}
