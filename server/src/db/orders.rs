// server/src/db/orders.rs

use rust_decimal::Decimal;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{OrderSummary, OrderSummaryRow, PaymentDetails};

/// Columns of a new `order` row.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub user_id: Uuid,
  pub payment_id: Uuid,
  pub address_id: Option<Uuid>,
  pub promo_id: Option<Uuid>,
  pub is_pickup: bool,
  pub total_cost: Decimal,
  pub order_number: i64,
}

pub async fn insert_payment(
  executor: impl PgExecutor<'_>,
  user_id: Uuid,
  payment: &PaymentDetails,
) -> Result<Uuid, sqlx::Error> {
  sqlx::query_scalar::<_, Uuid>(
    "INSERT INTO payment (user_id, card_number, security_code, payment_method_name) \
     VALUES ($1, $2, $3, $4) RETURNING id",
  )
  .bind(user_id)
  .bind(payment.card_number.trim())
  .bind(payment.security_code.trim())
  .bind(payment.payment_method_name.trim())
  .fetch_one(executor)
  .await
}

/// Next value of the durable order number sequence.
pub async fn next_order_number(executor: impl PgExecutor<'_>) -> Result<i64, sqlx::Error> {
  sqlx::query_scalar::<_, i64>("SELECT nextval('order_number_seq')")
    .fetch_one(executor)
    .await
}

pub async fn insert(executor: impl PgExecutor<'_>, order: &NewOrder) -> Result<Uuid, sqlx::Error> {
  sqlx::query_scalar::<_, Uuid>(
    "INSERT INTO \"order\" (user_id, payment_id, address_id, promo_id, is_pickup, total_cost, order_number) \
     VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
  )
  .bind(order.user_id)
  .bind(order.payment_id)
  .bind(order.address_id)
  .bind(order.promo_id)
  .bind(order.is_pickup)
  .bind(order.total_cost)
  .bind(order.order_number)
  .fetch_one(executor)
  .await
}

/// Decrements stock unless that would take it below zero. Returns whether a
/// row was updated.
pub async fn decrement_stock(executor: impl PgExecutor<'_>, product_id: Uuid, quantity: i32) -> Result<bool, sqlx::Error> {
  let result = sqlx::query(
    "UPDATE product SET stock_quantity = stock_quantity - $1 WHERE id = $2 AND stock_quantity >= $1",
  )
  .bind(quantity)
  .bind(product_id)
  .execute(executor)
  .await?;
  Ok(result.rows_affected() == 1)
}

pub async fn insert_line(
  executor: impl PgExecutor<'_>,
  order_id: Uuid,
  product_id: Uuid,
  quantity: i32,
  cost: Decimal,
) -> Result<(), sqlx::Error> {
  sqlx::query("INSERT INTO order_product (order_id, product_id, quantity, cost) VALUES ($1, $2, $3, $4)")
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(cost)
    .execute(executor)
    .await?;
  Ok(())
}

/// The user's orders, newest first.
pub async fn list_for_user(executor: impl PgExecutor<'_>, user_id: Uuid) -> Result<Vec<OrderSummary>, sqlx::Error> {
  let rows = sqlx::query_as::<_, OrderSummaryRow>(
    "SELECT o.id, a.id AS address_id, a.name AS address_name, a.address_line_1, \
            p.payment_method_name, o.is_pickup, o.total_cost, o.order_number, o.created_at \
     FROM \"order\" o \
     JOIN payment p ON p.id = o.payment_id \
     LEFT JOIN address a ON a.id = o.address_id \
     WHERE o.user_id = $1 \
     ORDER BY o.created_at DESC, o.order_number DESC",
  )
  .bind(user_id)
  .fetch_all(executor)
  .await?;
  Ok(rows.into_iter().map(OrderSummary::from).collect())
}
