// server/src/models/promo.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Promo {
  pub id: Uuid,
  pub promo_code: String,
  pub percentage: Decimal,
}
