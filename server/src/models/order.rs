// server/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct OrderAddressSummary {
  pub id: Uuid,
  pub name: Option<String>,
  pub address_line_1: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPaymentSummary {
  pub payment_method_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
  pub id: Uuid,
  pub address: Option<OrderAddressSummary>,
  pub payment: OrderPaymentSummary,
  pub is_pickup: bool,
  pub total_cost: Decimal,
  pub order_number: i64,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderSummaryRow {
  pub id: Uuid,
  pub address_id: Option<Uuid>,
  pub address_name: Option<String>,
  pub address_line_1: Option<String>,
  pub payment_method_name: String,
  pub is_pickup: bool,
  pub total_cost: Decimal,
  pub order_number: i64,
  pub created_at: DateTime<Utc>,
}

impl From<OrderSummaryRow> for OrderSummary {
  fn from(row: OrderSummaryRow) -> Self {
    let address = match (row.address_id, row.address_line_1) {
      (Some(id), Some(address_line_1)) => Some(OrderAddressSummary {
        id,
        name: row.address_name,
        address_line_1,
      }),
      _ => None,
    };
    OrderSummary {
      id: row.id,
      address,
      payment: OrderPaymentSummary {
        payment_method_name: row.payment_method_name,
      },
      is_pickup: row.is_pickup,
      total_cost: row.total_cost,
      order_number: row.order_number,
      created_at: row.created_at,
    }
  }
}
