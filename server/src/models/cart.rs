// server/src/models/cart.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One element of a `PUT /cart` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CartLineInput {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
  pub id: Uuid,
  pub name: String,
  pub price: Decimal,
  pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
  pub product: ProductSummary,
  pub quantity: i32,
}

/// Flat join of `cart_product` and `product`.
#[derive(Debug, Clone, FromRow)]
pub struct CartLineRow {
  pub product_id: Uuid,
  pub name: String,
  pub price: Decimal,
  pub image: Option<String>,
  pub quantity: i32,
}

impl From<CartLineRow> for CartLine {
  fn from(row: CartLineRow) -> Self {
    CartLine {
      product: ProductSummary {
        id: row.product_id,
        name: row.name,
        price: row.price,
        image: row.image,
      },
      quantity: row.quantity,
    }
  }
}

/// A cart line joined with the product's current price and stock, as read
/// (and locked) during order placement.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PricedCartLine {
  pub product_id: Uuid,
  pub quantity: i32,
  pub price: Decimal,
  pub stock_quantity: i32,
}
