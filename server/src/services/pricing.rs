// server/src/services/pricing.rs

//! Money and rating arithmetic used by the order and review pipelines.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CartLineInput, PricedCartLine};

/// `quantity x unit_price`.
pub fn line_cost(unit_price: Decimal, quantity: i32) -> Decimal {
  unit_price * Decimal::from(quantity)
}

/// Sum of every line cost.
pub fn order_total(lines: &[PricedCartLine]) -> Decimal {
  lines.iter().map(|l| line_cost(l.price, l.quantity)).sum()
}

/// `total - total x percentage / 100`.
pub fn apply_promo(total: Decimal, percentage: Decimal) -> Decimal {
  total - total * percentage / Decimal::ONE_HUNDRED
}

/// Rounds to cents, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
  amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Average after adding `new_rating` to `prior_count` ratings summing to `prior_sum`.
pub fn next_average(prior_sum: i64, prior_count: i64, new_rating: i32) -> f64 {
  (prior_sum + i64::from(new_rating)) as f64 / (prior_count + 1) as f64
}

/// Fails with `InsufficientStock` for the first line asking for more than is stocked.
pub fn ensure_in_stock(lines: &[PricedCartLine]) -> Result<(), AppError> {
  match lines.iter().find(|l| l.quantity > l.stock_quantity) {
    Some(line) => Err(AppError::InsufficientStock(format!(
      "Product {} has {} in stock, {} requested.",
      line.product_id, line.stock_quantity, line.quantity
    ))),
    None => Ok(()),
  }
}

/// Validates quantities and merges repeated products by summing their
/// quantities. Output is ordered by product id.
pub fn normalize_cart_lines(lines: &[CartLineInput]) -> Result<Vec<CartLineInput>, AppError> {
  let mut merged: BTreeMap<Uuid, i32> = BTreeMap::new();
  for line in lines {
    if line.quantity <= 0 {
      return Err(AppError::Validation(format!(
        "Quantity for product {} must be positive.",
        line.product_id
      )));
    }
    let quantity = merged.entry(line.product_id).or_insert(0);
    *quantity = quantity
      .checked_add(line.quantity)
      .ok_or_else(|| AppError::Validation(format!("Quantity for product {} is too large.", line.product_id)))?;
  }
  Ok(
    merged
      .into_iter()
      .map(|(product_id, quantity)| CartLineInput { product_id, quantity })
      .collect(),
  )
}
