// server/src/models/mod.rs

//! Rows read from and written to the store database, plus request payloads
//! shared between handlers and pipelines.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod payment;
pub mod promo;
pub mod review;
pub mod user;

use crate::errors::AppError;

pub use address::{Address, NewAddress};
pub use cart::{CartLine, CartLineInput, CartLineRow, PricedCartLine, ProductSummary};
pub use catalog::{Department, DepartmentWithSubcategories, ProductListing, Subcategory};
pub use order::{OrderSummary, OrderSummaryRow};
pub use payment::PaymentDetails;
pub use promo::Promo;
pub use review::{ProductReview, ReviewWithAuthor};
pub use user::User;

/// Fails with `Validation` when `value` has more than `max` characters, the
/// width of the column it is stored in.
pub fn ensure_max_chars(field: &str, value: &str, max: usize) -> Result<(), AppError> {
  if value.chars().count() > max {
    return Err(AppError::Validation(format!("{} must be at most {} characters.", field, max)));
  }
  Ok(())
}
