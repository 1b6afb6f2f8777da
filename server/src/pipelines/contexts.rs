// server/src/pipelines/contexts.rs

//! Data carried through each pipeline, wrapped in `storeflow::ContextData`.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::TxHandle;
use crate::errors::AppError;
use crate::models::user::{EMAIL_MAX_CHARS, NAME_MAX_CHARS, PHONE_MAX_CHARS};
use crate::models::{ensure_max_chars, CartLineInput, NewAddress, PaymentDetails, PricedCartLine, ProductReview, User};
use crate::services::token_service::{TokenIssuer, TokenPair};
use sqlx::PgPool;

// --- Identity ---

#[derive(Clone, Default)]
pub struct Registration {
  pub first_name: String,
  pub last_name: String,
  pub middle_name: Option<String>,
  pub email: String,
  pub phone: String,
  pub password: String,
}

impl Registration {
  /// Required fields present, email plausible, every value fits its column.
  /// Values are checked as they will be stored, trimmed.
  pub fn validate(&self) -> Result<(), AppError> {
    let required = [
      ("first_name", &self.first_name),
      ("last_name", &self.last_name),
      ("email", &self.email),
      ("phone", &self.phone),
    ];
    if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
      return Err(AppError::Validation(format!("{} is required.", field)));
    }
    if !self.email.contains('@') {
      return Err(AppError::Validation("Valid email is required.".to_string()));
    }

    ensure_max_chars("first_name", self.first_name.trim(), NAME_MAX_CHARS)?;
    ensure_max_chars("last_name", self.last_name.trim(), NAME_MAX_CHARS)?;
    if let Some(middle_name) = &self.middle_name {
      ensure_max_chars("middle_name", middle_name.trim(), NAME_MAX_CHARS)?;
    }
    ensure_max_chars("email", self.email.trim(), EMAIL_MAX_CHARS)?;
    ensure_max_chars("phone", self.phone.trim(), PHONE_MAX_CHARS)
  }
}

impl std::fmt::Debug for Registration {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Registration")
      .field("first_name", &self.first_name)
      .field("last_name", &self.last_name)
      .field("email", &self.email)
      .finish_non_exhaustive()
  }
}

pub struct SignupCtxData {
  pub db_pool: PgPool,
  pub tokens: TokenIssuer,
  pub registration: Registration,
  pub created_user: Option<User>,
  pub session: Option<TokenPair>,
}

pub struct SigninCtxData {
  pub db_pool: PgPool,
  pub tokens: TokenIssuer,
  pub email: String,
  pub password: String,
  pub user: Option<User>,
  pub session: Option<TokenPair>,
}

// --- Reviews ---

pub struct ReviewCtxData {
  pub tx: TxHandle,
  pub product_id: Uuid,
  pub user_id: Uuid,
  pub review: String,
  pub rating: i32,
  /// Sum and count of the ratings recorded before this one.
  pub prior_totals: Option<(i64, i64)>,
  pub created_review: Option<ProductReview>,
  pub average_rating: Option<f64>,
}

// --- Cart ---

pub struct CartCtxData {
  pub tx: TxHandle,
  pub user_id: Uuid,
  pub requested_lines: Vec<CartLineInput>,
  pub lines: Vec<CartLineInput>,
  pub cart_id: Option<Uuid>,
}

// --- Order placement ---

/// How the order reaches the customer. Exactly one branch applies.
#[derive(Debug, Clone)]
pub enum Fulfillment {
  Pickup,
  SavedAddress(Uuid),
  NewAddress(NewAddress),
}

impl Fulfillment {
  /// Resolves the request's fulfillment fields. A pickup request wins over an
  /// address id, which wins over an inline address.
  pub fn resolve(pickup: bool, address_id: Option<Uuid>, address: Option<NewAddress>) -> Result<Self, AppError> {
    if pickup {
      return Ok(Fulfillment::Pickup);
    }
    if let Some(id) = address_id {
      return Ok(Fulfillment::SavedAddress(id));
    }
    match address {
      Some(new_address) => {
        new_address.validate()?;
        Ok(Fulfillment::NewAddress(new_address))
      }
      None => Err(AppError::Validation(
        "Order needs pickup, an address_id or an address.".to_string(),
      )),
    }
  }

  pub fn is_pickup(&self) -> bool {
    matches!(self, Fulfillment::Pickup)
  }

  pub fn saved_address(&self) -> Option<Uuid> {
    match self {
      Fulfillment::SavedAddress(id) => Some(*id),
      _ => None,
    }
  }

  pub fn new_address(&self) -> Option<&NewAddress> {
    match self {
      Fulfillment::NewAddress(address) => Some(address),
      _ => None,
    }
  }
}

pub struct CheckoutCtxData {
  pub tx: TxHandle,
  pub user_id: Uuid,
  pub payment: PaymentDetails,
  pub fulfillment: Fulfillment,
  pub promo_id: Option<Uuid>,

  // Populated by the steps:
  pub payment_id: Option<Uuid>,
  pub order_number: Option<i64>,
  pub lines: Vec<PricedCartLine>,
  pub total_cost: Decimal,
  pub applied_promo_id: Option<Uuid>,
  pub address_id: Option<Uuid>,
  pub order_id: Option<Uuid>,
}

impl CheckoutCtxData {
  pub fn new(
    tx: TxHandle,
    user_id: Uuid,
    payment: PaymentDetails,
    fulfillment: Fulfillment,
    promo_id: Option<Uuid>,
  ) -> Self {
    Self {
      tx,
      user_id,
      payment,
      fulfillment,
      promo_id,
      payment_id: None,
      order_number: None,
      lines: Vec::new(),
      total_cost: Decimal::ZERO,
      applied_promo_id: None,
      address_id: None,
      order_id: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn registration() -> Registration {
    Registration {
      first_name: "Ada".into(),
      last_name: "Lovelace".into(),
      middle_name: None,
      email: "ada@example.com".into(),
      phone: "555-0100".into(),
      password: "correct horse".into(),
    }
  }

  #[test]
  fn registration_requires_fields_and_column_widths() {
    assert!(registration().validate().is_ok());

    let blank_phone = Registration {
      phone: " ".into(),
      ..registration()
    };
    assert!(matches!(blank_phone.validate(), Err(AppError::Validation(m)) if m.contains("phone")));

    let long_first = Registration {
      first_name: "a".repeat(NAME_MAX_CHARS + 1),
      ..registration()
    };
    assert!(matches!(long_first.validate(), Err(AppError::Validation(m)) if m.contains("first_name")));

    let long_middle = Registration {
      middle_name: Some("m".repeat(NAME_MAX_CHARS + 1)),
      ..registration()
    };
    assert!(matches!(long_middle.validate(), Err(AppError::Validation(_))));

    let long_phone = Registration {
      phone: "5".repeat(PHONE_MAX_CHARS + 1),
      ..registration()
    };
    assert!(matches!(long_phone.validate(), Err(AppError::Validation(m)) if m.contains("phone")));

    let long_email = Registration {
      email: format!("{}@example.com", "e".repeat(EMAIL_MAX_CHARS)),
      ..registration()
    };
    assert!(matches!(long_email.validate(), Err(AppError::Validation(m)) if m.contains("email")));

    let padded = Registration {
      first_name: format!("  {}  ", "a".repeat(NAME_MAX_CHARS)),
      ..registration()
    };
    assert!(padded.validate().is_ok());
  }

  fn full_address() -> NewAddress {
    NewAddress {
      name: Some("Home".into()),
      address_line_1: "1 Main St".into(),
      address_line_2: "Unit 4".into(),
      city: "Springfield".into(),
      state: "IL".into(),
      zipcode: "62701".into(),
    }
  }

  #[test]
  fn pickup_takes_precedence() {
    let f = Fulfillment::resolve(true, Some(Uuid::new_v4()), Some(full_address())).unwrap();
    assert!(f.is_pickup());
  }

  #[test]
  fn address_id_before_inline_address() {
    let id = Uuid::new_v4();
    let f = Fulfillment::resolve(false, Some(id), Some(full_address())).unwrap();
    assert_eq!(f.saved_address(), Some(id));
  }

  #[test]
  fn inline_address_must_be_complete() {
    let partial = NewAddress {
      address_line_1: "1 Main St".into(),
      ..Default::default()
    };
    assert!(matches!(Fulfillment::resolve(false, None, Some(partial)), Err(AppError::Validation(_))));
    assert!(Fulfillment::resolve(false, None, Some(full_address())).unwrap().new_address().is_some());
  }

  #[test]
  fn no_fulfillment_is_a_validation_failure() {
    assert!(matches!(Fulfillment::resolve(false, None, None), Err(AppError::Validation(_))));
  }
}
