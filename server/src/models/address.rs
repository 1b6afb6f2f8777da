// server/src/models/address.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ensure_max_chars;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Address {
  pub id: Uuid,
  pub name: Option<String>,
  pub address_line_1: String,
  pub address_line_2: String,
  pub city: String,
  pub state: String,
  pub zipcode: String,
}

/// Address fields supplied by a client, either on `POST /address` or inline
/// in an order request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAddress {
  #[serde(default, alias = "address_name")]
  pub name: Option<String>,
  #[serde(default)]
  pub address_line_1: String,
  #[serde(default)]
  pub address_line_2: String,
  #[serde(default)]
  pub city: String,
  #[serde(default)]
  pub state: String,
  #[serde(default)]
  pub zipcode: String,
}

impl NewAddress {
  /// Every field except the name is required and must be non-blank. Each
  /// value must fit its column.
  pub fn validate(&self) -> Result<(), AppError> {
    let required = [
      ("address_line_1", &self.address_line_1),
      ("address_line_2", &self.address_line_2),
      ("city", &self.city),
      ("state", &self.state),
      ("zipcode", &self.zipcode),
    ];
    let missing: Vec<&str> = required
      .iter()
      .filter(|(_, value)| value.trim().is_empty())
      .map(|(field, _)| *field)
      .collect();
    if !missing.is_empty() {
      return Err(AppError::Validation(format!("Address is missing: {}", missing.join(", "))));
    }

    if let Some(name) = &self.name {
      ensure_max_chars("name", name, 30)?;
    }
    ensure_max_chars("city", &self.city, 50)?;
    ensure_max_chars("state", &self.state, 50)?;
    ensure_max_chars("zipcode", &self.zipcode, 10)
  }
}
