// server/src/models/payment.rs

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::ensure_max_chars;

/// Card data captured with an order. Stored as given, never charged.
#[derive(Clone, Default, Deserialize)]
pub struct PaymentDetails {
  #[serde(default)]
  pub card_number: String,
  #[serde(default)]
  pub security_code: String,
  #[serde(default)]
  pub payment_method_name: String,
}

impl PaymentDetails {
  pub fn validate(&self) -> Result<(), AppError> {
    if self.card_number.trim().is_empty()
      || self.security_code.trim().is_empty()
      || self.payment_method_name.trim().is_empty()
    {
      return Err(AppError::Validation(
        "Payment requires card_number, security_code and payment_method_name.".to_string(),
      ));
    }
    ensure_max_chars("card_number", self.card_number.trim(), 16)?;
    ensure_max_chars("security_code", self.security_code.trim(), 4)?;
    ensure_max_chars("payment_method_name", self.payment_method_name.trim(), 30)
  }
}

impl std::fmt::Debug for PaymentDetails {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PaymentDetails")
      .field("card_number", &"[REDACTED]")
      .field("security_code", &"[REDACTED]")
      .field("payment_method_name", &self.payment_method_name)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn debug_output_hides_card_data() {
    let details = PaymentDetails {
      card_number: "4111111111111111".into(),
      security_code: "123".into(),
      payment_method_name: "visa".into(),
    };
    let printed = format!("{:?}", details);
    assert!(!printed.contains("4111"));
    assert!(!printed.contains("123"));
    assert!(printed.contains("visa"));
  }

  #[test]
  fn missing_fields_fail_validation() {
    let details = PaymentDetails {
      card_number: "4111111111111111".into(),
      ..Default::default()
    };
    assert!(matches!(details.validate(), Err(AppError::Validation(_))));
  }

  #[test]
  fn values_wider_than_their_columns_fail_validation() {
    let valid = PaymentDetails {
      card_number: "4111111111111111".into(),
      security_code: "1234".into(),
      payment_method_name: "visa".into(),
    };
    assert!(valid.validate().is_ok());

    let long_card = PaymentDetails {
      card_number: "41111111111111111111".into(),
      ..valid.clone()
    };
    assert!(matches!(long_card.validate(), Err(AppError::Validation(_))));

    let long_code = PaymentDetails {
      security_code: "12345".into(),
      ..valid.clone()
    };
    assert!(matches!(long_code.validate(), Err(AppError::Validation(_))));

    let long_method = PaymentDetails {
      payment_method_name: "m".repeat(31),
      ..valid
    };
    assert!(matches!(long_method.validate(), Err(AppError::Validation(_))));
  }
}
