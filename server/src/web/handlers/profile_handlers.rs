// server/src/web/handlers/profile_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::db::users::{self, ProfileChanges};
use crate::errors::AppError;
use crate::models::ensure_max_chars;
use crate::models::user::{NAME_MAX_CHARS, PHONE_MAX_CHARS};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct ProfileUpdatePayload {
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub middle_name: Option<String>,
  pub phone: Option<String>,
}

impl ProfileUpdatePayload {
  fn into_changes(self) -> Result<ProfileChanges, AppError> {
    for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name), ("phone", &self.phone)] {
      if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
        return Err(AppError::Validation(format!("{} cannot be blank.", field)));
      }
    }
    let widths = [
      ("first_name", &self.first_name, NAME_MAX_CHARS),
      ("last_name", &self.last_name, NAME_MAX_CHARS),
      ("middle_name", &self.middle_name, NAME_MAX_CHARS),
      ("phone", &self.phone, PHONE_MAX_CHARS),
    ];
    for (field, value, max) in widths {
      if let Some(value) = value {
        ensure_max_chars(field, value.trim(), max)?;
      }
    }
    Ok(ProfileChanges {
      first_name: self.first_name.map(|v| v.trim().to_string()),
      last_name: self.last_name.map(|v| v.trim().to_string()),
      middle_name: self.middle_name.map(|v| v.trim().to_string()),
      phone: self.phone.map(|v| v.trim().to_string()),
    })
  }
}

#[instrument(name = "handler::get_profile", skip_all, fields(user_id = %auth_user.user_id()))]
pub async fn get_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let user = users::find_by_id(&app_state.db_pool, auth_user.user_id())
    .await?
    .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
  Ok(HttpResponse::Ok().json(user))
}

#[instrument(name = "handler::update_profile", skip_all, fields(user_id = %auth_user.user_id()))]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<ProfileUpdatePayload>,
) -> Result<HttpResponse, AppError> {
  let changes = payload.into_inner().into_changes()?;
  let user = users::update_profile(&app_state.db_pool, auth_user.user_id(), &changes)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
  info!("Profile updated.");
  Ok(HttpResponse::Ok().json(user))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn payload(first_name: Option<&str>, phone: Option<&str>) -> ProfileUpdatePayload {
    ProfileUpdatePayload {
      first_name: first_name.map(String::from),
      last_name: None,
      middle_name: None,
      phone: phone.map(String::from),
    }
  }

  #[test]
  fn changes_are_trimmed() {
    let changes = payload(Some("  Ada "), None).into_changes().unwrap();
    assert_eq!(changes.first_name.as_deref(), Some("Ada"));
    assert!(changes.phone.is_none());
  }

  #[test]
  fn over_wide_values_are_rejected() {
    let long_name = "a".repeat(NAME_MAX_CHARS + 1);
    assert!(matches!(
      payload(Some(&long_name), None).into_changes(),
      Err(AppError::Validation(m)) if m.contains("first_name")
    ));
    let long_phone = "5".repeat(PHONE_MAX_CHARS + 1);
    assert!(matches!(
      payload(None, Some(&long_phone)).into_changes(),
      Err(AppError::Validation(m)) if m.contains("phone")
    ));
  }
}
