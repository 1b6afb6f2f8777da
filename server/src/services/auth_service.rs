// server/src/services/auth_service.rs

//! Password hashing and verification (Argon2id, PHC strings).

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use once_cell::sync::Lazy;
use tracing::{debug, error, instrument};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash checked when sign-in names an unknown email, so that branch costs one
/// Argon2 verification like the known-email branch.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(b"no-account-has-this-password", &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| error!(error = %e, "Could not build the dummy password hash."))
    .ok()
});

/// Rejects passwords the store will not hash.
pub fn check_password_policy(password: &str) -> Result<(), AppError> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(AppError::Validation(format!(
      "Password must be at least {} characters long.",
      MIN_PASSWORD_LEN
    )));
  }
  Ok(())
}

/// Hashes `password` with a fresh random salt.
///
/// Returns the PHC string (`$argon2id$v=19$...`) stored in `user.password_hash`.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  check_password_policy(password)?;

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| {
      debug!("Password hashed.");
      hash.to_string()
    })
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 hashing failed.");
      AppError::Internal(format!("Password hashing failed: {}", argon_err))
    })
}

/// Checks `provided_password` against a stored PHC string.
///
/// `Ok(false)` means the password does not match. A stored hash that cannot
/// be parsed is an internal error, never an authentication failure.
#[instrument(
  name = "auth_service::verify_password",
  skip(stored_hash, provided_password),
  fields(hash_len = stored_hash.len()),
  err(Display)
)]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool, AppError> {
  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Stored password hash is malformed.");
    AppError::Internal(format!("Invalid stored password hash: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password mismatch.");
      Ok(false)
    }
    Err(other) => {
      error!(error = %other, "Argon2 verification failed.");
      Err(AppError::Internal(format!("Password verification failed: {}", other)))
    }
  }
}

/// Runs a full verification against [`DUMMY_HASH`]. Never matches.
#[instrument(name = "auth_service::verify_against_dummy", skip_all)]
pub fn verify_against_dummy(provided_password: &str) -> bool {
  if let Some(hash) = DUMMY_HASH.as_deref() {
    let _ = verify_password(hash, provided_password);
  }
  false
}
