// server/src/services/token_service.rs

//! Signed access and refresh tokens.
//!
//! Tokens are compact JWS strings (`header.payload.signature`, base64url
//! without padding) signed with HMAC-SHA256. The payload is
//! `{"claims": {...}, "type": "access" | "refresh", "exp": <unix seconds>}`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult};
use crate::models::User;

type HmacSha256 = Hmac<Sha256>;

const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;
const INVALID_TOKEN: &str = "Invalid or expired token.";

/// Identity carried inside every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
  pub id: Uuid,
  pub first_name: String,
  pub last_name: String,
  pub middle_name: Option<String>,
  pub email: String,
}

impl From<&User> for UserClaims {
  fn from(user: &User) -> Self {
    UserClaims {
      id: user.id,
      first_name: user.first_name.clone(),
      last_name: user.last_name.clone(),
      middle_name: user.middle_name.clone(),
      email: user.email.clone(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
  Access,
  Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenPayload {
  claims: UserClaims,
  #[serde(rename = "type")]
  kind: TokenKind,
  exp: i64,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
  pub access: String,
  pub refresh: String,
}

/// Issues and verifies tokens with one signing key.
#[derive(Clone)]
pub struct TokenIssuer {
  signing_key: SecretString,
  access_ttl: Duration,
  refresh_ttl: Duration,
}

impl TokenIssuer {
  pub fn new(signing_key: SecretString, access_ttl: Duration, refresh_ttl: Duration) -> Self {
    Self {
      signing_key,
      access_ttl,
      refresh_ttl,
    }
  }

  pub fn from_config(config: &AppConfig) -> AppResult<Self> {
    let out_of_range = |name: &str| AppError::Config(format!("{} is out of range", name));
    let access_ttl =
      Duration::try_minutes(config.access_token_ttl_minutes).ok_or_else(|| out_of_range("ACCESS_TOKEN_TTL_MINUTES"))?;
    let refresh_ttl =
      Duration::try_days(config.refresh_token_ttl_days).ok_or_else(|| out_of_range("REFRESH_TOKEN_TTL_DAYS"))?;
    Ok(Self::new(config.jwt_signing_key.clone(), access_ttl, refresh_ttl))
  }

  pub fn issue(&self, kind: TokenKind, claims: &UserClaims) -> AppResult<String> {
    self.issue_at(kind, claims, Utc::now())
  }

  #[instrument(name = "token_service::issue_pair", skip_all, fields(user_id = %claims.id))]
  pub fn issue_pair(&self, claims: &UserClaims) -> AppResult<TokenPair> {
    let now = Utc::now();
    Ok(TokenPair {
      access: self.issue_at(TokenKind::Access, claims, now)?,
      refresh: self.issue_at(TokenKind::Refresh, claims, now)?,
    })
  }

  pub fn issue_at(&self, kind: TokenKind, claims: &UserClaims, now: DateTime<Utc>) -> AppResult<String> {
    let ttl = match kind {
      TokenKind::Access => self.access_ttl,
      TokenKind::Refresh => self.refresh_ttl,
    };
    let payload = TokenPayload {
      claims: claims.clone(),
      kind,
      exp: (now + ttl).timestamp(),
    };
    let payload_json =
      serde_json::to_vec(&payload).map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;

    let signing_input = format!(
      "{}.{}",
      URL_SAFE_NO_PAD.encode(HEADER_JSON),
      URL_SAFE_NO_PAD.encode(payload_json)
    );
    let signature = self.mac(signing_input.as_bytes())?.finalize().into_bytes();
    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
  }

  /// Verifies signature, type and expiry, returning the carried identity.
  pub fn verify(&self, token: &str, expected: TokenKind) -> AppResult<UserClaims> {
    self.verify_at(token, expected, Utc::now())
  }

  pub fn verify_at(&self, token: &str, expected: TokenKind, now: DateTime<Utc>) -> AppResult<UserClaims> {
    let invalid = || AppError::Auth(INVALID_TOKEN.to_string());

    let mut parts = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
      (parts.next(), parts.next(), parts.next(), parts.next())
    else {
      debug!("Token is not a three-part compact JWS.");
      return Err(invalid());
    };

    let header = URL_SAFE_NO_PAD.decode(header_b64).map_err(|_| invalid())?;
    let header: serde_json::Value = serde_json::from_slice(&header).map_err(|_| invalid())?;
    if header.get("alg").and_then(|v| v.as_str()) != Some("HS256") {
      debug!("Token header names an unsupported algorithm.");
      return Err(invalid());
    }

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|_| invalid())?;
    let signing_input_len = header_b64.len() + 1 + payload_b64.len();
    let mac = self.mac(token[..signing_input_len].as_bytes())?;
    mac.verify_slice(&signature).map_err(|_| {
      debug!("Token signature mismatch.");
      invalid()
    })?;

    let payload = URL_SAFE_NO_PAD.decode(payload_b64).map_err(|_| invalid())?;
    let payload: TokenPayload = serde_json::from_slice(&payload).map_err(|_| invalid())?;
    if payload.kind != expected {
      debug!(kind = ?payload.kind, expected = ?expected, "Token has the wrong type.");
      return Err(invalid());
    }
    if payload.exp <= now.timestamp() {
      debug!("Token expired.");
      return Err(invalid());
    }
    Ok(payload.claims)
  }

  fn mac(&self, signing_input: &[u8]) -> AppResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(self.signing_key.expose_secret().as_bytes())
      .map_err(|e| AppError::Config(format!("Unusable signing key: {}", e)))?;
    mac.update(signing_input);
    Ok(mac)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn issuer(key: &str) -> TokenIssuer {
    TokenIssuer::new(SecretString::from(key.to_string()), Duration::minutes(60), Duration::days(7))
  }

  fn claims() -> UserClaims {
    UserClaims {
      id: Uuid::new_v4(),
      first_name: "Ada".into(),
      last_name: "Lovelace".into(),
      middle_name: None,
      email: "ada@example.com".into(),
    }
  }

  const KEY: &str = "0123456789abcdef0123456789abcdef";

  #[test]
  fn access_token_round_trips_claims() {
    let issuer = issuer(KEY);
    let claims = claims();
    let token = issuer.issue(TokenKind::Access, &claims).unwrap();
    assert_eq!(token.split('.').count(), 3);
    assert_eq!(issuer.verify(&token, TokenKind::Access).unwrap(), claims);
  }

  #[test]
  fn refresh_token_is_not_an_access_token() {
    let issuer = issuer(KEY);
    let pair = issuer.issue_pair(&claims()).unwrap();
    assert!(matches!(issuer.verify(&pair.refresh, TokenKind::Access), Err(AppError::Auth(_))));
    assert!(issuer.verify(&pair.refresh, TokenKind::Refresh).is_ok());
    assert!(matches!(issuer.verify(&pair.access, TokenKind::Refresh), Err(AppError::Auth(_))));
  }

  #[test]
  fn expired_token_is_rejected() {
    let issuer = issuer(KEY);
    let issued = Utc::now() - Duration::minutes(61);
    let token = issuer.issue_at(TokenKind::Access, &claims(), issued).unwrap();
    assert!(matches!(issuer.verify(&token, TokenKind::Access), Err(AppError::Auth(_))));
  }

  #[test]
  fn token_signed_with_another_key_is_rejected() {
    let token = issuer("another-signing-key-of-32-bytes!!").issue(TokenKind::Access, &claims()).unwrap();
    assert!(matches!(issuer(KEY).verify(&token, TokenKind::Access), Err(AppError::Auth(_))));
  }

  #[test]
  fn tampered_payload_is_rejected() {
    let issuer = issuer(KEY);
    let token = issuer.issue(TokenKind::Access, &claims()).unwrap();
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let mut forged = claims();
    forged.email = "mallory@example.com".into();
    let payload = TokenPayload {
      claims: forged,
      kind: TokenKind::Access,
      exp: (Utc::now() + Duration::hours(1)).timestamp(),
    };
    parts[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
    assert!(issuer.verify(&parts.join("."), TokenKind::Access).is_err());
  }

  #[test]
  fn overflowing_lifetimes_are_a_config_error() {
    let mut config = crate::config::AppConfig::from_lookup(|name| match name {
      "DATABASE_URL" => Some("postgres://localhost/store".to_string()),
      "JWT_SIGNING_KEY" => Some(KEY.to_string()),
      _ => None,
    })
    .unwrap();
    assert!(TokenIssuer::from_config(&config).is_ok());

    config.access_token_ttl_minutes = i64::MAX;
    assert!(matches!(TokenIssuer::from_config(&config), Err(AppError::Config(_))));
  }

  #[test]
  fn garbage_is_rejected() {
    let issuer = issuer(KEY);
    for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.##"] {
      assert!(matches!(issuer.verify(token, TokenKind::Access), Err(AppError::Auth(_))), "{}", token);
    }
  }
}
