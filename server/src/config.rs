// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::str::FromStr;

const MIN_SIGNING_KEY_LEN: usize = 32;
pub const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 24 * 60;
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "pretty" => Ok(LogFormat::Pretty),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}', expected 'pretty' or 'json'", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: SecretString,
  pub database_max_connections: u32,
  pub jwt_signing_key: SecretString,
  pub access_token_ttl_minutes: i64,
  pub refresh_token_ttl_days: i64,
  pub run_migrations: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  /// Loads `.env` if present, then reads the process environment.
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from an arbitrary variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let required = |name: &str| lookup(name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", name)));

    let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or(&lookup, "SERVER_PORT", 8080u16)?;
    let database_url = SecretString::from(required("DATABASE_URL")?);
    let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;

    let jwt_signing_key = required("JWT_SIGNING_KEY")?;
    if jwt_signing_key.len() < MIN_SIGNING_KEY_LEN {
      return Err(AppError::Config(format!(
        "JWT_SIGNING_KEY must be at least {} bytes long",
        MIN_SIGNING_KEY_LEN
      )));
    }

    let access_token_ttl_minutes = parse_or(&lookup, "ACCESS_TOKEN_TTL_MINUTES", 60i64)?;
    let refresh_token_ttl_days = parse_or(&lookup, "REFRESH_TOKEN_TTL_DAYS", 7i64)?;
    if !(1..=MAX_ACCESS_TOKEN_TTL_MINUTES).contains(&access_token_ttl_minutes) {
      return Err(AppError::Config(format!(
        "ACCESS_TOKEN_TTL_MINUTES must be between 1 and {}",
        MAX_ACCESS_TOKEN_TTL_MINUTES
      )));
    }
    if !(1..=MAX_REFRESH_TOKEN_TTL_DAYS).contains(&refresh_token_ttl_days) {
      return Err(AppError::Config(format!(
        "REFRESH_TOKEN_TTL_DAYS must be between 1 and {}",
        MAX_REFRESH_TOKEN_TTL_DAYS
      )));
    }

    let run_migrations = parse_or(&lookup, "RUN_MIGRATIONS", true)?;
    let log_format = parse_or(&lookup, "LOG_FORMAT", LogFormat::Pretty)?;

    tracing::info!(%server_host, server_port, database_max_connections, run_migrations, "Application configuration loaded.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      jwt_signing_key: SecretString::from(jwt_signing_key),
      access_token_ttl_minutes,
      refresh_token_ttl_days,
      run_migrations,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }

  pub fn database_url(&self) -> &str {
    self.database_url.expose_secret()
  }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match lookup(name) {
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
    None => Ok(default),
  }
}
