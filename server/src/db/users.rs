// server/src/db/users.rs

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::User;

const USER_COLUMNS: &str =
  "id, first_name, last_name, middle_name, email, phone, password_hash, created_at, updated_at";

/// Fields of a user row being created.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
  pub first_name: &'a str,
  pub last_name: &'a str,
  pub middle_name: Option<&'a str>,
  pub email: &'a str,
  pub phone: &'a str,
  pub password_hash: &'a str,
}

/// Profile fields a user may change. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub middle_name: Option<String>,
  pub phone: Option<String>,
}

pub async fn email_exists(executor: impl PgExecutor<'_>, email: &str) -> Result<bool, sqlx::Error> {
  sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM \"user\" WHERE lower(email) = lower($1))")
    .bind(email)
    .fetch_one(executor)
    .await
}

pub async fn insert(executor: impl PgExecutor<'_>, new_user: &NewUser<'_>) -> Result<User, sqlx::Error> {
  sqlx::query_as::<_, User>(&format!(
    "INSERT INTO \"user\" (first_name, last_name, middle_name, email, phone, password_hash) \
     VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
    USER_COLUMNS
  ))
  .bind(new_user.first_name)
  .bind(new_user.last_name)
  .bind(new_user.middle_name)
  .bind(new_user.email)
  .bind(new_user.phone)
  .bind(new_user.password_hash)
  .fetch_one(executor)
  .await
}

pub async fn find_by_email(executor: impl PgExecutor<'_>, email: &str) -> Result<Option<User>, sqlx::Error> {
  sqlx::query_as::<_, User>(&format!(
    "SELECT {} FROM \"user\" WHERE lower(email) = lower($1)",
    USER_COLUMNS
  ))
  .bind(email)
  .fetch_optional(executor)
  .await
}

pub async fn find_by_id(executor: impl PgExecutor<'_>, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
  sqlx::query_as::<_, User>(&format!("SELECT {} FROM \"user\" WHERE id = $1", USER_COLUMNS))
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn update_profile(
  executor: impl PgExecutor<'_>,
  user_id: Uuid,
  changes: &ProfileChanges,
) -> Result<Option<User>, sqlx::Error> {
  sqlx::query_as::<_, User>(&format!(
    "UPDATE \"user\" SET \
       first_name = COALESCE($2, first_name), \
       last_name = COALESCE($3, last_name), \
       middle_name = COALESCE($4, middle_name), \
       phone = COALESCE($5, phone), \
       updated_at = now() \
     WHERE id = $1 RETURNING {}",
    USER_COLUMNS
  ))
  .bind(user_id)
  .bind(changes.first_name.as_deref())
  .bind(changes.last_name.as_deref())
  .bind(changes.middle_name.as_deref())
  .bind(changes.phone.as_deref())
  .fetch_optional(executor)
  .await
}
