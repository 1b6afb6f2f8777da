// server/src/db/addresses.rs

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{Address, NewAddress};

pub async fn list_for_user(executor: impl PgExecutor<'_>, user_id: Uuid) -> Result<Vec<Address>, sqlx::Error> {
  sqlx::query_as::<_, Address>(
    "SELECT id, name, address_line_1, address_line_2, city, state, zipcode \
     FROM address WHERE user_id = $1 ORDER BY created_at DESC",
  )
  .bind(user_id)
  .fetch_all(executor)
  .await
}

pub async fn insert(executor: impl PgExecutor<'_>, user_id: Uuid, address: &NewAddress) -> Result<Address, sqlx::Error> {
  sqlx::query_as::<_, Address>(
    "INSERT INTO address (name, address_line_1, address_line_2, city, state, zipcode, user_id) \
     VALUES ($1, $2, $3, $4, $5, $6, $7) \
     RETURNING id, name, address_line_1, address_line_2, city, state, zipcode",
  )
  .bind(address.name.as_deref())
  .bind(&address.address_line_1)
  .bind(&address.address_line_2)
  .bind(&address.city)
  .bind(&address.state)
  .bind(&address.zipcode)
  .bind(user_id)
  .fetch_one(executor)
  .await
}

/// Owner of the address, or `None` when it does not exist.
pub async fn owner_of(executor: impl PgExecutor<'_>, address_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
  sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM address WHERE id = $1")
    .bind(address_id)
    .fetch_optional(executor)
    .await
}
