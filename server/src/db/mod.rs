// server/src/db/mod.rs

//! Runtime SQL queries, grouped by table. Functions that run inside a
//! pipeline transaction take `&mut PgConnection` or any `PgExecutor`.

pub mod addresses;
pub mod carts;
pub mod catalog;
pub mod orders;
pub mod promos;
pub mod reviews;
pub mod tx;
pub mod users;

pub use tx::TxHandle;

use crate::errors::Result as AppResult;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Opens the connection pool.
pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<PgPool> {
  let pool = PgPoolOptions::new()
    .max_connections(max_connections)
    .connect(database_url)
    .await?;
  Ok(pool)
}

/// Applies the embedded migrations under `server/migrations`.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
  sqlx::migrate!("./migrations").run(pool).await?;
  Ok(())
}
