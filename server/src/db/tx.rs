// server/src/db/tx.rs

use std::sync::Arc;

use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::debug;

use crate::errors::{AppError, Result as AppResult};

/// A database transaction shared by the steps of one pipeline run.
///
/// Steps lock the handle for the duration of their queries. Dropping the last
/// clone without calling [`TxHandle::commit`] rolls the transaction back.
#[derive(Clone)]
pub struct TxHandle {
  inner: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl TxHandle {
  pub async fn begin(pool: &PgPool) -> AppResult<Self> {
    let tx = pool.begin().await?;
    debug!("Transaction started.");
    Ok(Self {
      inner: Arc::new(Mutex::new(Some(tx))),
    })
  }

  /// Exclusive access to the transaction's connection.
  pub async fn conn(&self) -> AppResult<MappedMutexGuard<'_, PgConnection>> {
    let guard = self.inner.lock().await;
    MutexGuard::try_map(guard, |slot| slot.as_deref_mut())
      .map_err(|_| AppError::Internal("Transaction already finished.".to_string()))
  }

  pub async fn commit(&self) -> AppResult<()> {
    let tx = self.take().await?;
    tx.commit().await?;
    debug!("Transaction committed.");
    Ok(())
  }

  pub async fn rollback(&self) -> AppResult<()> {
    let tx = self.take().await?;
    tx.rollback().await?;
    debug!("Transaction rolled back.");
    Ok(())
  }

  async fn take(&self) -> AppResult<Transaction<'static, Postgres>> {
    self
      .inner
      .lock()
      .await
      .take()
      .ok_or_else(|| AppError::Internal("Transaction already finished.".to_string()))
  }
}

impl std::fmt::Debug for TxHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TxHandle").finish_non_exhaustive()
  }
}
