//! Record store implementations
//
// Port shared by all backends
pub mod traits;
//
// Backends
pub mod memory;
pub mod postgres;
//
// Transaction utilities
pub mod transaction;

pub use memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
pub use traits::RecordStore;

use paylink_core::{AppError, Config, RecordStoreBackend};
use sqlx::PgPool;
use std::sync::Arc;

/// Factory function to create the record store selected by `RECORD_STORE`.
/// `pool` is required for the Postgres backend.
pub fn create_record_store(
    config: &Config,
    pool: Option<PgPool>,
) -> Result<Arc<dyn RecordStore>, AppError> {
    match config.record_store() {
        RecordStoreBackend::Postgres => {
            let pool = pool.ok_or_else(|| {
                AppError::Internal("Postgres record store requires a connection pool".to_string())
            })?;
            tracing::info!("Initializing PostgreSQL record store");
            Ok(Arc::new(PostgresRecordStore::new(pool)))
        }
        RecordStoreBackend::Memory => {
            tracing::warn!("Using in-memory record store; content and payments are lost on restart");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
    }
}
