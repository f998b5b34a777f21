//! Storage setup and initialization

use anyhow::{Context, Result};
use paylink_core::Config;
use paylink_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing object storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize object storage")?;
    tracing::info!(
        backend = ?storage.backend_type(),
        "Object storage initialized successfully"
    );
    Ok(storage)
}
