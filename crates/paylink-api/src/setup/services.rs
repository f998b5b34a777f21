//! Wiring of the ledger, upload and checkout services

use crate::state::AppState;
use anyhow::{Context, Result};
use paylink_core::Config;
use paylink_db::create_record_store;
use paylink_services::{
    CheckoutService, ContentLedger, ShareLinks, SimulatedGateway, UploadLimits, UploadService,
};
use paylink_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;

pub fn initialize_services(
    config: &Config,
    pool: Option<PgPool>,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let store = create_record_store(config, pool.clone())
        .context("Failed to initialize record store")?;
    let ledger = Arc::new(ContentLedger::new(store));
    let links = ShareLinks::new(config.public_base_url());

    let uploads = UploadService::new(
        storage.clone(),
        ledger.clone(),
        links.clone(),
        UploadLimits {
            max_file_size_bytes: config.max_file_size_bytes(),
            max_files: config.max_files_per_upload(),
        },
    );

    let gateway = SimulatedGateway::from_millis(config.payment_simulation_delay_ms());
    let checkout = CheckoutService::new(ledger.clone(), Arc::new(gateway));

    tracing::info!(
        record_store = ?config.record_store(),
        payment_delay_ms = config.payment_simulation_delay_ms(),
        "Services initialized"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        ledger,
        uploads,
        checkout,
        storage,
        links,
        db_pool: pool,
    }))
}
