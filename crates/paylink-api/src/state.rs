//! Application state shared by every handler through `State<Arc<AppState>>`.

use paylink_core::Config;
use paylink_services::{CheckoutService, ContentLedger, ShareLinks, UploadService};
use paylink_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub ledger: Arc<ContentLedger>,
    pub uploads: UploadService,
    pub checkout: CheckoutService,
    pub storage: Arc<dyn Storage>,
    pub links: ShareLinks,
    /// Present only when the record store is Postgres
    pub db_pool: Option<PgPool>,
}
