use paylink_core::models::{ContentItem, ContentPatch, ContentQuery, OwnerTotals, Payment};
use paylink_core::AppError;
use uuid::Uuid;

/// Record store operations used by the content ledger
///
/// Counters are updated atomically by the store itself: `increment_views` and
/// `record_payment` never read-modify-write in the caller, so concurrent
/// events are never lost.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_content(&self, item: &ContentItem) -> Result<ContentItem, AppError>;

    async fn get_content(&self, id: Uuid) -> Result<Option<ContentItem>, AppError>;

    /// Newest first
    async fn list_content(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, AppError>;

    /// Apply an owner edit. `None` when no item has this id.
    async fn update_content(
        &self,
        id: Uuid,
        patch: &ContentPatch,
    ) -> Result<Option<ContentItem>, AppError>;

    /// Add one view. `None` when no item has this id.
    async fn increment_views(&self, id: Uuid) -> Result<Option<ContentItem>, AppError>;

    /// Persist `payment` and add its amount to the item's earnings as one unit.
    /// `None`, with nothing written, when the content does not exist or is not
    /// active.
    async fn record_payment(&self, payment: &Payment) -> Result<Option<ContentItem>, AppError>;

    /// Newest first
    async fn list_payments(&self, content_id: Uuid) -> Result<Vec<Payment>, AppError>;

    async fn owner_totals(&self, owner_id: &str) -> Result<OwnerTotals, AppError>;
}
