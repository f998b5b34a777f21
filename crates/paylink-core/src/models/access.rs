//! Per-visit access state of the public pay page.
//!
//! There is no persisted per-viewer grant: a visit starts `Locked` and the
//! purchase response is the only place the `Unlocked` state (and the download
//! URLs) ever appear.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::content::{ContentFile, ContentItem, ContentKind, Currency};
use super::payment::Payment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AccessState {
    Locked,
    Unlocked { payment_id: Uuid },
}

impl AccessState {
    /// Transition taken after a payment has been recorded. `Unlocked` is terminal,
    /// so unlocking twice keeps the first grant.
    pub fn unlock(self, payment: &Payment) -> AccessState {
        match self {
            AccessState::Locked => AccessState::Unlocked {
                payment_id: payment.id,
            },
            unlocked @ AccessState::Unlocked { .. } => unlocked,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, AccessState::Unlocked { .. })
    }
}

/// Public preview shown before payment. Carries no file URLs.
#[derive(Debug, Serialize, ToSchema)]
pub struct LockedContent {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub kind: ContentKind,
    pub price: Decimal,
    pub currency: Currency,
    pub file_count: usize,
    pub file_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub access: AccessState,
}

impl From<&ContentItem> for LockedContent {
    fn from(item: &ContentItem) -> Self {
        LockedContent {
            id: item.id,
            title: item.title.clone(),
            description: item.description.clone(),
            kind: item.kind,
            price: item.price,
            currency: item.currency,
            file_count: item.files.len(),
            file_names: item.files.iter().map(|f| f.name.clone()).collect(),
            created_at: item.created_at,
            access: AccessState::Locked,
        }
    }
}

/// A file the buyer may now download
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DownloadableFile {
    pub name: String,
    pub url: String,
    pub size_bytes: i64,
    pub content_type: String,
}

impl From<&ContentFile> for DownloadableFile {
    fn from(file: &ContentFile) -> Self {
        DownloadableFile {
            name: file.name.clone(),
            url: file.url.clone(),
            size_bytes: file.size_bytes,
            content_type: file.content_type.clone(),
        }
    }
}

/// Purchase response: the payment plus the unlocked downloads
#[derive(Debug, Serialize, ToSchema)]
pub struct UnlockedContent {
    pub content_id: Uuid,
    pub title: String,
    pub payment: Payment,
    pub files: Vec<DownloadableFile>,
    pub access: AccessState,
}
