use chrono::Utc;
use paylink_core::models::{
    ContentItem, ContentPatch, ContentQuery, ContentStatus, OwnerTotals, Payment,
};
use paylink_core::validation::MAX_EARNINGS;
use paylink_core::AppError;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::RecordStore;

/// In-memory record store for tests and local demos.
///
/// Every mutation happens under one write lock, which gives the same
/// atomicity as the Postgres store's single statements and transactions.
#[derive(Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    content: HashMap<Uuid, StoredContent>,
    payments: HashMap<Uuid, Vec<Payment>>,
    next_seq: u64,
}

struct StoredContent {
    seq: u64,
    item: ContentItem,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert_content(&self, item: &ContentItem) -> Result<ContentItem, AppError> {
        let mut state = self.inner.write().await;
        if state.content.contains_key(&item.id) {
            return Err(AppError::Internal(format!(
                "Content {} already exists",
                item.id
            )));
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.content.insert(
            item.id,
            StoredContent {
                seq,
                item: item.clone(),
            },
        );
        Ok(item.clone())
    }

    async fn get_content(&self, id: Uuid) -> Result<Option<ContentItem>, AppError> {
        let state = self.inner.read().await;
        Ok(state.content.get(&id).map(|stored| stored.item.clone()))
    }

    async fn list_content(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, AppError> {
        let state = self.inner.read().await;
        let mut matching: Vec<&StoredContent> = state
            .content
            .values()
            .filter(|stored| {
                query
                    .owner_id
                    .as_deref()
                    .is_none_or(|owner| stored.item.owner_id == owner)
                    && query.status.is_none_or(|status| stored.item.status == status)
            })
            .collect();

        matching.sort_by(|a, b| {
            b.item
                .created_at
                .cmp(&a.item.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        let limit = query
            .limit
            .map(|l| l.max(0) as usize)
            .unwrap_or(usize::MAX);

        Ok(matching
            .into_iter()
            .take(limit)
            .map(|stored| stored.item.clone())
            .collect())
    }

    async fn update_content(
        &self,
        id: Uuid,
        patch: &ContentPatch,
    ) -> Result<Option<ContentItem>, AppError> {
        let mut state = self.inner.write().await;
        let Some(stored) = state.content.get_mut(&id) else {
            return Ok(None);
        };
        let item = &mut stored.item;
        if let Some(title) = &patch.title {
            item.title = title.clone();
        }
        if let Some(description) = &patch.description {
            item.description = description.clone();
        }
        if let Some(price) = patch.price {
            item.price = price;
        }
        if let Some(status) = patch.status {
            item.status = status;
        }
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<ContentItem>, AppError> {
        let mut state = self.inner.write().await;
        Ok(state.content.get_mut(&id).map(|stored| {
            stored.item.views += 1;
            stored.item.clone()
        }))
    }

    async fn record_payment(&self, payment: &Payment) -> Result<Option<ContentItem>, AppError> {
        let mut state = self.inner.write().await;
        let updated = match state.content.get_mut(&payment.content_id) {
            Some(stored) if stored.item.status == ContentStatus::Active => {
                let earnings = stored
                    .item
                    .earnings
                    .checked_add(payment.amount)
                    .filter(|total| *total <= MAX_EARNINGS)
                    .ok_or_else(|| {
                        AppError::Internal(format!(
                            "Earnings overflow for content {}",
                            payment.content_id
                        ))
                    })?;
                stored.item.earnings = earnings;
                stored.item.updated_at = Utc::now();
                stored.item.clone()
            }
            _ => return Ok(None),
        };
        state
            .payments
            .entry(payment.content_id)
            .or_default()
            .push(payment.clone());
        Ok(Some(updated))
    }

    async fn list_payments(&self, content_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let state = self.inner.read().await;
        Ok(state
            .payments
            .get(&content_id)
            .map(|payments| payments.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn owner_totals(&self, owner_id: &str) -> Result<OwnerTotals, AppError> {
        let state = self.inner.read().await;
        let mut totals = OwnerTotals {
            total_earnings: Decimal::ZERO,
            ..Default::default()
        };
        for stored in state.content.values() {
            if stored.item.owner_id != owner_id {
                continue;
            }
            totals.content_count += 1;
            totals.total_views += stored.item.views;
            totals.total_earnings += stored.item.earnings;
            totals.payment_count += state
                .payments
                .get(&stored.item.id)
                .map_or(0, |p| p.len() as i64);
        }
        Ok(totals)
    }
}
