//! Content ledger
//!
//! Owns the rules around content records and their counters. Every write goes
//! through the `RecordStore`; the ledger never does read-modify-write on
//! `views` or `earnings` itself.

use std::sync::Arc;

use chrono::Utc;
use paylink_core::models::{
    ContentFile, ContentItem, ContentPatch, ContentQuery, ContentStatus, DashboardStats,
    EarningsAudit, NewContent, Payment, PaymentIntent, PaymentStatus,
};
use paylink_core::validation::{
    ensure_price, require_buyer_email, validate_title, MAX_TITLE_LENGTH,
};
use paylink_core::AppError;
use paylink_db::RecordStore;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Clone)]
pub struct ContentLedger {
    store: Arc<dyn RecordStore>,
}

impl ContentLedger {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Create a new, active content item with zeroed counters.
    ///
    /// A blank title falls back to the file names joined with ", ", cut to
    /// the title length limit.
    #[tracing::instrument(skip(self, new), fields(file_count = new.files.len()))]
    pub async fn create(&self, owner_id: &str, new: NewContent) -> Result<ContentItem, AppError> {
        if owner_id.trim().is_empty() {
            return Err(AppError::Unauthorized("Owner is required".to_string()));
        }
        if new.files.is_empty() {
            return Err(AppError::Validation(
                "At least one file is required".to_string(),
            ));
        }
        let price = ensure_price(new.price)?;

        let title = if new.title.trim().is_empty() {
            default_title(&new.files)
        } else {
            new.title.trim().to_string()
        };
        validate_title(&title)?;

        let now = Utc::now();
        let item = ContentItem {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            title,
            description: new.description,
            kind: new.kind,
            files: new.files,
            price,
            currency: new.currency,
            views: 0,
            earnings: Decimal::ZERO,
            status: ContentStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert_content(&item).await?;

        tracing::info!(
            content_id = %created.id,
            price = %created.price,
            currency = %created.currency,
            "Content created"
        );

        Ok(created)
    }

    /// Count one visit to the pay page. No dedup by visitor.
    #[tracing::instrument(skip(self))]
    pub async fn record_view(&self, content_id: Uuid) -> Result<ContentItem, AppError> {
        self.store
            .increment_views(content_id)
            .await?
            .ok_or_else(AppError::content_not_found)
    }

    /// Record a completed payment and add it to the item's earnings.
    ///
    /// Not idempotent: repeating a call records a second payment.
    #[tracing::instrument(skip(self, buyer_email))]
    pub async fn record_payment(
        &self,
        content_id: Uuid,
        buyer_email: &str,
        amount: Decimal,
    ) -> Result<Payment, AppError> {
        let item = self.open_for_purchase(content_id).await?;
        let buyer_email = require_buyer_email(buyer_email)?;

        if amount != item.price {
            return Err(AppError::Validation(format!(
                "The price changed to {} {}; please review and try again",
                item.price, item.currency
            )));
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            content_id,
            buyer_email,
            amount: item.price,
            currency: item.currency,
            status: PaymentStatus::Completed,
            created_at: Utc::now(),
        };

        self.persist_payment(&payment)
            .await?
            .ok_or_else(AppError::content_not_found)?;

        Ok(payment)
    }

    /// Record a payment whose money the gateway already captured.
    ///
    /// The intent's amount is what the buyer paid, so it is recorded as-is
    /// even if the owner changed the price meanwhile. If the item was
    /// deleted or unpublished in the meantime nothing is written and the
    /// capture is logged for manual reconciliation.
    #[tracing::instrument(skip(self, intent), fields(content_id = %intent.content_id))]
    pub async fn record_captured(&self, intent: &PaymentIntent) -> Result<Payment, AppError> {
        let payment = Payment {
            id: Uuid::new_v4(),
            content_id: intent.content_id,
            buyer_email: intent.buyer_email.clone(),
            amount: intent.amount,
            currency: intent.currency,
            status: PaymentStatus::Completed,
            created_at: Utc::now(),
        };

        match self.persist_payment(&payment).await? {
            Some(_) => Ok(payment),
            None => {
                tracing::error!(
                    content_id = %intent.content_id,
                    amount = %intent.amount,
                    currency = %intent.currency,
                    buyer_email = %intent.buyer_email,
                    "Captured payment could not be recorded; content is no longer for sale"
                );
                Err(AppError::PaymentFailed(
                    "Payment captured but the content is no longer for sale".to_string(),
                ))
            }
        }
    }

    async fn persist_payment(&self, payment: &Payment) -> Result<Option<ContentItem>, AppError> {
        let updated = self.store.record_payment(payment).await?;

        if let Some(item) = &updated {
            tracing::info!(
                content_id = %payment.content_id,
                payment_id = %payment.id,
                amount = %payment.amount,
                earnings = %item.earnings,
                "Payment recorded"
            );
        }

        Ok(updated)
    }

    pub async fn get(&self, content_id: Uuid) -> Result<ContentItem, AppError> {
        self.store
            .get_content(content_id)
            .await?
            .ok_or_else(AppError::content_not_found)
    }

    /// Owner-scoped lookup. Someone else's content reports as not found.
    pub async fn get_for_owner(
        &self,
        owner_id: &str,
        content_id: Uuid,
    ) -> Result<ContentItem, AppError> {
        let item = self.get(content_id).await?;
        if item.owner_id != owner_id {
            return Err(AppError::content_not_found());
        }
        Ok(item)
    }

    /// Content as seen from the public pay page: drafts are hidden.
    pub async fn open_for_purchase(&self, content_id: Uuid) -> Result<ContentItem, AppError> {
        let item = self.get(content_id).await?;
        if item.status != ContentStatus::Active {
            return Err(AppError::content_not_found());
        }
        Ok(item)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_for_owner(
        &self,
        owner_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<ContentItem>, AppError> {
        self.store
            .list_content(&ContentQuery {
                owner_id: Some(owner_id.to_string()),
                status: None,
                limit,
            })
            .await
    }

    #[tracing::instrument(skip(self, patch))]
    pub async fn update_details(
        &self,
        owner_id: &str,
        content_id: Uuid,
        patch: ContentPatch,
    ) -> Result<ContentItem, AppError> {
        if patch.is_empty() {
            return Err(AppError::Validation("No changes were provided".to_string()));
        }
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        let patch = ContentPatch {
            title: patch.title.map(|t| t.trim().to_string()),
            price: patch.price.map(ensure_price).transpose()?,
            ..patch
        };

        self.get_for_owner(owner_id, content_id).await?;

        let updated = self
            .store
            .update_content(content_id, &patch)
            .await?
            .ok_or_else(AppError::content_not_found)?;

        tracing::info!(content_id = %content_id, status = updated.status.as_str(), "Content updated");

        Ok(updated)
    }

    /// Payments for one of the owner's items, newest first
    pub async fn payments_for(
        &self,
        owner_id: &str,
        content_id: Uuid,
    ) -> Result<Vec<Payment>, AppError> {
        self.get_for_owner(owner_id, content_id).await?;
        self.store.list_payments(content_id).await
    }

    /// Compare the stored earnings with the sum of the recorded payments.
    #[tracing::instrument(skip(self))]
    pub async fn audit_earnings(&self, content_id: Uuid) -> Result<EarningsAudit, AppError> {
        let item = self.get(content_id).await?;
        let payments = self.store.list_payments(content_id).await?;

        let computed: Decimal = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
            .map(|p| p.amount)
            .sum();
        let consistent = computed == item.earnings;

        if !consistent {
            tracing::warn!(
                content_id = %content_id,
                recorded = %item.earnings,
                computed = %computed,
                "Earnings do not match recorded payments"
            );
        }

        Ok(EarningsAudit {
            content_id,
            recorded: item.earnings,
            computed,
            payment_count: payments.len(),
            consistent,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn dashboard(
        &self,
        owner_id: &str,
        recent_limit: i64,
    ) -> Result<DashboardStats, AppError> {
        let totals = self.store.owner_totals(owner_id).await?;
        let recent = self.list_for_owner(owner_id, Some(recent_limit)).await?;
        Ok(DashboardStats::new(totals, recent))
    }
}

fn default_title(files: &[ContentFile]) -> String {
    let joined = files
        .iter()
        .map(|f| f.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.chars().count() <= MAX_TITLE_LENGTH {
        return joined;
    }
    let mut title: String = joined.chars().take(MAX_TITLE_LENGTH - 1).collect();
    title.push('…');
    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use paylink_core::models::{ContentKind, Currency};
    use paylink_db::InMemoryRecordStore;
    use std::collections::HashSet;

    fn ledger() -> ContentLedger {
        ContentLedger::new(Arc::new(InMemoryRecordStore::new()))
    }

    fn file(name: &str) -> ContentFile {
        ContentFile {
            name: name.to_string(),
            url: format!("memory://blobs/content/1-abcd1234-{}", name),
            size_bytes: 10,
            content_type: "application/pdf".to_string(),
            storage_key: format!("content/1-abcd1234-{}", name),
        }
    }

    fn new_content(price: Decimal) -> NewContent {
        NewContent {
            title: "Guide".to_string(),
            description: "A PDF guide".to_string(),
            kind: ContentKind::Files,
            files: vec![file("a.pdf")],
            price,
            currency: Currency::Usd,
        }
    }

    #[tokio::test]
    async fn create_starts_active_with_zero_counters() {
        let ledger = ledger();
        let mut ids = HashSet::new();
        for _ in 0..3 {
            let item = ledger
                .create("alice", new_content(Decimal::new(500, 2)))
                .await
                .unwrap();
            assert_eq!(item.views, 0);
            assert_eq!(item.earnings, Decimal::ZERO);
            assert_eq!(item.status, ContentStatus::Active);
            assert!(ids.insert(item.id));
        }
    }

    #[tokio::test]
    async fn create_round_trips_through_the_store() {
        let ledger = ledger();
        let mut new = new_content(Decimal::new(999, 2));
        new.files = vec![file("a.pdf"), file("b.pdf")];
        let created = ledger.create("alice", new).await.unwrap();

        let read = ledger.get(created.id).await.unwrap();
        assert_eq!(read.files, created.files);
        assert_eq!(read.price, Decimal::new(999, 2));
        assert_eq!(read.currency, Currency::Usd);
        assert_eq!(read.files[1].name, "b.pdf");
    }

    #[tokio::test]
    async fn create_rejects_empty_files_and_negative_price() {
        let ledger = ledger();

        let mut no_files = new_content(Decimal::ONE);
        no_files.files.clear();
        assert!(matches!(
            ledger.create("alice", no_files).await,
            Err(AppError::Validation(_))
        ));

        assert!(matches!(
            ledger.create("alice", new_content(Decimal::NEGATIVE_ONE)).await,
            Err(AppError::Validation(_))
        ));

        assert!(ledger.list_for_owner("alice", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_title_defaults_to_file_names() {
        let ledger = ledger();
        let mut new = new_content(Decimal::ONE);
        new.title = "  ".to_string();
        new.files = vec![file("a.pdf"), file("b.pdf")];
        let item = ledger.create("alice", new).await.unwrap();
        assert_eq!(item.title, "a.pdf, b.pdf");
    }

    #[tokio::test]
    async fn default_title_from_many_files_is_shortened() {
        let ledger = ledger();
        let mut new = new_content(Decimal::ONE);
        new.title = String::new();
        new.files = (1..=20)
            .map(|n| file(&format!("holiday-photo-{:02}.pdf", n)))
            .collect();

        let item = ledger.create("alice", new).await.unwrap();
        assert_eq!(item.title.chars().count(), MAX_TITLE_LENGTH);
        assert!(item.title.starts_with("holiday-photo-01.pdf, holiday-photo-02.pdf"));
        assert!(item.title.ends_with('…'));
    }

    #[test]
    fn default_title_cuts_on_char_boundary() {
        let files: Vec<ContentFile> = (0..40).map(|_| file("日本語の写真.pdf")).collect();
        let title = default_title(&files);
        assert_eq!(title.chars().count(), MAX_TITLE_LENGTH);
        assert!(validate_title(&title).is_ok());
    }

    #[tokio::test]
    async fn sequential_views_add_up() {
        let ledger = ledger();
        let item = ledger.create("alice", new_content(Decimal::ONE)).await.unwrap();
        for _ in 0..5 {
            ledger.record_view(item.id).await.unwrap();
        }
        assert_eq!(ledger.get(item.id).await.unwrap().views, 5);
    }

    #[tokio::test]
    async fn concurrent_views_on_fresh_item() {
        let ledger = ledger();
        let item = ledger.create("alice", new_content(Decimal::ONE)).await.unwrap();

        let (a, b) = tokio::join!(ledger.record_view(item.id), ledger.record_view(item.id));
        a.unwrap();
        b.unwrap();

        let views = ledger.get(item.id).await.unwrap().views;
        assert!((1..=2).contains(&views));
    }

    #[tokio::test]
    async fn view_of_unknown_content_is_not_found() {
        let ledger = ledger();
        assert!(matches!(
            ledger.record_view(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn payment_adds_to_earnings() {
        let ledger = ledger();
        let item = ledger
            .create("alice", new_content(Decimal::new(999, 2)))
            .await
            .unwrap();

        let payment = ledger
            .record_payment(item.id, " buyer@example.com ", Decimal::new(999, 2))
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.buyer_email, "buyer@example.com");
        assert_eq!(payment.currency, Currency::Usd);

        let after = ledger.get(item.id).await.unwrap();
        assert_eq!(after.earnings, Decimal::new(999, 2));
        let payments = ledger.payments_for("alice", item.id).await.unwrap();
        assert_eq!(payments, vec![payment]);
    }

    #[tokio::test]
    async fn duplicate_payment_is_counted_twice() {
        let ledger = ledger();
        let item = ledger
            .create("alice", new_content(Decimal::new(500, 2)))
            .await
            .unwrap();

        for _ in 0..2 {
            ledger
                .record_payment(item.id, "buyer@example.com", Decimal::new(500, 2))
                .await
                .unwrap();
        }

        assert_eq!(ledger.get(item.id).await.unwrap().earnings, Decimal::new(1000, 2));
        assert_eq!(ledger.payments_for("alice", item.id).await.unwrap().len(), 2);
        assert!(ledger.audit_earnings(item.id).await.unwrap().consistent);
    }

    #[tokio::test]
    async fn payment_validation() {
        let ledger = ledger();
        let item = ledger
            .create("alice", new_content(Decimal::new(500, 2)))
            .await
            .unwrap();

        assert!(matches!(
            ledger.record_payment(item.id, "  ", item.price).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ledger
                .record_payment(item.id, "buyer@example.com", Decimal::new(400, 2))
                .await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ledger
                .record_payment(Uuid::new_v4(), "buyer@example.com", item.price)
                .await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(ledger.get(item.id).await.unwrap().earnings, Decimal::ZERO);
    }

    #[tokio::test]
    async fn drafts_cannot_be_purchased() {
        let ledger = ledger();
        let item = ledger.create("alice", new_content(Decimal::ONE)).await.unwrap();
        ledger
            .update_details(
                "alice",
                item.id,
                ContentPatch {
                    status: Some(ContentStatus::Draft),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            ledger.open_for_purchase(item.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            ledger
                .record_payment(item.id, "buyer@example.com", Decimal::ONE)
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn captured_payment_keeps_the_paid_amount() {
        let ledger = ledger();
        let item = ledger
            .create("alice", new_content(Decimal::new(499, 2)))
            .await
            .unwrap();
        ledger
            .update_details(
                "alice",
                item.id,
                ContentPatch {
                    price: Some(Decimal::new(999, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let payment = ledger
            .record_captured(&PaymentIntent {
                content_id: item.id,
                buyer_email: "buyer@example.com".to_string(),
                amount: Decimal::new(499, 2),
                currency: Currency::Usd,
            })
            .await
            .unwrap();
        assert_eq!(payment.amount, Decimal::new(499, 2));
        assert_eq!(ledger.get(item.id).await.unwrap().earnings, Decimal::new(499, 2));
        assert!(ledger.audit_earnings(item.id).await.unwrap().consistent);
    }

    #[tokio::test]
    async fn captured_payment_for_unpublished_content_fails() {
        let ledger = ledger();
        let item = ledger.create("alice", new_content(Decimal::ONE)).await.unwrap();
        ledger
            .update_details(
                "alice",
                item.id,
                ContentPatch {
                    status: Some(ContentStatus::Draft),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = ledger
            .record_captured(&PaymentIntent {
                content_id: item.id,
                buyer_email: "buyer@example.com".to_string(),
                amount: Decimal::ONE,
                currency: Currency::Usd,
            })
            .await;
        assert!(matches!(result, Err(AppError::PaymentFailed(_))));
        assert_eq!(ledger.get(item.id).await.unwrap().earnings, Decimal::ZERO);
        assert!(ledger.payments_for("alice", item.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_the_owner_can_edit() {
        let ledger = ledger();
        let item = ledger.create("alice", new_content(Decimal::ONE)).await.unwrap();
        let patch = ContentPatch {
            price: Some(Decimal::new(200, 2)),
            ..Default::default()
        };

        assert!(matches!(
            ledger.update_details("mallory", item.id, patch.clone()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            ledger.update_details("alice", item.id, ContentPatch::default()).await,
            Err(AppError::Validation(_))
        ));

        let updated = ledger.update_details("alice", item.id, patch).await.unwrap();
        assert_eq!(updated.price, Decimal::new(2, 0));
    }

    #[tokio::test]
    async fn old_payments_keep_their_amount_after_price_change() {
        let ledger = ledger();
        let item = ledger.create("alice", new_content(Decimal::ONE)).await.unwrap();
        ledger
            .record_payment(item.id, "buyer@example.com", Decimal::ONE)
            .await
            .unwrap();
        ledger
            .update_details(
                "alice",
                item.id,
                ContentPatch {
                    price: Some(Decimal::new(3, 0)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let payments = ledger.payments_for("alice", item.id).await.unwrap();
        assert_eq!(payments[0].amount, Decimal::ONE);
        let audit = ledger.audit_earnings(item.id).await.unwrap();
        assert_eq!(audit.recorded, Decimal::ONE);
        assert!(audit.consistent);
    }

    #[tokio::test]
    async fn dashboard_reports_totals_and_recent() {
        let ledger = ledger();
        let a = ledger.create("alice", new_content(Decimal::new(500, 2))).await.unwrap();
        let b = ledger.create("alice", new_content(Decimal::new(250, 2))).await.unwrap();
        ledger.create("bob", new_content(Decimal::ONE)).await.unwrap();

        for _ in 0..4 {
            ledger.record_view(a.id).await.unwrap();
        }
        ledger
            .record_payment(a.id, "buyer@example.com", a.price)
            .await
            .unwrap();

        let stats = ledger.dashboard("alice", 1).await.unwrap();
        assert_eq!(stats.total_content, 2);
        assert_eq!(stats.total_views, 4);
        assert_eq!(stats.total_payments, 1);
        assert_eq!(stats.total_earnings, Decimal::new(500, 2));
        assert!((stats.conversion_rate - 25.0).abs() < 1e-9);
        assert_eq!(stats.recent.len(), 1);
        assert_eq!(stats.recent[0].id, b.id);
    }
}
