//! Public pay page: locked preview, payment capture, unlock.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use paylink_core::models::{
    AccessState, DownloadableFile, LockedContent, PaymentIntent, UnlockedContent,
};
use paylink_core::validation::require_buyer_email;
use paylink_core::AppError;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::ledger::ContentLedger;

/// Captures money for a payment intent before the payment is recorded
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn capture(&self, intent: &PaymentIntent) -> Result<(), AppError>;
}

/// Gateway that always succeeds after an artificial delay. Nothing is settled.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn capture(&self, intent: &PaymentIntent) -> Result<(), AppError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        tracing::debug!(
            content_id = %intent.content_id,
            amount = %intent.amount,
            currency = %intent.currency,
            delay_ms = self.delay.as_millis() as u64,
            "Simulated payment captured"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct CheckoutService {
    ledger: Arc<ContentLedger>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    pub fn new(ledger: Arc<ContentLedger>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { ledger, gateway }
    }

    /// Serve the locked preview and count the visit.
    ///
    /// A failed view increment is logged and otherwise ignored.
    #[tracing::instrument(skip(self))]
    pub async fn view(&self, content_id: Uuid) -> Result<LockedContent, AppError> {
        let item = self.ledger.open_for_purchase(content_id).await?;

        if let Err(e) = self.ledger.record_view(content_id).await {
            tracing::warn!(content_id = %content_id, error = %e, "Failed to record view");
        }

        Ok(LockedContent::from(&item))
    }

    /// Pay the quoted amount and unlock the downloads for this visit.
    #[tracing::instrument(skip(self, buyer_email))]
    pub async fn purchase(
        &self,
        content_id: Uuid,
        buyer_email: &str,
        quoted_amount: Decimal,
    ) -> Result<UnlockedContent, AppError> {
        let item = self.ledger.open_for_purchase(content_id).await?;
        let buyer_email = require_buyer_email(buyer_email)?;

        if quoted_amount != item.price {
            return Err(AppError::Validation(format!(
                "The price changed to {} {}; please review and try again",
                item.price, item.currency
            )));
        }

        let intent = PaymentIntent {
            content_id,
            buyer_email,
            amount: item.price,
            currency: item.currency,
        };

        let start = std::time::Instant::now();
        self.gateway.capture(&intent).await.map_err(|e| {
            tracing::error!(content_id = %content_id, error = %e, "Payment capture failed");
            e
        })?;

        let payment = self.ledger.record_captured(&intent).await?;

        tracing::info!(
            content_id = %content_id,
            payment_id = %payment.id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Content unlocked"
        );

        let access = AccessState::Locked.unlock(&payment);
        Ok(UnlockedContent {
            content_id,
            title: item.title.clone(),
            files: item.files.iter().map(DownloadableFile::from).collect(),
            payment,
            access,
        })
    }
}
