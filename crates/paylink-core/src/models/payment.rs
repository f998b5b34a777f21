use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::content::Currency;

/// Payment state. Only completed payments are ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "completed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(PaymentStatus::Completed),
            _ => Err(anyhow::anyhow!("Invalid payment status: {}", s)),
        }
    }
}

/// A recorded purchase of a content item. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub content_id: Uuid,
    pub buyer_email: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Money about to be captured by the payment gateway
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub content_id: Uuid,
    pub buyer_email: String,
    pub amount: Decimal,
    pub currency: Currency,
}

/// Request DTO for paying for a content item
#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    #[serde(default)]
    pub buyer_email: String,
    /// The price the buyer was shown; must still match the current price
    pub amount: Decimal,
}
