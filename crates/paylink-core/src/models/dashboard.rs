use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::content::ContentItem;

/// Aggregates over all of an owner's content, computed by the record store
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct OwnerTotals {
    pub content_count: i64,
    pub total_views: i64,
    pub total_earnings: Decimal,
    pub payment_count: i64,
}

/// Dashboard figures for the signed-in owner
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_earnings: Decimal,
    pub total_views: i64,
    pub total_content: i64,
    pub total_payments: i64,
    /// Payments per hundred views
    pub conversion_rate: f64,
    pub recent: Vec<ContentItem>,
}

impl DashboardStats {
    pub fn new(totals: OwnerTotals, recent: Vec<ContentItem>) -> Self {
        let conversion_rate = if totals.total_views > 0 {
            totals.payment_count as f64 / totals.total_views as f64 * 100.0
        } else {
            0.0
        };
        DashboardStats {
            total_earnings: totals.total_earnings,
            total_views: totals.total_views,
            total_content: totals.content_count,
            total_payments: totals.payment_count,
            conversion_rate,
            recent,
        }
    }
}

/// Comparison of the earnings accumulator against the payment records
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EarningsAudit {
    pub content_id: Uuid,
    pub recorded: Decimal,
    pub computed: Decimal,
    pub payment_count: usize,
    pub consistent: bool,
}
