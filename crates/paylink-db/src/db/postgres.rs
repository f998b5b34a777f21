//! PostgreSQL record store: `content_items` and `payments` tables.

use chrono::{DateTime, Utc};
use paylink_core::models::{
    ContentFile, ContentItem, ContentPatch, ContentQuery, OwnerTotals, Payment,
};
use paylink_core::AppError;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

use super::traits::RecordStore;
use super::transaction::TransactionGuard;

const CONTENT_COLUMNS: &str = "id, owner_id, title, description, kind, files, price, currency, \
     views, earnings, status, created_at, updated_at";

const PAYMENT_COLUMNS: &str = "id, content_id, buyer_email, amount, currency, status, created_at";

/// Row type for content_items (enums are stored as TEXT)
#[derive(Debug, sqlx::FromRow)]
pub struct ContentRow {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub kind: String,
    pub files: Json<Vec<ContentFile>>,
    pub price: Decimal,
    pub currency: String,
    pub views: i64,
    pub earnings: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for ContentItem {
    type Error = AppError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        Ok(ContentItem {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            kind: row.kind.parse()?,
            files: row.files.0,
            price: row.price,
            currency: row.currency.parse()?,
            views: row.views,
            earnings: row.earnings,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row type for payments
#[derive(Debug, sqlx::FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub content_id: Uuid,
    pub buyer_email: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: row.id,
            content_id: row.content_id,
            buyer_email: row.buyer_email,
            amount: row.amount,
            currency: row.currency.parse()?,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl RecordStore for PostgresRecordStore {
    #[tracing::instrument(skip(self, item), fields(db.table = "content_items", db.operation = "insert", db.record_id = %item.id))]
    async fn insert_content(&self, item: &ContentItem) -> Result<ContentItem, AppError> {
        let row = sqlx::query_as::<Postgres, ContentRow>(&format!(
            r#"
            INSERT INTO content_items
                (id, owner_id, title, description, kind, files, price, currency,
                 views, earnings, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            CONTENT_COLUMNS
        ))
        .bind(item.id)
        .bind(&item.owner_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.kind.as_str())
        .bind(Json(&item.files))
        .bind(item.price)
        .bind(item.currency.code())
        .bind(item.views)
        .bind(item.earnings)
        .bind(item.status.as_str())
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[tracing::instrument(skip(self), fields(db.table = "content_items", db.operation = "select", db.record_id = %id))]
    async fn get_content(&self, id: Uuid) -> Result<Option<ContentItem>, AppError> {
        let row = sqlx::query_as::<Postgres, ContentRow>(&format!(
            "SELECT {} FROM content_items WHERE id = $1",
            CONTENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ContentItem::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "content_items", db.operation = "select"))]
    async fn list_content(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, AppError> {
        let rows = sqlx::query_as::<Postgres, ContentRow>(&format!(
            r#"
            SELECT {}
            FROM content_items
            WHERE ($1::TEXT IS NULL OR owner_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
            CONTENT_COLUMNS
        ))
        .bind(query.owner_id.as_deref())
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ContentItem::try_from).collect()
    }

    #[tracing::instrument(skip(self, patch), fields(db.table = "content_items", db.operation = "update", db.record_id = %id))]
    async fn update_content(
        &self,
        id: Uuid,
        patch: &ContentPatch,
    ) -> Result<Option<ContentItem>, AppError> {
        let row = sqlx::query_as::<Postgres, ContentRow>(&format!(
            r#"
            UPDATE content_items
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CONTENT_COLUMNS
        ))
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.price)
        .bind(patch.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(ContentItem::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "content_items", db.operation = "update", db.record_id = %id))]
    async fn increment_views(&self, id: Uuid) -> Result<Option<ContentItem>, AppError> {
        let row = sqlx::query_as::<Postgres, ContentRow>(&format!(
            "UPDATE content_items SET views = views + 1 WHERE id = $1 RETURNING {}",
            CONTENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ContentItem::try_from).transpose()
    }

    #[tracing::instrument(skip(self, payment), fields(db.table = "payments", db.operation = "insert", db.record_id = %payment.id))]
    async fn record_payment(&self, payment: &Payment) -> Result<Option<ContentItem>, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let updated = sqlx::query_as::<Postgres, ContentRow>(&format!(
            r#"
            UPDATE content_items
            SET earnings = earnings + $2, updated_at = NOW()
            WHERE id = $1 AND status = 'active'
            RETURNING {}
            "#,
            CONTENT_COLUMNS
        ))
        .bind(payment.content_id)
        .bind(payment.amount)
        .fetch_optional(&mut **tx)
        .await?;

        let Some(updated) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO payments (id, content_id, buyer_email, amount, currency, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(payment.id)
        .bind(payment.content_id)
        .bind(&payment.buyer_email)
        .bind(payment.amount)
        .bind(payment.currency.code())
        .bind(payment.status.as_str())
        .bind(payment.created_at)
        .execute(&mut **tx)
        .await?;

        tx.commit().await?;

        Ok(Some(updated.try_into()?))
    }

    #[tracing::instrument(skip(self), fields(db.table = "payments", db.operation = "select"))]
    async fn list_payments(&self, content_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let rows = sqlx::query_as::<Postgres, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE content_id = $1 ORDER BY created_at DESC, id DESC",
            PAYMENT_COLUMNS
        ))
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    #[tracing::instrument(skip(self), fields(db.table = "content_items", db.operation = "select"))]
    async fn owner_totals(&self, owner_id: &str) -> Result<OwnerTotals, AppError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*)::BIGINT AS content_count,
                COALESCE(SUM(c.views), 0)::BIGINT AS total_views,
                COALESCE(SUM(c.earnings), 0)::NUMERIC AS total_earnings,
                (
                    SELECT COUNT(*)::BIGINT
                    FROM payments p
                    JOIN content_items pc ON pc.id = p.content_id
                    WHERE pc.owner_id = $1
                ) AS payment_count
            FROM content_items c
            WHERE c.owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(OwnerTotals {
            content_count: row.try_get("content_count")?,
            total_views: row.try_get("total_views")?,
            total_earnings: row.try_get("total_earnings")?,
            payment_count: row.try_get("payment_count")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paylink_core::models::{Currency, PaymentStatus};
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn transaction_failures_surface_as_database_errors() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://paylink@localhost/unused")
            .unwrap();
        pool.close().await;
        let store = PostgresRecordStore::new(pool);

        let payment = Payment {
            id: Uuid::new_v4(),
            content_id: Uuid::new_v4(),
            buyer_email: "buyer@example.com".to_string(),
            amount: Decimal::ONE,
            currency: Currency::Usd,
            status: PaymentStatus::Completed,
            created_at: Utc::now(),
        };
        let result = store.record_payment(&payment).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
