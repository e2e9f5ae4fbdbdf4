//! Dispute repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::bookings::DisputeStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "dispute_party", rename_all = "snake_case")]
pub enum DisputeParty {
    Guest,
    Host,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DisputeRow {
    pub dispute_id: Uuid,
    pub booking_id: Uuid,
    pub raised_by: DisputeParty,
    pub reason: String,
    pub status: DisputeStatus,
    pub resolution_notes: Option<String>,
    pub refund_amount: Option<Decimal>,
    pub refund_currency: Option<String>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

const DISPUTE_COLUMNS: &str = r#"
    dispute_id, booking_id, raised_by, reason, status, resolution_notes,
    refund_amount, refund_currency, resolved_by, resolved_at, created_at
"#;

#[derive(Debug, Clone)]
pub struct DisputeRepository {
    pool: PgPool,
}

impl DisputeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a case; the partial unique index rejects a second open case per booking
    pub async fn insert(&self, row: &DisputeRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO disputes (
                dispute_id, booking_id, raised_by, reason, status, resolution_notes,
                refund_amount, refund_currency, resolved_by, resolved_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(row.dispute_id)
        .bind(row.booking_id)
        .bind(row.raised_by)
        .bind(&row.reason)
        .bind(row.status)
        .bind(&row.resolution_notes)
        .bind(row.refund_amount)
        .bind(&row.refund_currency)
        .bind(&row.resolved_by)
        .bind(row.resolved_at)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, dispute_id: Uuid) -> Result<DisputeRow, DatabaseError> {
        let sql = format!("SELECT {} FROM disputes WHERE dispute_id = $1", DISPUTE_COLUMNS);
        sqlx::query_as::<_, DisputeRow>(&sql)
            .bind(dispute_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Dispute", dispute_id))
    }

    pub async fn find_open(&self, booking_id: Uuid) -> Result<Option<DisputeRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM disputes WHERE booking_id = $1 AND status = 'pending'",
            DISPUTE_COLUMNS
        );
        let row = sqlx::query_as::<_, DisputeRow>(&sql)
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn update(&self, row: &DisputeRow) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE disputes SET
                status = $2,
                resolution_notes = $3,
                refund_amount = $4,
                refund_currency = $5,
                resolved_by = $6,
                resolved_at = $7
            WHERE dispute_id = $1
            "#,
        )
        .bind(row.dispute_id)
        .bind(row.status)
        .bind(&row.resolution_notes)
        .bind(row.refund_amount)
        .bind(&row.refund_currency)
        .bind(&row.resolved_by)
        .bind(row.resolved_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Dispute", row.dispute_id));
        }
        Ok(())
    }
}
