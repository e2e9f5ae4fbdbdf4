//! Payout and payout adjustment repository
//!
//! Uniqueness of (host, booking) and of one adjustment per payout is left to
//! the database constraints; violations surface as `DuplicateEntry`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payout_status", rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payout_method", rename_all = "snake_case")]
pub enum PayoutMethod {
    BankTransfer,
    Upi,
    Wallet,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PayoutRow {
    pub payout_id: Uuid,
    pub host_id: Uuid,
    pub booking_id: Uuid,
    pub currency: String,
    pub total_amount: Decimal,
    pub commission_amount: Decimal,
    pub gst_amount: Decimal,
    pub tcs_amount: Decimal,
    pub platform_fee_amount: Decimal,
    pub penalty_amount: Decimal,
    pub total_deductions: Decimal,
    pub net_payout: Decimal,
    pub settings_version: i32,
    pub payout_method: PayoutMethod,
    pub destination: Value,
    pub status: PayoutStatus,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    pub failure_reason: Option<String>,
    pub retry_count: i32,
    pub last_retry_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdjustmentRow {
    pub adjustment_id: Uuid,
    pub payout_id: Uuid,
    pub booking_id: Uuid,
    pub host_id: Uuid,
    pub currency: String,
    pub amount: Decimal,
    pub revised_net_payout: Decimal,
    pub settings_version: i32,
    pub reason: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

const PAYOUT_COLUMNS: &str = r#"
    payout_id, host_id, booking_id, currency, total_amount, commission_amount,
    gst_amount, tcs_amount, platform_fee_amount, penalty_amount, total_deductions,
    net_payout, settings_version, payout_method, destination, status,
    transaction_id, notes, failure_reason, retry_count, last_retry_at,
    processed_at, created_by, updated_by, created_at, updated_at
"#;

#[derive(Debug, Clone)]
pub struct PayoutRepository {
    pool: PgPool,
}

impl PayoutRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn existing_booking_ids(
        &self,
        host_id: Uuid,
        booking_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, DatabaseError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT booking_id FROM payouts WHERE host_id = $1 AND booking_id = ANY($2)",
        )
        .bind(host_id)
        .bind(booking_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn insert(&self, row: &PayoutRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO payouts (
                payout_id, host_id, booking_id, currency, total_amount, commission_amount,
                gst_amount, tcs_amount, platform_fee_amount, penalty_amount, total_deductions,
                net_payout, settings_version, payout_method, destination, status,
                transaction_id, notes, failure_reason, retry_count, last_retry_at,
                processed_at, created_by, updated_by, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26
            )
            "#,
        )
        .bind(row.payout_id)
        .bind(row.host_id)
        .bind(row.booking_id)
        .bind(&row.currency)
        .bind(row.total_amount)
        .bind(row.commission_amount)
        .bind(row.gst_amount)
        .bind(row.tcs_amount)
        .bind(row.platform_fee_amount)
        .bind(row.penalty_amount)
        .bind(row.total_deductions)
        .bind(row.net_payout)
        .bind(row.settings_version)
        .bind(row.payout_method)
        .bind(&row.destination)
        .bind(row.status)
        .bind(&row.transaction_id)
        .bind(&row.notes)
        .bind(&row.failure_reason)
        .bind(row.retry_count)
        .bind(row.last_retry_at)
        .bind(row.processed_at)
        .bind(&row.created_by)
        .bind(&row.updated_by)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, payout_id: Uuid) -> Result<PayoutRow, DatabaseError> {
        let sql = format!("SELECT {} FROM payouts WHERE payout_id = $1", PAYOUT_COLUMNS);
        sqlx::query_as::<_, PayoutRow>(&sql)
            .bind(payout_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Payout", payout_id))
    }

    /// Writes the status columns only if the stored status is `expected`
    ///
    /// Returns `StaleUpdate` when the row exists with another status.
    pub async fn update_status(
        &self,
        row: &PayoutRow,
        expected: PayoutStatus,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE payouts SET
                status = $3,
                transaction_id = $4,
                notes = $5,
                failure_reason = $6,
                retry_count = $7,
                last_retry_at = $8,
                processed_at = $9,
                updated_by = $10,
                updated_at = $11
            WHERE payout_id = $1 AND status = $2
            "#,
        )
        .bind(row.payout_id)
        .bind(expected)
        .bind(row.status)
        .bind(&row.transaction_id)
        .bind(&row.notes)
        .bind(&row.failure_reason)
        .bind(row.retry_count)
        .bind(row.last_retry_at)
        .bind(row.processed_at)
        .bind(&row.updated_by)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get(row.payout_id).await?;
            return Err(DatabaseError::StaleUpdate(format!(
                "payout {} is {:?}, expected {:?}",
                row.payout_id, current.status, expected
            )));
        }
        Ok(())
    }

    pub async fn list_for_host(
        &self,
        host_id: Uuid,
        status: Option<PayoutStatus>,
    ) -> Result<Vec<PayoutRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {} FROM payouts
            WHERE host_id = $1 AND ($2::payout_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
            PAYOUT_COLUMNS
        );
        let rows = sqlx::query_as::<_, PayoutRow>(&sql)
            .bind(host_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<PayoutRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM payouts WHERE booking_id = $1", PAYOUT_COLUMNS);
        let row = sqlx::query_as::<_, PayoutRow>(&sql)
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn insert_adjustment(&self, row: &AdjustmentRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO payout_adjustments (
                adjustment_id, payout_id, booking_id, host_id, currency, amount,
                revised_net_payout, settings_version, reason, created_by, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(row.adjustment_id)
        .bind(row.payout_id)
        .bind(row.booking_id)
        .bind(row.host_id)
        .bind(&row.currency)
        .bind(row.amount)
        .bind(row.revised_net_payout)
        .bind(row.settings_version)
        .bind(&row.reason)
        .bind(&row.created_by)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_adjustment(&self, payout_id: Uuid) -> Result<Option<AdjustmentRow>, DatabaseError> {
        let row = sqlx::query_as::<_, AdjustmentRow>(
            r#"
            SELECT adjustment_id, payout_id, booking_id, host_id, currency, amount,
                   revised_net_payout, settings_version, reason, created_by, created_at
            FROM payout_adjustments
            WHERE payout_id = $1
            "#,
        )
        .bind(payout_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
