//! Booking ledger repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
pub enum BookingStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "refund_status", rename_all = "snake_case")]
pub enum RefundStatus {
    None,
    Pending,
    Approved,
    Processed,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "dispute_status", rename_all = "snake_case")]
pub enum DisputeStatus {
    None,
    Pending,
    Resolved,
    Rejected,
}

/// A row of the `bookings` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRow {
    pub booking_id: Uuid,
    pub reference: String,
    pub host_id: Uuid,
    pub guest_id: Uuid,
    pub stay_id: Uuid,
    pub currency: String,
    pub base_amount: Decimal,
    pub cleaning_fee: Decimal,
    pub extra_guest_charge: Decimal,
    pub discount: Decimal,
    pub total_amount: Decimal,
    pub penalty_amount: Decimal,
    pub breakdown: Option<Value>,
    pub payment_status: PaymentStatus,
    pub booking_status: BookingStatus,
    pub refund_status: RefundStatus,
    pub refund_amount: Option<Decimal>,
    pub refund_reason: Option<String>,
    pub refund_requested_at: Option<DateTime<Utc>>,
    pub refund_approved_at: Option<DateTime<Utc>>,
    pub refund_processed_at: Option<DateTime<Utc>>,
    pub refund_actioned_by: Option<String>,
    pub dispute_status: DisputeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const BOOKING_COLUMNS: &str = r#"
    booking_id, reference, host_id, guest_id, stay_id, currency,
    base_amount, cleaning_fee, extra_guest_charge, discount, total_amount,
    penalty_amount, breakdown, payment_status, booking_status,
    refund_status, refund_amount, refund_reason, refund_requested_at,
    refund_approved_at, refund_processed_at, refund_actioned_by,
    dispute_status, created_at, updated_at
"#;

#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, booking_id: Uuid) -> Result<BookingRow, DatabaseError> {
        let sql = format!("SELECT {} FROM bookings WHERE booking_id = $1", BOOKING_COLUMNS);
        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Booking", booking_id))
    }

    pub async fn find_by_reference(&self, reference: &str) -> Result<Option<BookingRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM bookings WHERE reference = $1", BOOKING_COLUMNS);
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Bookings of a host in the given statuses created within `[from, to]`
    pub async fn find_for_payout(
        &self,
        host_id: Uuid,
        booking_status: BookingStatus,
        payment_status: PaymentStatus,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BookingRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {} FROM bookings
            WHERE host_id = $1
              AND booking_status = $2
              AND payment_status = $3
              AND created_at BETWEEN $4 AND $5
            ORDER BY created_at
            "#,
            BOOKING_COLUMNS
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(host_id)
            .bind(booking_status)
            .bind(payment_status)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn insert(&self, row: &BookingRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                booking_id, reference, host_id, guest_id, stay_id, currency,
                base_amount, cleaning_fee, extra_guest_charge, discount, total_amount,
                penalty_amount, breakdown, payment_status, booking_status,
                refund_status, refund_amount, refund_reason, refund_requested_at,
                refund_approved_at, refund_processed_at, refund_actioned_by,
                dispute_status, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25
            )
            "#,
        )
        .bind(row.booking_id)
        .bind(&row.reference)
        .bind(row.host_id)
        .bind(row.guest_id)
        .bind(row.stay_id)
        .bind(&row.currency)
        .bind(row.base_amount)
        .bind(row.cleaning_fee)
        .bind(row.extra_guest_charge)
        .bind(row.discount)
        .bind(row.total_amount)
        .bind(row.penalty_amount)
        .bind(&row.breakdown)
        .bind(row.payment_status)
        .bind(row.booking_status)
        .bind(row.refund_status)
        .bind(row.refund_amount)
        .bind(&row.refund_reason)
        .bind(row.refund_requested_at)
        .bind(row.refund_approved_at)
        .bind(row.refund_processed_at)
        .bind(&row.refund_actioned_by)
        .bind(row.dispute_status)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Writes the mutable columns; pricing and identity never change
    pub async fn update(&self, row: &BookingRow) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                penalty_amount = $2,
                breakdown = $3,
                payment_status = $4,
                booking_status = $5,
                refund_status = $6,
                refund_amount = $7,
                refund_reason = $8,
                refund_requested_at = $9,
                refund_approved_at = $10,
                refund_processed_at = $11,
                refund_actioned_by = $12,
                dispute_status = $13,
                updated_at = $14
            WHERE booking_id = $1
            "#,
        )
        .bind(row.booking_id)
        .bind(row.penalty_amount)
        .bind(&row.breakdown)
        .bind(row.payment_status)
        .bind(row.booking_status)
        .bind(row.refund_status)
        .bind(row.refund_amount)
        .bind(&row.refund_reason)
        .bind(row.refund_requested_at)
        .bind(row.refund_approved_at)
        .bind(row.refund_processed_at)
        .bind(&row.refund_actioned_by)
        .bind(row.dispute_status)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Booking", row.booking_id));
        }
        Ok(())
    }
}
