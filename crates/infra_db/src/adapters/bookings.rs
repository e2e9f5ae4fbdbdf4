//! PostgreSQL booking adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{BookingId, DomainPort, GuestId, HealthCheckResult, HealthCheckable, HostId, PortError, StayId};
use domain_booking::{
    BookingLedgerEntry, BookingPort, BookingPricing, BookingStatus, DisputeStatus, PaymentStatus,
    PayoutEligibility, RefundDetails, RefundStatus,
};
use domain_rates::Breakdown;

use crate::error::DatabaseError;
use crate::repositories::bookings::{self as db, BookingRepository, BookingRow};

#[derive(Debug, Clone)]
pub struct PostgresBookingAdapter {
    repository: BookingRepository,
    pool: PgPool,
}

impl PostgresBookingAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BookingRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresBookingAdapter {}

#[async_trait]
impl HealthCheckable for PostgresBookingAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-booking-adapter").await
    }
}

#[async_trait]
impl BookingPort for PostgresBookingAdapter {
    #[instrument(skip(self, criteria), fields(host = %host_id))]
    async fn find_bookings_for_payout(
        &self,
        host_id: &HostId,
        criteria: &PayoutEligibility,
    ) -> Result<Vec<BookingLedgerEntry>, PortError> {
        let rows = self
            .repository
            .find_for_payout(
                *host_id.as_uuid(),
                booking_status_to_db(criteria.booking_status),
                payment_status_to_db(criteria.payment_status),
                criteria.period.start_instant(),
                criteria.period.end_instant(),
            )
            .await?;
        debug!(count = rows.len(), "Loaded payout candidates");
        rows.into_iter().map(row_to_booking).collect()
    }

    #[instrument(skip(self), fields(booking = %id))]
    async fn get_booking(&self, id: &BookingId) -> Result<BookingLedgerEntry, PortError> {
        let row = self.repository.get(*id.as_uuid()).await.map_err(|e| {
            if e.is_not_found() {
                PortError::not_found("Booking", id)
            } else {
                e.into()
            }
        })?;
        row_to_booking(row)
    }

    #[instrument(skip(self))]
    async fn find_by_reference(&self, reference: &str) -> Result<Option<BookingLedgerEntry>, PortError> {
        self.repository
            .find_by_reference(reference)
            .await?
            .map(row_to_booking)
            .transpose()
    }

    #[instrument(skip(self, booking), fields(booking = %booking.reference))]
    async fn insert(&self, booking: &BookingLedgerEntry) -> Result<(), PortError> {
        self.repository.insert(&booking_to_row(booking)?).await?;
        Ok(())
    }

    #[instrument(skip(self, booking), fields(booking = %booking.reference))]
    async fn save(&self, booking: &BookingLedgerEntry) -> Result<(), PortError> {
        self.repository.update(&booking_to_row(booking)?).await?;
        Ok(())
    }
}

fn booking_to_row(b: &BookingLedgerEntry) -> Result<BookingRow, PortError> {
    let breakdown = b
        .breakdown
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(DatabaseError::from)?;

    Ok(BookingRow {
        booking_id: *b.id.as_uuid(),
        reference: b.reference.clone(),
        host_id: *b.host_id.as_uuid(),
        guest_id: *b.guest_id.as_uuid(),
        stay_id: *b.stay_id.as_uuid(),
        currency: b.currency().code().to_string(),
        base_amount: b.pricing.base_amount.amount(),
        cleaning_fee: b.pricing.cleaning_fee.amount(),
        extra_guest_charge: b.pricing.extra_guest_charge.amount(),
        discount: b.pricing.discount.amount(),
        total_amount: b.total_amount.amount(),
        penalty_amount: b.penalty_amount.amount(),
        breakdown,
        payment_status: payment_status_to_db(b.payment_status),
        booking_status: booking_status_to_db(b.booking_status),
        refund_status: refund_status_to_db(b.refund.status),
        refund_amount: b.refund.amount.map(|m| m.amount()),
        refund_reason: b.refund.reason.clone(),
        refund_requested_at: b.refund.requested_at,
        refund_approved_at: b.refund.approved_at,
        refund_processed_at: b.refund.processed_at,
        refund_actioned_by: b.refund.actioned_by.clone(),
        dispute_status: dispute_status_to_db(b.dispute_status),
        created_at: b.created_at,
        updated_at: b.updated_at,
    })
}

fn row_to_booking(row: BookingRow) -> Result<BookingLedgerEntry, PortError> {
    let currency = super::currency(&row.currency)?;
    let money = |amount| super::money(amount, currency);

    let breakdown: Option<Breakdown> = row
        .breakdown
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| PortError::transformation(format!("breakdown of {}: {}", row.reference, e)))?;

    Ok(BookingLedgerEntry {
        id: BookingId::from(row.booking_id),
        reference: row.reference,
        host_id: HostId::from(row.host_id),
        guest_id: GuestId::from(row.guest_id),
        stay_id: StayId::from(row.stay_id),
        pricing: BookingPricing {
            base_amount: money(row.base_amount),
            cleaning_fee: money(row.cleaning_fee),
            extra_guest_charge: money(row.extra_guest_charge),
            discount: money(row.discount),
        },
        total_amount: money(row.total_amount),
        breakdown,
        penalty_amount: money(row.penalty_amount),
        payment_status: payment_status_from_db(row.payment_status),
        booking_status: booking_status_from_db(row.booking_status),
        refund: RefundDetails {
            status: refund_status_from_db(row.refund_status),
            amount: row.refund_amount.map(money),
            reason: row.refund_reason,
            requested_at: row.refund_requested_at,
            approved_at: row.refund_approved_at,
            processed_at: row.refund_processed_at,
            actioned_by: row.refund_actioned_by,
        },
        dispute_status: dispute_status_from_db(row.dispute_status),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn booking_status_to_db(status: BookingStatus) -> db::BookingStatus {
    match status {
        BookingStatus::Upcoming => db::BookingStatus::Upcoming,
        BookingStatus::Ongoing => db::BookingStatus::Ongoing,
        BookingStatus::Completed => db::BookingStatus::Completed,
        BookingStatus::Cancelled => db::BookingStatus::Cancelled,
    }
}

fn booking_status_from_db(status: db::BookingStatus) -> BookingStatus {
    match status {
        db::BookingStatus::Upcoming => BookingStatus::Upcoming,
        db::BookingStatus::Ongoing => BookingStatus::Ongoing,
        db::BookingStatus::Completed => BookingStatus::Completed,
        db::BookingStatus::Cancelled => BookingStatus::Cancelled,
    }
}

fn payment_status_to_db(status: PaymentStatus) -> db::PaymentStatus {
    match status {
        PaymentStatus::Pending => db::PaymentStatus::Pending,
        PaymentStatus::Paid => db::PaymentStatus::Paid,
        PaymentStatus::Refunded => db::PaymentStatus::Refunded,
        PaymentStatus::Failed => db::PaymentStatus::Failed,
    }
}

fn payment_status_from_db(status: db::PaymentStatus) -> PaymentStatus {
    match status {
        db::PaymentStatus::Pending => PaymentStatus::Pending,
        db::PaymentStatus::Paid => PaymentStatus::Paid,
        db::PaymentStatus::Refunded => PaymentStatus::Refunded,
        db::PaymentStatus::Failed => PaymentStatus::Failed,
    }
}

fn refund_status_to_db(status: RefundStatus) -> db::RefundStatus {
    match status {
        RefundStatus::None => db::RefundStatus::None,
        RefundStatus::Pending => db::RefundStatus::Pending,
        RefundStatus::Approved => db::RefundStatus::Approved,
        RefundStatus::Processed => db::RefundStatus::Processed,
        RefundStatus::Rejected => db::RefundStatus::Rejected,
    }
}

fn refund_status_from_db(status: db::RefundStatus) -> RefundStatus {
    match status {
        db::RefundStatus::None => RefundStatus::None,
        db::RefundStatus::Pending => RefundStatus::Pending,
        db::RefundStatus::Approved => RefundStatus::Approved,
        db::RefundStatus::Processed => RefundStatus::Processed,
        db::RefundStatus::Rejected => RefundStatus::Rejected,
    }
}

pub(crate) fn dispute_status_to_db(status: DisputeStatus) -> db::DisputeStatus {
    match status {
        DisputeStatus::None => db::DisputeStatus::None,
        DisputeStatus::Pending => db::DisputeStatus::Pending,
        DisputeStatus::Resolved => db::DisputeStatus::Resolved,
        DisputeStatus::Rejected => db::DisputeStatus::Rejected,
    }
}

pub(crate) fn dispute_status_from_db(status: db::DisputeStatus) -> DisputeStatus {
    match status {
        db::DisputeStatus::None => DisputeStatus::None,
        db::DisputeStatus::Pending => DisputeStatus::Pending,
        db::DisputeStatus::Resolved => DisputeStatus::Resolved,
        db::DisputeStatus::Rejected => DisputeStatus::Rejected,
    }
}
