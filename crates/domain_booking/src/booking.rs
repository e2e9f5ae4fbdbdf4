//! Booking ledger entry
//!
//! The persisted financial record of one stay: the agreed price, the
//! (optionally cached) breakdown, and the payment, booking, refund and
//! dispute statuses that other workflows move along. Entries are never
//! deleted once paid; cancellation and refunds are status changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Actor, BookingId, Currency, GuestId, HostId, Money, StayId};
use domain_rates::{compute_breakdown_with_penalties, Breakdown, RateSettings};

use crate::error::BookingError;
use crate::refund::RefundDetails;

/// Payment state of the booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

/// Stay lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Booked, stay not started yet
    #[serde(alias = "pending")]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

/// Dispute state, mirrored from the booking's dispute case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    None,
    Pending,
    Resolved,
    Rejected,
}

/// Price components agreed at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPricing {
    pub base_amount: Money,
    pub cleaning_fee: Money,
    pub extra_guest_charge: Money,
    /// Referral or promotional discount applied at checkout
    pub discount: Money,
}

impl BookingPricing {
    /// A price with no add-ons or discount
    pub fn base_only(base_amount: Money) -> Self {
        let zero = Money::zero(base_amount.currency());
        Self {
            base_amount,
            cleaning_fee: zero,
            extra_guest_charge: zero,
            discount: zero,
        }
    }

    pub fn currency(&self) -> Currency {
        self.base_amount.currency()
    }

    /// Checks that every component is non-negative and in one currency
    pub fn validate(&self) -> Result<(), BookingError> {
        for (field, amount) in [
            ("base_amount", self.base_amount),
            ("cleaning_fee", self.cleaning_fee),
            ("extra_guest_charge", self.extra_guest_charge),
            ("discount", self.discount),
        ] {
            if amount.is_negative() {
                return Err(BookingError::InvalidAmount(format!(
                    "{} must not be negative, got {}",
                    field,
                    amount.amount()
                )));
            }
            if amount.currency() != self.currency() {
                return Err(BookingError::InvalidAmount(format!(
                    "{} is in {}, booking is in {}",
                    field,
                    amount.currency(),
                    self.currency()
                )));
            }
        }
        Ok(())
    }

    /// Amount actually charged: `base + cleaning + extra - discount`, never below zero
    pub fn total_amount(&self) -> Money {
        let gross = self.base_amount + self.cleaning_fee + self.extra_guest_charge;
        (gross - self.discount).non_negative()
    }
}

/// The financial record of one booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingLedgerEntry {
    pub id: BookingId,
    /// Human-readable unique reference shown to guests and hosts
    pub reference: String,
    pub host_id: HostId,
    pub guest_id: GuestId,
    pub stay_id: StayId,
    pub pricing: BookingPricing,
    /// Post-discount amount charged to the guest; fixed at creation
    pub total_amount: Money,
    /// Cached breakdown, if one has been computed and stored
    pub breakdown: Option<Breakdown>,
    /// Penalties levied on the host (late cancellation etc.)
    pub penalty_amount: Money,
    pub payment_status: PaymentStatus,
    pub booking_status: BookingStatus,
    pub refund: RefundDetails,
    pub dispute_status: DisputeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingLedgerEntry {
    /// Creates an upcoming, unpaid booking
    pub fn new(
        host_id: HostId,
        guest_id: GuestId,
        stay_id: StayId,
        pricing: BookingPricing,
    ) -> Result<Self, BookingError> {
        pricing.validate()?;
        let now = Utc::now();
        let id = BookingId::new_v7();

        Ok(Self {
            id,
            reference: generate_reference(&id, now),
            host_id,
            guest_id,
            stay_id,
            pricing,
            total_amount: pricing.total_amount(),
            breakdown: None,
            penalty_amount: Money::zero(pricing.currency()),
            payment_status: PaymentStatus::Pending,
            booking_status: BookingStatus::Upcoming,
            refund: RefundDetails::default(),
            dispute_status: DisputeStatus::None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn currency(&self) -> Currency {
        self.total_amount.currency()
    }

    /// Records a successful payment
    pub fn mark_paid(&mut self) -> Result<(), BookingError> {
        match self.payment_status {
            PaymentStatus::Pending | PaymentStatus::Failed => {
                self.payment_status = PaymentStatus::Paid;
                self.touch();
                Ok(())
            }
            other => Err(BookingError::transition(other, PaymentStatus::Paid)),
        }
    }

    /// Records a failed payment attempt
    pub fn mark_payment_failed(&mut self) -> Result<(), BookingError> {
        if self.payment_status != PaymentStatus::Pending {
            return Err(BookingError::transition(self.payment_status, PaymentStatus::Failed));
        }
        self.payment_status = PaymentStatus::Failed;
        self.touch();
        Ok(())
    }

    /// Moves the stay along its lifecycle
    pub fn update_booking_status(&mut self, target: BookingStatus) -> Result<(), BookingError> {
        use BookingStatus::*;
        let allowed = matches!(
            (self.booking_status, target),
            (Upcoming, Ongoing) | (Ongoing, Completed) | (Upcoming, Cancelled) | (Ongoing, Cancelled)
        );
        if !allowed {
            return Err(BookingError::transition(self.booking_status, target));
        }
        self.booking_status = target;
        self.touch();
        Ok(())
    }

    /// Records a penalty against the host; penalties accumulate
    pub fn record_penalty(&mut self, amount: Money, actor: &Actor) -> Result<(), BookingError> {
        if !amount.is_positive() {
            return Err(BookingError::InvalidAmount(format!(
                "penalty must be positive, got {}",
                amount.amount()
            )));
        }
        self.penalty_amount = self.penalty_amount.checked_add(&amount)?;
        // A cached breakdown no longer reflects the deductions
        self.breakdown = None;
        self.touch();
        tracing::info!(booking = %self.reference, actor = %actor, penalty = %amount, "Penalty recorded");
        Ok(())
    }

    /// Returns true if the booking qualifies for a host payout
    pub fn is_eligible_for_payout(&self) -> bool {
        self.booking_status == BookingStatus::Completed && self.payment_status == PaymentStatus::Paid
    }

    /// Computes the booking-time breakdown from the price components
    ///
    /// The discount is funded by the referral programme and does not reduce
    /// the host's commission base.
    pub fn compute_breakdown(&self, settings: &RateSettings) -> Result<Breakdown, BookingError> {
        Ok(compute_breakdown_with_penalties(
            self.pricing.base_amount,
            self.pricing.cleaning_fee,
            self.pricing.extra_guest_charge,
            self.penalty_amount,
            settings,
        )?)
    }

    /// Computes and stores the breakdown on the entry
    pub fn cache_breakdown(&mut self, settings: &RateSettings) -> Result<&Breakdown, BookingError> {
        let breakdown = self.compute_breakdown(settings)?;
        self.touch();
        Ok(self.breakdown.insert(breakdown))
    }

    /// Amount that can still be refunded
    pub fn refundable_amount(&self) -> Money {
        let refunded = self
            .refund
            .amount
            .unwrap_or_else(|| Money::zero(self.currency()));
        (self.total_amount - refunded).non_negative()
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn generate_reference(id: &BookingId, now: DateTime<Utc>) -> String {
    let suffix = id.as_uuid().as_u128() % 1_000_000;
    format!("BK{}{:06}", now.format("%y%m%d"), suffix)
}
