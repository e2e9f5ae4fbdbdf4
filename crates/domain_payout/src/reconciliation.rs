//! Refund reconciliation against host payouts
//!
//! An approved refund does not rewrite the payout that was already created
//! for the booking. Reconciliation prices the booking on its settled and
//! refunded totals and books the difference as a negative adjustment, once
//! per payout.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use core_kernel::{Actor, AdjustmentId, BookingId, HostId, Money, PayoutId, PortError, Role};
use domain_booking::{BookingError, BookingLedgerEntry, BookingPort};
use domain_rates::{compute_for_settled_total, RateSettings, SettingsService};

use crate::error::PayoutError;
use crate::payout::{PayoutRecord, PayoutStatus};
use crate::ports::PayoutPort;

/// A compensating entry against a payout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutAdjustment {
    pub id: AdjustmentId,
    pub payout_id: PayoutId,
    pub booking_id: BookingId,
    pub host_id: HostId,
    /// Never positive
    pub amount: Money,
    pub reason: String,
    /// Net payout after the refund
    pub revised_net_payout: Money,
    pub settings_version: u32,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Computes the adjustment for a refund without storing it
///
/// The adjustment is the drop in net payout between the settled total and
/// the refunded total, both priced with the same settings and penalties.
/// It is applied to the payout's own snapshot, so a payout priced from a
/// stored breakdown moves by the refund's share only.
pub fn refund_adjustment(
    booking: &BookingLedgerEntry,
    payout: &PayoutRecord,
    refund: Money,
    settings: &RateSettings,
    actor: &Actor,
) -> Result<PayoutAdjustment, PayoutError> {
    let remaining = booking.total_amount.checked_sub(&refund)?.non_negative();
    let settled = compute_for_settled_total(booking.total_amount, booking.penalty_amount, settings)?;
    let revised = compute_for_settled_total(remaining, booking.penalty_amount, settings)?;

    let delta = revised.net_payout.checked_sub(&settled.net_payout)?;
    let amount = if delta.is_positive() {
        Money::zero(delta.currency())
    } else {
        delta
    };
    let revised_net = payout.net_payout().checked_add(&amount)?.non_negative();

    Ok(PayoutAdjustment {
        id: AdjustmentId::new_v7(),
        payout_id: payout.id,
        booking_id: booking.id,
        host_id: payout.host_id,
        amount,
        reason: format!("refund of {} on booking {}", refund, booking.reference),
        revised_net_payout: revised_net,
        settings_version: revised.settings_version,
        created_by: actor.id.clone(),
        created_at: Utc::now(),
    })
}

#[derive(Clone)]
pub struct RefundReconciler {
    bookings: Arc<dyn BookingPort>,
    payouts: Arc<dyn PayoutPort>,
    settings: SettingsService,
}

impl RefundReconciler {
    pub fn new(
        bookings: Arc<dyn BookingPort>,
        payouts: Arc<dyn PayoutPort>,
        settings: SettingsService,
    ) -> Self {
        Self {
            bookings,
            payouts,
            settings,
        }
    }

    /// Records the payout adjustment for the booking's settled refund
    ///
    /// # Errors
    ///
    /// * `RefundNotSettled` unless the refund is approved or processed
    /// * `NoPayoutForBooking` when no payout was generated yet
    /// * `PayoutCancelled` when the payout will never be paid out
    /// * `AdjustmentExists` when the payout was already reconciled
    #[instrument(skip(self, actor), fields(booking = %booking_id, actor = %actor))]
    pub async fn reconcile_refund(
        &self,
        booking_id: &BookingId,
        actor: &Actor,
    ) -> Result<PayoutAdjustment, PayoutError> {
        if !actor.has_role(Role::Admin) {
            return Err(PayoutError::Forbidden(format!("{} may not reconcile refunds", actor)));
        }

        let booking = self.bookings.get_booking(booking_id).await.map_err(|e: PortError| {
            if e.is_not_found() {
                PayoutError::Booking(BookingError::BookingNotFound(booking_id.to_string()))
            } else {
                e.into()
            }
        })?;
        let refund = booking
            .settled_refund()
            .ok_or_else(|| PayoutError::RefundNotSettled(booking.reference.clone()))?;

        let payout = self
            .payouts
            .find_by_booking(booking_id)
            .await?
            .ok_or_else(|| PayoutError::NoPayoutForBooking(booking.reference.clone()))?;
        if payout.status == PayoutStatus::Cancelled {
            return Err(PayoutError::PayoutCancelled(payout.id.to_string()));
        }

        if self.payouts.find_adjustment(&payout.id).await?.is_some() {
            return Err(PayoutError::AdjustmentExists(payout.id.to_string()));
        }

        let settings = self.settings.current().await?;
        let adjustment = refund_adjustment(&booking, &payout, refund, &settings, actor)?;

        self.payouts.insert_adjustment(&adjustment).await.map_err(|e| {
            if e.is_conflict() {
                PayoutError::AdjustmentExists(payout.id.to_string())
            } else {
                e.into()
            }
        })?;

        info!(
            payout = %payout.id,
            amount = %adjustment.amount,
            revised_net = %adjustment.revised_net_payout,
            "Refund reconciled"
        );
        Ok(adjustment)
    }
}
