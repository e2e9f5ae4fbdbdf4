//! Payout generation for a host and settlement period
//!
//! Each completed, paid booking in the period gets exactly one pending
//! payout. Reruns are safe: bookings that already have a payout are skipped,
//! and the store's unique (host, booking) constraint catches a concurrent run
//! that slipped past the existence check.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use core_kernel::{Actor, BookingId, Currency, HostId, Money, PayoutId, Role, SettlementPeriod};
use domain_booking::{BookingLedgerEntry, BookingPort, PayoutEligibility};
use domain_rates::{compute_for_settled_total, Breakdown, RateSettings, SettingsService};

use crate::error::PayoutError;
use crate::payout::{AmountsSnapshot, PayoutDestination, PayoutRecord};
use crate::ports::{HostProfilePort, PayoutPort};

/// Why a booking was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyExists,
}

/// What happened to one booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PayoutOutcome {
    Created { payout_id: PayoutId, net_payout: Money },
    Skipped { reason: SkipReason },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub booking_id: BookingId,
    pub reference: String,
    #[serde(flatten)]
    pub outcome: PayoutOutcome,
}

/// Result of one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub host_id: HostId,
    pub period: SettlementPeriod,
    pub outcomes: Vec<BookingOutcome>,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Sum of net payouts of the records created in this run, in the
    /// currency of the first booking
    pub total_net_payout: Money,
}

impl GenerationReport {
    fn new(host_id: HostId, period: SettlementPeriod, currency: Currency) -> Self {
        Self {
            host_id,
            period,
            outcomes: Vec::new(),
            created: 0,
            skipped: 0,
            failed: 0,
            total_net_payout: Money::zero(currency),
        }
    }

    fn record(&mut self, booking: &BookingLedgerEntry, outcome: PayoutOutcome) {
        match &outcome {
            PayoutOutcome::Created { net_payout, .. } => {
                match self.total_net_payout.checked_add(net_payout) {
                    Ok(total) => {
                        self.created += 1;
                        self.total_net_payout = total;
                    }
                    Err(e) => {
                        self.failed += 1;
                        warn!(booking = %booking.reference, error = %e, "Payout left out of report total");
                    }
                }
            }
            PayoutOutcome::Skipped { .. } => self.skipped += 1,
            PayoutOutcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(BookingOutcome {
            booking_id: booking.id,
            reference: booking.reference.clone(),
            outcome,
        });
    }
}

/// Breakdown used for a booking's payout
///
/// A stored breakdown wins. Otherwise the settled total is priced with no
/// add-ons and the booking's recorded penalties.
pub fn payout_breakdown(
    booking: &BookingLedgerEntry,
    settings: &RateSettings,
) -> Result<Breakdown, PayoutError> {
    if let Some(cached) = &booking.breakdown {
        return Ok(cached.clone());
    }
    Ok(compute_for_settled_total(booking.total_amount, booking.penalty_amount, settings)?)
}

#[derive(Clone)]
pub struct PayoutGenerator {
    bookings: Arc<dyn BookingPort>,
    payouts: Arc<dyn PayoutPort>,
    hosts: Arc<dyn HostProfilePort>,
    settings: SettingsService,
}

impl PayoutGenerator {
    pub fn new(
        bookings: Arc<dyn BookingPort>,
        payouts: Arc<dyn PayoutPort>,
        hosts: Arc<dyn HostProfilePort>,
        settings: SettingsService,
    ) -> Self {
        Self {
            bookings,
            payouts,
            hosts,
            settings,
        }
    }

    /// Creates pending payouts for the host's settled bookings in `period`
    ///
    /// # Errors
    ///
    /// Fails as a whole, before any record is written, when settings are
    /// missing or the host has no usable payout destination. Per-booking
    /// problems are reported as outcomes and do not stop the run.
    #[instrument(skip(self, actor), fields(host = %host_id, actor = %actor))]
    pub async fn generate_payouts(
        &self,
        host_id: &HostId,
        period: SettlementPeriod,
        actor: &Actor,
    ) -> Result<GenerationReport, PayoutError> {
        if !actor.has_role(Role::Finance) {
            return Err(PayoutError::Forbidden(format!("{} may not generate payouts", actor)));
        }

        let settings = self.settings.current().await?;
        let bookings = self
            .bookings
            .find_bookings_for_payout(host_id, &PayoutEligibility::settled_in(period))
            .await?;

        let currency = bookings.first().map(|b| b.currency()).unwrap_or_default();
        let mut report = GenerationReport::new(*host_id, period, currency);
        if bookings.is_empty() {
            info!("No settled bookings in period");
            return Ok(report);
        }

        let ids: Vec<BookingId> = bookings.iter().map(|b| b.id).collect();
        let existing = self.payouts.find_existing_payouts(host_id, &ids).await?;

        let pending: Vec<&BookingLedgerEntry> =
            bookings.iter().filter(|b| !existing.contains(&b.id)).collect();
        let destination = if pending.is_empty() {
            None
        } else {
            Some(self.resolve_destination(host_id).await?)
        };

        for booking in &bookings {
            let outcome = match &destination {
                Some(_) if !existing.contains(&booking.id) && booking.currency() != currency => {
                    PayoutOutcome::Failed {
                        reason: format!(
                            "booking currency {} differs from run currency {}",
                            booking.currency(),
                            currency
                        ),
                    }
                }
                Some(destination) if !existing.contains(&booking.id) => {
                    self.create_payout(booking, &settings, destination, actor).await
                }
                _ => PayoutOutcome::Skipped { reason: SkipReason::AlreadyExists },
            };
            match &outcome {
                PayoutOutcome::Created { payout_id, net_payout } => {
                    info!(booking = %booking.reference, payout = %payout_id, net = %net_payout, "Payout created");
                }
                PayoutOutcome::Skipped { reason } => {
                    info!(booking = %booking.reference, reason = ?reason, "Payout skipped");
                }
                PayoutOutcome::Failed { reason } => {
                    warn!(booking = %booking.reference, reason = %reason, "Payout failed");
                }
            }
            report.record(booking, outcome);
        }

        info!(
            created = report.created,
            skipped = report.skipped,
            failed = report.failed,
            total_net = %report.total_net_payout,
            "Payout generation finished"
        );
        Ok(report)
    }

    async fn resolve_destination(&self, host_id: &HostId) -> Result<PayoutDestination, PayoutError> {
        let profile = self
            .hosts
            .get_payout_profile(host_id)
            .await?
            .ok_or_else(|| PayoutError::destination_missing(host_id, "host has no payout profile"))?;
        profile.resolve_destination().inspect_err(|e| {
            warn!(error = %e, "Cannot generate payouts");
        })
    }

    async fn create_payout(
        &self,
        booking: &BookingLedgerEntry,
        settings: &RateSettings,
        destination: &PayoutDestination,
        actor: &Actor,
    ) -> PayoutOutcome {
        let breakdown = match payout_breakdown(booking, settings) {
            Ok(b) => b,
            Err(e) => return PayoutOutcome::Failed { reason: e.to_string() },
        };

        let record = PayoutRecord::pending(
            booking.host_id,
            booking.id,
            AmountsSnapshot::from(&breakdown),
            destination.clone(),
            actor,
        );
        match self.payouts.insert(&record).await {
            Ok(()) => PayoutOutcome::Created {
                payout_id: record.id,
                net_payout: record.net_payout(),
            },
            Err(e) if e.is_conflict() => PayoutOutcome::Skipped { reason: SkipReason::AlreadyExists },
            Err(e) => PayoutOutcome::Failed { reason: e.to_string() },
        }
    }
}
