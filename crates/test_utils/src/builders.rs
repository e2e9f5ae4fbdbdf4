//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests set only the fields they care about.

use chrono::{DateTime, Utc};
use core_kernel::{Actor, GuestId, HostId, Money, StayId};
use domain_booking::{BookingLedgerEntry, BookingPricing, BookingStatus};
use domain_payout::{BankAccount, HostPayoutProfile, PayoutMethod};
use rust_decimal::Decimal;

use crate::fixtures::{ActorFixtures, MoneyFixtures, TemporalFixtures};

/// How far through its lifecycle a built booking should be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStage {
    /// Upcoming and unpaid
    Created,
    /// Paid, stay not started
    Paid,
    /// Paid and completed, eligible for a payout
    Settled,
    /// Paid, then cancelled before the stay
    Cancelled,
}

/// Builder for booking ledger entries
pub struct BookingBuilder {
    host_id: HostId,
    pricing: BookingPricing,
    created_at: DateTime<Utc>,
    stage: BookingStage,
    refund: Option<Decimal>,
}

impl Default for BookingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingBuilder {
    /// A settled 10000 INR booking made at `TemporalFixtures::booking_time`
    pub fn new() -> Self {
        Self {
            host_id: HostId::new(),
            pricing: BookingPricing::base_only(MoneyFixtures::inr_10000()),
            created_at: TemporalFixtures::booking_time(),
            stage: BookingStage::Settled,
            refund: None,
        }
    }

    pub fn with_host(mut self, host_id: HostId) -> Self {
        self.host_id = host_id;
        self
    }

    /// Sets the base amount and clears add-ons and discount
    pub fn with_base_amount(mut self, amount: Money) -> Self {
        self.pricing = BookingPricing::base_only(amount);
        self
    }

    pub fn with_cleaning_fee(mut self, amount: Money) -> Self {
        self.pricing.cleaning_fee = amount;
        self
    }

    pub fn with_extra_guest_charge(mut self, amount: Money) -> Self {
        self.pricing.extra_guest_charge = amount;
        self
    }

    pub fn with_discount(mut self, amount: Money) -> Self {
        self.pricing.discount = amount;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn stage(mut self, stage: BookingStage) -> Self {
        self.stage = stage;
        self
    }

    /// Runs a refund of `amount` through request, approval and processing
    pub fn with_processed_refund(mut self, amount: Decimal) -> Self {
        self.refund = Some(amount);
        self
    }

    /// Builds the entry
    ///
    /// # Panics
    ///
    /// Panics if the configured pricing or lifecycle is invalid
    pub fn build(self) -> BookingLedgerEntry {
        let mut entry = BookingLedgerEntry::new(self.host_id, GuestId::new(), StayId::new(), self.pricing)
            .expect("builder pricing must be valid");
        entry.created_at = self.created_at;
        entry.updated_at = self.created_at;

        if self.stage != BookingStage::Created {
            entry.mark_paid().expect("fresh booking can be paid");
        }
        match self.stage {
            BookingStage::Settled => {
                entry
                    .update_booking_status(BookingStatus::Ongoing)
                    .expect("paid booking can start");
                entry
                    .update_booking_status(BookingStatus::Completed)
                    .expect("ongoing booking can complete");
            }
            BookingStage::Cancelled => {
                entry
                    .update_booking_status(BookingStatus::Cancelled)
                    .expect("upcoming booking can be cancelled");
            }
            BookingStage::Created | BookingStage::Paid => {}
        }

        if let Some(amount) = self.refund {
            let actor: Actor = ActorFixtures::finance();
            entry
                .request_refund(amount, Some("builder refund".to_string()), &actor)
                .expect("refund request must be valid");
            entry.approve_refund(None, None, &actor).expect("pending refund can be approved");
            entry.process_refund(&actor).expect("approved refund can be processed");
        }

        entry
    }
}

/// Builder for host payout profiles
pub struct HostProfileBuilder {
    profile: HostPayoutProfile,
}

impl HostProfileBuilder {
    /// An empty profile for `host_id`
    pub fn new(host_id: HostId) -> Self {
        Self {
            profile: HostPayoutProfile {
                host_id,
                preferred_method: None,
                bank_account: None,
                upi_id: None,
                wallet_id: None,
            },
        }
    }

    pub fn preferred(mut self, method: PayoutMethod) -> Self {
        self.profile.preferred_method = Some(method);
        self
    }

    pub fn with_bank_account(mut self, account: BankAccount) -> Self {
        self.profile.bank_account = Some(account);
        self
    }

    pub fn with_upi(mut self, upi_id: impl Into<String>) -> Self {
        self.profile.upi_id = Some(upi_id.into());
        self
    }

    pub fn with_wallet(mut self, wallet_id: impl Into<String>) -> Self {
        self.profile.wallet_id = Some(wallet_id.into());
        self
    }

    pub fn build(self) -> HostPayoutProfile {
        self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_booking::{PaymentStatus, RefundStatus};
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_booking_is_eligible() {
        let booking = BookingBuilder::new().build();
        assert!(booking.is_eligible_for_payout());
        assert_eq!(booking.total_amount, Money::inr(dec!(10000)));
        assert_eq!(booking.created_at, TemporalFixtures::booking_time());
    }

    #[test]
    fn test_created_booking_is_unpaid() {
        let booking = BookingBuilder::new().stage(BookingStage::Created).build();
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
        assert!(!booking.is_eligible_for_payout());
    }

    #[test]
    fn test_processed_refund() {
        let booking = BookingBuilder::new().with_processed_refund(dec!(2500)).build();
        assert_eq!(booking.refund.status, RefundStatus::Processed);
        assert_eq!(booking.settled_refund(), Some(Money::inr(dec!(2500))));
    }

    #[test]
    fn test_add_ons_and_discount_in_total() {
        let booking = BookingBuilder::new()
            .with_base_amount(Money::inr(dec!(8000)))
            .with_cleaning_fee(Money::inr(dec!(1000)))
            .with_extra_guest_charge(Money::inr(dec!(1500)))
            .with_discount(Money::inr(dec!(500)))
            .build();
        assert_eq!(booking.total_amount, Money::inr(dec!(10000)));
    }

    #[test]
    fn test_host_profile_builder() {
        let host = HostId::new();
        let profile = HostProfileBuilder::new(host)
            .preferred(PayoutMethod::Wallet)
            .with_wallet("wallet-9")
            .build();
        assert_eq!(profile.resolve_destination().unwrap().method(), PayoutMethod::Wallet);
    }
}
