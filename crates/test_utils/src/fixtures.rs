//! Pre-built Test Fixtures
//!
//! Ready-to-use data for the common settlement scenarios. Amounts are chosen
//! so the default rate settings produce round, easy-to-check breakdowns.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Actor, HostId, Money, Role, SettlementPeriod};
use domain_payout::{BankAccount, HostPayoutProfile, PayoutMethod};
use domain_rates::RateSettings;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A booking above the TCS threshold
    pub fn inr_10000() -> Money {
        Money::inr(dec!(10000))
    }

    /// A booking below the TCS threshold
    pub fn inr_5000() -> Money {
        Money::inr(dec!(5000))
    }

    pub fn inr_zero() -> Money {
        Money::inr(dec!(0))
    }
}

/// Fixture for rate settings
pub struct SettingsFixtures;

impl SettingsFixtures {
    /// 10% commission, 18% GST on the base, 1% TCS above 7000
    pub fn default_settings() -> RateSettings {
        RateSettings::bootstrap("fixture")
    }

    /// Settings with every deduction switched off
    pub fn commission_only(percent: rust_decimal::Decimal) -> RateSettings {
        RateSettings {
            commission_rate: core_kernel::Rate::from_percentage(percent),
            gst_enabled: false,
            tcs_enabled: false,
            platform_fee_enabled: false,
            ..Self::default_settings()
        }
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// When the fixture bookings were made (10 Mar 2025, 11:30 IST)
    pub fn booking_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 6, 0, 0).unwrap()
    }

    /// The calendar month containing `booking_time`
    pub fn march_2025() -> SettlementPeriod {
        SettlementPeriod::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        )
        .unwrap()
    }

    /// A period with no fixture bookings in it
    pub fn april_2025() -> SettlementPeriod {
        SettlementPeriod::new(
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
        )
        .unwrap()
    }
}

/// Fixture for operators
pub struct ActorFixtures;

impl ActorFixtures {
    pub fn admin() -> Actor {
        Actor::new("admin-1", vec![Role::Admin])
    }

    pub fn finance() -> Actor {
        Actor::new("finance-1", vec![Role::Finance])
    }

    /// An authenticated operator with no roles
    pub fn viewer() -> Actor {
        Actor::new("viewer-1", vec![])
    }
}

/// Fixture for host payout profiles
pub struct HostFixtures;

impl HostFixtures {
    /// A fixed host id, handy when rows must survive between queries
    pub fn host_id() -> HostId {
        HostId::from_uuid(Uuid::from_u128(0x0195_7a00_0000_7000_8000_0000_0000_0001))
    }

    pub fn upi_profile(host_id: HostId) -> HostPayoutProfile {
        HostPayoutProfile {
            host_id,
            preferred_method: Some(PayoutMethod::Upi),
            bank_account: None,
            upi_id: Some("host@oksbi".to_string()),
            wallet_id: None,
        }
    }

    pub fn bank_profile(host_id: HostId) -> HostPayoutProfile {
        HostPayoutProfile {
            host_id,
            preferred_method: Some(PayoutMethod::BankTransfer),
            bank_account: Some(Self::bank_account()),
            upi_id: None,
            wallet_id: None,
        }
    }

    /// A host who never filled in payout details
    pub fn empty_profile(host_id: HostId) -> HostPayoutProfile {
        HostPayoutProfile {
            host_id,
            preferred_method: None,
            bank_account: None,
            upi_id: None,
            wallet_id: None,
        }
    }

    pub fn bank_account() -> BankAccount {
        BankAccount {
            account_number: "50100123456789".to_string(),
            ifsc: "HDFC0001234".to_string(),
            account_holder: "Asha Menon".to_string(),
        }
    }
}
