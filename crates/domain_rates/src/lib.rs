//! Rate Settings and Financial Calculation Domain
//!
//! This crate owns the commission / GST / TCS / platform-fee policy and the
//! pure calculator that applies it to a booking amount.
//!
//! # Flow
//!
//! ```text
//! SettingsService::ensure_default (startup)
//!         │
//!         ▼
//! RateSettings (current version) ──► calculator::compute_breakdown ──► Breakdown
//!         ▲
//!         │
//! RateSettingsUpdate::apply_to (partial merge, validate, version + 1)
//! ```
//!
//! # Example
//!
//! ```rust
//! use core_kernel::Money;
//! use domain_rates::{compute_breakdown, RateSettings};
//! use rust_decimal_macros::dec;
//!
//! let settings = RateSettings::default();
//! let zero = Money::inr(dec!(0));
//! let breakdown = compute_breakdown(Money::inr(dec!(10000)), zero, zero, &settings).unwrap();
//! assert_eq!(breakdown.net_payout.amount(), dec!(8882));
//! ```

pub mod settings;
pub mod update;
pub mod calculator;
pub mod ports;
pub mod service;
pub mod error;

pub use settings::{RateSettings, ChargeType, RateBounds};
pub use update::RateSettingsUpdate;
pub use calculator::{
    Breakdown, compute_breakdown, compute_breakdown_with_penalties, compute_for_settled_total,
    require_settings, validate_amounts, MAX_AMOUNT,
};
pub use ports::SettingsPort;
pub use service::SettingsService;
pub use error::RateError;
