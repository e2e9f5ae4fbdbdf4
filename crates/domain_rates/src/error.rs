//! Rate settings and calculation errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::PortError;

/// Errors raised while reading, updating or applying rate settings
#[derive(Debug, Error)]
pub enum RateError {
    /// No current settings record exists
    #[error("Rate settings are not configured")]
    SettingsNotConfigured,

    /// A rate or amount outside its configured bounds
    #[error("Invalid value for {field}: {value} (allowed {min}..={max})")]
    InvalidRateValue {
        field: &'static str,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },

    /// A monetary input that cannot be priced (e.g. negative)
    #[error("Invalid amount for {field}: {amount}")]
    InvalidAmount {
        field: &'static str,
        amount: Decimal,
    },

    /// Someone else updated the settings since they were read
    #[error("Settings version conflict: expected version {expected}")]
    VersionConflict { expected: u32 },

    /// The actor is not allowed to perform this operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Currency mismatch: {0}")]
    Currency(#[from] core_kernel::MoneyError),

    #[error(transparent)]
    Port(#[from] PortError),
}
