//! The rate settings document
//!
//! One `RateSettings` value is current at any time. It is never edited in
//! place: updates produce a new version (see [`crate::update`]) and older
//! versions stay readable for audit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, Rate};
use crate::calculator::check_amount;
use crate::error::RateError;

/// How a charge is levied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeType {
    /// A percentage of the running total
    Percentage,
    /// A flat amount per booking
    Fixed,
}

/// Inclusive bounds for a percentage rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBounds {
    pub min: Decimal,
    pub max: Decimal,
}

impl RateBounds {
    pub const COMMISSION: RateBounds = RateBounds { min: dec!(0), max: dec!(50) };
    pub const GST: RateBounds = RateBounds { min: dec!(0), max: dec!(30) };
    pub const TCS: RateBounds = RateBounds { min: dec!(0), max: dec!(10) };
    pub const PLATFORM_FEE: RateBounds = RateBounds { min: dec!(0), max: dec!(20) };

    fn check(&self, field: &'static str, rate: Rate) -> Result<(), RateError> {
        if rate.is_within(self.min, self.max) {
            Ok(())
        } else {
            Err(RateError::InvalidRateValue {
                field,
                value: rate.as_percentage(),
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Commission, tax and fee policy applied to every booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSettings {
    pub commission_rate: Rate,
    pub commission_type: ChargeType,
    pub fixed_commission_amount: Money,
    /// Whether the cleaning fee is part of the commission-bearing total
    pub commission_on_cleaning_fee: bool,
    /// Whether the extra-guest charge is part of the commission-bearing total
    pub commission_on_extra_guests: bool,

    pub gst_enabled: bool,
    pub gst_rate: Rate,
    /// Whether GST is levied on commission as well as on the stay total
    pub gst_on_commission: bool,
    /// Whether quoted totals already contain GST
    pub gst_inclusive: bool,

    pub tcs_enabled: bool,
    pub tcs_rate: Rate,
    /// TCS applies when the total is at or above this amount
    pub tcs_threshold: Money,

    pub platform_fee_enabled: bool,
    pub platform_fee_type: ChargeType,
    pub platform_fee_rate: Rate,
    pub fixed_platform_fee: Money,

    /// Monotonic version, starting at 1 for the bootstrap record
    pub version: u32,
    /// Actor that produced this version
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            commission_rate: Rate::from_percentage(dec!(10)),
            commission_type: ChargeType::Percentage,
            fixed_commission_amount: Money::inr(dec!(0)),
            commission_on_cleaning_fee: true,
            commission_on_extra_guests: true,
            gst_enabled: true,
            gst_rate: Rate::from_percentage(dec!(18)),
            gst_on_commission: false,
            gst_inclusive: false,
            tcs_enabled: true,
            tcs_rate: Rate::from_percentage(dec!(1)),
            tcs_threshold: Money::inr(dec!(7000)),
            platform_fee_enabled: false,
            platform_fee_type: ChargeType::Percentage,
            platform_fee_rate: Rate::zero(),
            fixed_platform_fee: Money::inr(dec!(0)),
            version: 1,
            updated_by: None,
            updated_at: Utc::now(),
        }
    }
}

impl RateSettings {
    /// The record seeded when no settings exist yet
    pub fn bootstrap(actor_id: impl Into<String>) -> Self {
        Self {
            updated_by: Some(actor_id.into()),
            ..Self::default()
        }
    }

    /// Checks every rate against its bounds and every amount for sign and size
    pub fn validate(&self) -> Result<(), RateError> {
        RateBounds::COMMISSION.check("commission_rate", self.commission_rate)?;
        RateBounds::GST.check("gst_rate", self.gst_rate)?;
        RateBounds::TCS.check("tcs_rate", self.tcs_rate)?;
        RateBounds::PLATFORM_FEE.check("platform_fee_rate", self.platform_fee_rate)?;

        for (field, amount) in [
            ("fixed_commission_amount", self.fixed_commission_amount),
            ("tcs_threshold", self.tcs_threshold),
            ("fixed_platform_fee", self.fixed_platform_fee),
        ] {
            check_amount(field, &amount)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = RateSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.version, 1);
        assert_eq!(settings.commission_rate.as_percentage(), dec!(10));
    }

    #[test]
    fn test_commission_above_bound_rejected() {
        let settings = RateSettings {
            commission_rate: Rate::from_percentage(dec!(50.01)),
            ..RateSettings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, RateError::InvalidRateValue { field: "commission_rate", .. }));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let settings = RateSettings {
            tcs_rate: Rate::from_percentage(dec!(-1)),
            ..RateSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_negative_fixed_fee_rejected() {
        let settings = RateSettings {
            fixed_platform_fee: Money::inr(dec!(-5)),
            ..RateSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(RateError::InvalidAmount { field: "fixed_platform_fee", .. })
        ));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let settings = RateSettings {
            gst_rate: Rate::from_percentage(dec!(30)),
            platform_fee_rate: Rate::from_percentage(dec!(20)),
            ..RateSettings::default()
        };
        assert!(settings.validate().is_ok());
    }
}
