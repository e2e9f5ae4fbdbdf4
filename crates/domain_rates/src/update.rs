//! Partial updates to the rate settings
//!
//! An update names only the fields it changes; everything else carries over
//! from the current version. The merged result is validated as a whole and
//! becomes version `current + 1`.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Actor, Money, Rate};
use crate::error::RateError;
use crate::settings::{ChargeType, RateSettings};

/// A partial settings change; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateSettingsUpdate {
    pub commission_rate: Option<Decimal>,
    pub commission_type: Option<ChargeType>,
    pub fixed_commission_amount: Option<Decimal>,
    pub commission_on_cleaning_fee: Option<bool>,
    pub commission_on_extra_guests: Option<bool>,
    pub gst_enabled: Option<bool>,
    pub gst_rate: Option<Decimal>,
    pub gst_on_commission: Option<bool>,
    pub gst_inclusive: Option<bool>,
    pub tcs_enabled: Option<bool>,
    pub tcs_rate: Option<Decimal>,
    pub tcs_threshold: Option<Decimal>,
    pub platform_fee_enabled: Option<bool>,
    pub platform_fee_type: Option<ChargeType>,
    pub platform_fee_rate: Option<Decimal>,
    pub fixed_platform_fee: Option<Decimal>,
}

impl RateSettingsUpdate {
    /// Returns true if the update changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges this update over `current`, producing the next version
    ///
    /// # Errors
    ///
    /// `InvalidRateValue` / `InvalidAmount` if the merged document fails validation;
    /// the current settings are left untouched in that case.
    pub fn apply_to(&self, current: &RateSettings, actor: &Actor) -> Result<RateSettings, RateError> {
        let currency = current.tcs_threshold.currency();
        let money = |value: Decimal| Money::new(value, currency);

        let next = RateSettings {
            commission_rate: self.commission_rate.map(Rate::from_percentage).unwrap_or(current.commission_rate),
            commission_type: self.commission_type.unwrap_or(current.commission_type),
            fixed_commission_amount: self.fixed_commission_amount.map(money).unwrap_or(current.fixed_commission_amount),
            commission_on_cleaning_fee: self.commission_on_cleaning_fee.unwrap_or(current.commission_on_cleaning_fee),
            commission_on_extra_guests: self.commission_on_extra_guests.unwrap_or(current.commission_on_extra_guests),
            gst_enabled: self.gst_enabled.unwrap_or(current.gst_enabled),
            gst_rate: self.gst_rate.map(Rate::from_percentage).unwrap_or(current.gst_rate),
            gst_on_commission: self.gst_on_commission.unwrap_or(current.gst_on_commission),
            gst_inclusive: self.gst_inclusive.unwrap_or(current.gst_inclusive),
            tcs_enabled: self.tcs_enabled.unwrap_or(current.tcs_enabled),
            tcs_rate: self.tcs_rate.map(Rate::from_percentage).unwrap_or(current.tcs_rate),
            tcs_threshold: self.tcs_threshold.map(money).unwrap_or(current.tcs_threshold),
            platform_fee_enabled: self.platform_fee_enabled.unwrap_or(current.platform_fee_enabled),
            platform_fee_type: self.platform_fee_type.unwrap_or(current.platform_fee_type),
            platform_fee_rate: self.platform_fee_rate.map(Rate::from_percentage).unwrap_or(current.platform_fee_rate),
            fixed_platform_fee: self.fixed_platform_fee.map(money).unwrap_or(current.fixed_platform_fee),
            version: current.version + 1,
            updated_by: Some(actor.id.clone()),
            updated_at: Utc::now(),
        };

        next.validate()?;
        Ok(next)
    }
}
