//! Booking financial calculator
//!
//! Turns a stay price and its add-ons into the commission, GST, TCS and
//! platform fee owed, and the net payout left for the host. The steps run in
//! a fixed order because later steps read the running total:
//!
//! ```text
//! total = base (+ cleaning fee) (+ extra guests)     add-ons gated by settings
//! commission = % of total | fixed
//! GST exclusive: gst = % of gst_base, total += gst
//! GST inclusive: gst = gst_base * r / (100 + r), total unchanged
//! TCS = % of total when total >= threshold           never added to total
//! platform fee = % of total | fixed
//! net payout = total - (commission + gst + tcs + platform fee + penalties)
//! ```
//!
//! Components are computed at full precision and each reported value is
//! rounded to the currency's precision; `total_deductions` is the sum of the
//! rounded parts so a breakdown always adds up exactly.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money};
use crate::error::RateError;
use crate::settings::{ChargeType, RateSettings};

/// Largest amount the calculator accepts for any single input (1 lakh crore)
///
/// Keeps every product of an amount and a bounded rate far inside
/// `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Rejects a negative or out-of-range amount
pub(crate) fn check_amount(field: &'static str, amount: &Money) -> Result<(), RateError> {
    if amount.is_negative() || amount.amount() > MAX_AMOUNT {
        return Err(RateError::InvalidAmount {
            field,
            amount: amount.amount(),
        });
    }
    Ok(())
}

/// The financial breakdown of one booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Commission-bearing total before GST
    pub commission_base: Money,
    /// Add-ons left out of the commission base by the settings toggles
    pub excluded_add_ons: Money,
    /// Running total after GST handling
    pub total: Money,
    pub commission_amount: Money,
    pub gst_amount: Money,
    pub tcs_amount: Money,
    pub platform_fee_amount: Money,
    pub penalty_amount: Money,
    pub total_deductions: Money,
    pub net_payout: Money,
    /// Whether GST was extracted from (rather than added to) the total
    pub gst_inclusive: bool,
    /// Settings version the breakdown was computed with
    pub settings_version: u32,
}

impl Breakdown {
    pub fn currency(&self) -> Currency {
        self.total.currency()
    }
}

/// Rejects amounts that cannot be priced
///
/// Negative or oversized stay prices and add-ons never reach the arithmetic
/// below.
pub fn validate_amounts(
    base_amount: &Money,
    cleaning_fee: &Money,
    extra_guest_charge: &Money,
) -> Result<(), RateError> {
    for (field, amount) in [
        ("base_amount", base_amount),
        ("cleaning_fee", cleaning_fee),
        ("extra_guest_charge", extra_guest_charge),
    ] {
        check_amount(field, amount)?;
        if amount.currency() != base_amount.currency() {
            return Err(RateError::Currency(core_kernel::MoneyError::CurrencyMismatch(
                base_amount.currency().to_string(),
                amount.currency().to_string(),
            )));
        }
    }
    Ok(())
}

/// Returns the settings or `SettingsNotConfigured`
pub fn require_settings(settings: Option<&RateSettings>) -> Result<&RateSettings, RateError> {
    settings.ok_or(RateError::SettingsNotConfigured)
}

/// Computes the breakdown for a new booking (no penalties)
pub fn compute_breakdown(
    base_amount: Money,
    cleaning_fee: Money,
    extra_guest_charge: Money,
    settings: &RateSettings,
) -> Result<Breakdown, RateError> {
    let penalties = Money::zero(base_amount.currency());
    compute_breakdown_with_penalties(base_amount, cleaning_fee, extra_guest_charge, penalties, settings)
}

/// Computes the breakdown for an already-settled total
///
/// The settled total already contains any add-ons, so it is priced as the
/// base amount with no add-ons to avoid applying add-on toggles twice.
pub fn compute_for_settled_total(
    total_amount: Money,
    penalties: Money,
    settings: &RateSettings,
) -> Result<Breakdown, RateError> {
    let zero = Money::zero(total_amount.currency());
    compute_breakdown_with_penalties(total_amount, zero, zero, penalties, settings)
}

/// Computes the full breakdown, deducting `penalties` from the payout
pub fn compute_breakdown_with_penalties(
    base_amount: Money,
    cleaning_fee: Money,
    extra_guest_charge: Money,
    penalties: Money,
    settings: &RateSettings,
) -> Result<Breakdown, RateError> {
    validate_amounts(&base_amount, &cleaning_fee, &extra_guest_charge)?;
    check_amount("penalties", &penalties)?;

    let currency = base_amount.currency();
    let zero = dec!(0);

    let mut total = base_amount.amount();
    let mut excluded = zero;
    if settings.commission_on_cleaning_fee {
        total += cleaning_fee.amount();
    } else {
        excluded += cleaning_fee.amount();
    }
    if settings.commission_on_extra_guests {
        total += extra_guest_charge.amount();
    } else {
        excluded += extra_guest_charge.amount();
    }
    let commission_base = total;

    let commission = match settings.commission_type {
        ChargeType::Percentage => settings.commission_rate.apply(total),
        ChargeType::Fixed => settings.fixed_commission_amount.amount(),
    };

    let gst = if settings.gst_enabled {
        let gst_base = if settings.gst_on_commission {
            total + commission
        } else {
            total
        };
        if settings.gst_inclusive {
            settings.gst_rate.extract_inclusive(gst_base)
        } else {
            let gst = settings.gst_rate.apply(gst_base);
            total += gst;
            gst
        }
    } else {
        zero
    };

    let tcs = if settings.tcs_enabled && total >= settings.tcs_threshold.amount() {
        settings.tcs_rate.apply(total)
    } else {
        zero
    };

    let platform_fee = if settings.platform_fee_enabled {
        match settings.platform_fee_type {
            ChargeType::Percentage => settings.platform_fee_rate.apply(total),
            ChargeType::Fixed => settings.fixed_platform_fee.amount(),
        }
    } else {
        zero
    };

    let rounded = |value: Decimal| Money::new(value, currency).round_to_currency();

    let total = rounded(total);
    let commission_amount = rounded(commission);
    let gst_amount = rounded(gst);
    let tcs_amount = rounded(tcs);
    let platform_fee_amount = rounded(platform_fee);
    let penalty_amount = penalties.round_to_currency();

    let total_deductions = Money::sum(
        currency,
        [
            &commission_amount,
            &gst_amount,
            &tcs_amount,
            &platform_fee_amount,
            &penalty_amount,
        ],
    )?;
    let net_payout = total.checked_sub(&total_deductions)?;

    Ok(Breakdown {
        commission_base: rounded(commission_base),
        excluded_add_ons: rounded(excluded),
        total,
        commission_amount,
        gst_amount,
        tcs_amount,
        platform_fee_amount,
        penalty_amount,
        total_deductions,
        net_payout,
        gst_inclusive: settings.gst_enabled && settings.gst_inclusive,
        settings_version: settings.version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Rate;

    fn inr(value: Decimal) -> Money {
        Money::inr(value)
    }

    fn zero() -> Money {
        Money::zero(Currency::INR)
    }

    #[test]
    fn test_require_settings() {
        assert!(matches!(require_settings(None), Err(RateError::SettingsNotConfigured)));
        let settings = RateSettings::default();
        assert!(require_settings(Some(&settings)).is_ok());
    }

    #[test]
    fn test_disabled_everything_pays_full_total() {
        let settings = RateSettings {
            commission_rate: Rate::zero(),
            gst_enabled: false,
            tcs_enabled: false,
            platform_fee_enabled: false,
            ..RateSettings::default()
        };
        let b = compute_breakdown(inr(dec!(4200)), zero(), zero(), &settings).unwrap();
        assert_eq!(b.total_deductions.amount(), dec!(0));
        assert_eq!(b.net_payout.amount(), dec!(4200));
    }

    #[test]
    fn test_penalties_are_deducted() {
        let settings = RateSettings {
            gst_enabled: false,
            tcs_enabled: false,
            ..RateSettings::default()
        };
        let b = compute_breakdown_with_penalties(
            inr(dec!(5000)),
            zero(),
            zero(),
            inr(dec!(250)),
            &settings,
        )
        .unwrap();
        assert_eq!(b.penalty_amount.amount(), dec!(250));
        assert_eq!(b.total_deductions.amount(), dec!(750));
        assert_eq!(b.net_payout.amount(), dec!(4250));
    }

    #[test]
    fn test_negative_penalty_rejected() {
        let result = compute_breakdown_with_penalties(
            inr(dec!(5000)),
            zero(),
            zero(),
            inr(dec!(-1)),
            &RateSettings::default(),
        );
        assert!(matches!(result, Err(RateError::InvalidAmount { field: "penalties", .. })));
    }

    #[test]
    fn test_mixed_currency_rejected() {
        let result = compute_breakdown(
            inr(dec!(1000)),
            Money::new(dec!(10), Currency::USD),
            zero(),
            &RateSettings::default(),
        );
        assert!(matches!(result, Err(RateError::Currency(_))));
    }

    #[test]
    fn test_settled_total_ignores_add_on_toggles() {
        let settings = RateSettings {
            commission_on_cleaning_fee: false,
            gst_enabled: false,
            tcs_enabled: false,
            ..RateSettings::default()
        };
        let b = compute_for_settled_total(inr(dec!(3000)), zero(), &settings).unwrap();
        assert_eq!(b.commission_amount.amount(), dec!(300));
        assert_eq!(b.excluded_add_ons.amount(), dec!(0));
    }
}
