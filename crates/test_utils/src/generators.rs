//! Property-Based Test Generators
//!
//! Proptest strategies for settlement data that respect the domain's
//! bounds, plus `fake`-backed generators for realistic host details.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use core_kernel::{Money, Rate, SettlementPeriod};
use domain_rates::{RateBounds, RateSettings};
use fake::faker::name::en::Name;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Strategy for booking amounts in paise (1 rupee to 10 lakh)
pub fn booking_amount_minor_strategy() -> impl Strategy<Value = i64> {
    100i64..100_000_000i64
}

/// Strategy for positive INR amounts
pub fn inr_money_strategy() -> impl Strategy<Value = Money> {
    booking_amount_minor_strategy().prop_map(|minor| Money::from_minor(minor, core_kernel::Currency::INR))
}

/// Strategy for INR amounts that may be zero, used for add-ons
pub fn inr_add_on_strategy() -> impl Strategy<Value = Money> {
    prop_oneof![
        Just(Money::inr(Decimal::ZERO)),
        (100i64..2_000_000i64).prop_map(|minor| Money::from_minor(minor, core_kernel::Currency::INR)),
    ]
}

/// Strategy for a percentage inside `bounds`, at two decimal places
pub fn rate_within_strategy(bounds: RateBounds) -> impl Strategy<Value = Rate> {
    let min = (bounds.min * Decimal::ONE_HUNDRED).to_i64().unwrap_or(0);
    let max = (bounds.max * Decimal::ONE_HUNDRED).to_i64().unwrap_or(0);
    (min..=max).prop_map(|hundredths| Rate::from_percentage(Decimal::new(hundredths, 2)))
}

/// Strategy for settings that always pass validation
pub fn rate_settings_strategy() -> impl Strategy<Value = RateSettings> {
    (
        rate_within_strategy(RateBounds::COMMISSION),
        rate_within_strategy(RateBounds::GST),
        rate_within_strategy(RateBounds::TCS),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(commission, gst, tcs, gst_enabled, tcs_enabled, gst_inclusive)| RateSettings {
            commission_rate: commission,
            gst_enabled,
            gst_rate: gst,
            gst_inclusive,
            tcs_enabled,
            tcs_rate: tcs,
            ..RateSettings::default()
        })
}

/// Strategy for instants across 2025
pub fn timestamp_2025_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..365 * 24 * 3600).prop_map(|offset| {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(offset)
    })
}

/// Strategy for settlement periods of 1 to 92 days in 2025
pub fn settlement_period_strategy() -> impl Strategy<Value = SettlementPeriod> {
    (0i64..270, 0i64..92).prop_map(|(start, len)| {
        let first = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(start);
        SettlementPeriod::new(first, first + Duration::days(len)).unwrap()
    })
}

/// Strategy for UPI handles
pub fn upi_id_strategy() -> impl Strategy<Value = String> {
    ("[a-z]{3,12}", prop_oneof![Just("oksbi"), Just("okhdfcbank"), Just("ybl"), Just("paytm")])
        .prop_map(|(handle, bank)| format!("{}@{}", handle, bank))
}

/// Strategy for IFSC codes: four bank letters, a zero, six branch characters
pub fn ifsc_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{4}0[A-Z0-9]{6}".prop_map(|s| s)
}

/// Strategy for bank account numbers
pub fn account_number_strategy() -> impl Strategy<Value = String> {
    "[0-9]{9,18}".prop_map(|s| s)
}

/// A realistic account holder name
pub fn fake_account_holder() -> String {
    Name().fake()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_rates::compute_breakdown;

    proptest! {
        #[test]
        fn generated_settings_validate(settings in rate_settings_strategy()) {
            prop_assert!(settings.validate().is_ok());
        }

        #[test]
        fn gst_rate_respects_bounds(rate in rate_within_strategy(RateBounds::GST)) {
            prop_assert!(rate.is_within(RateBounds::GST.min, RateBounds::GST.max));
        }

        #[test]
        fn periods_are_ordered(period in settlement_period_strategy()) {
            prop_assert!(period.start() <= period.end());
            prop_assert!(period.start_instant() < period.end_instant());
        }

        #[test]
        fn ifsc_has_fixed_shape(ifsc in ifsc_strategy()) {
            prop_assert_eq!(ifsc.len(), 11);
            prop_assert_eq!(&ifsc[4..5], "0");
        }

        #[test]
        fn breakdown_net_never_exceeds_total(
            base in inr_money_strategy(),
            cleaning in inr_add_on_strategy(),
            settings in rate_settings_strategy(),
        ) {
            let zero = Money::inr(Decimal::ZERO);
            let breakdown = compute_breakdown(base, cleaning, zero, &settings).unwrap();
            prop_assert!(breakdown.net_payout.amount() <= breakdown.total.amount());
            prop_assert!(!breakdown.net_payout.is_negative());
        }
    }

    #[test]
    fn test_fake_holder_is_not_empty() {
        assert!(!fake_account_holder().trim().is_empty());
    }
}
