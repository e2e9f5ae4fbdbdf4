//! Custom Test Assertions
//!
//! Assertion helpers for settlement types with clearer failure messages
//! than plain `assert_eq!`.

use core_kernel::Money;
use domain_payout::{PayoutRecord, PayoutStatus};
use domain_rates::Breakdown;
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts an exact INR amount, e.g. `assert_inr(&b.net_payout, dec!(8882))`
pub fn assert_inr(actual: &Money, expected: Decimal) {
    assert_money_approx_eq(actual, &Money::inr(expected), Decimal::ZERO);
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts the internal consistency of a breakdown
///
/// Deductions must add up to `total_deductions`, and net plus deductions
/// must give back the total.
pub fn assert_breakdown_balanced(breakdown: &Breakdown) {
    let deductions = breakdown.commission_amount
        + breakdown.gst_amount
        + breakdown.tcs_amount
        + breakdown.platform_fee_amount
        + breakdown.penalty_amount;
    assert_eq!(
        deductions, breakdown.total_deductions,
        "deduction components do not sum to total_deductions"
    );
    assert_eq!(
        breakdown.net_payout + breakdown.total_deductions,
        breakdown.total,
        "net + deductions != total"
    );
}

/// Asserts a payout's status and that completed payouts carry a transaction id
pub fn assert_payout_status(payout: &PayoutRecord, expected: PayoutStatus) {
    assert_eq!(
        payout.status, expected,
        "payout {} is {:?}, expected {:?}",
        payout.id, payout.status, expected
    );
    if expected == PayoutStatus::Completed {
        assert!(
            payout.transaction_id.is_some(),
            "completed payout {} has no transaction id",
            payout.id
        );
        assert!(payout.processed_at.is_some(), "completed payout {} has no processed_at", payout.id);
    }
}
