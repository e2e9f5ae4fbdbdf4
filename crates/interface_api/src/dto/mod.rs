//! Request/response data transfer objects
//!
//! Domain types already serialize to the wire format, so most responses
//! return them directly. DTOs exist for request bodies (with `validator`
//! rules) and for composite responses.

pub mod settings;
pub mod bookings;
pub mod payouts;

use domain_rates::MAX_AMOUNT;
use rust_decimal::Decimal;
use validator::ValidationError;

/// Zero up to `MAX_AMOUNT`
pub(crate) fn amount_in_range(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative_amount"));
    }
    if *value > MAX_AMOUNT {
        return Err(ValidationError::new("amount_too_large"));
    }
    Ok(())
}

pub(crate) fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("non_positive_amount"));
    }
    if *value > MAX_AMOUNT {
        return Err(ValidationError::new("amount_too_large"));
    }
    Ok(())
}
