//! Booking, refund and dispute DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_booking::{BookingLedgerEntry, DisputeCase, DisputeParty};

use super::{amount_in_range, positive};

/// Body of `POST /bookings/:id/refund`
#[derive(Debug, Deserialize, Validate)]
pub struct RefundActionRequest {
    #[validate(length(min = 1, max = 32))]
    pub action: String,
    #[validate(custom(function = "positive"))]
    pub amount: Option<Decimal>,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// Body of `POST /bookings/:id/penalty`
#[derive(Debug, Deserialize, Validate)]
pub struct PenaltyRequest {
    #[validate(custom(function = "positive"))]
    pub amount: Decimal,
}

/// Body of `POST /bookings/:id/disputes`
#[derive(Debug, Deserialize, Validate)]
pub struct OpenDisputeRequest {
    pub raised_by: DisputeParty,
    #[validate(length(min = 1, max = 2000))]
    pub reason: String,
}

/// Body of `POST /disputes/:id`
#[derive(Debug, Deserialize, Validate)]
pub struct DisputeActionRequest {
    #[validate(length(min = 1, max = 32))]
    pub action: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(custom(function = "amount_in_range"))]
    pub refund_amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct DisputeActionResponse {
    pub dispute: DisputeCase,
    pub booking: BookingLedgerEntry,
}
