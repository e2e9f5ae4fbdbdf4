//! Payout DTOs

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use domain_payout::PayoutStatus;

/// Body of `POST /payouts/generate`
///
/// Dates are calendar days in the marketplace timezone, both inclusive.
#[derive(Debug, Deserialize, Validate)]
pub struct GeneratePayoutsRequest {
    pub host_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// Body of `POST /payouts/:id/transition`
#[derive(Debug, Deserialize, Validate)]
pub struct TransitionPayoutRequest {
    #[validate(length(min = 1, max = 32))]
    pub action: String,
    #[validate(length(max = 128))]
    pub transaction_id: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListPayoutsQuery {
    pub status: Option<PayoutStatus>,
}
