//! Settings and calculator DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_rates::RateSettings;

use super::amount_in_range;

#[derive(Debug, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<u32>,
}

/// Body of `POST /breakdown`
#[derive(Debug, Deserialize, Validate)]
pub struct BreakdownRequest {
    #[validate(custom(function = "amount_in_range"))]
    pub base_amount: Decimal,
    #[validate(custom(function = "amount_in_range"))]
    pub cleaning_fee: Option<Decimal>,
    #[validate(custom(function = "amount_in_range"))]
    pub extra_guest_charge: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct SettingsHistoryResponse {
    pub versions: Vec<RateSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_base_rejected() {
        let request = BreakdownRequest {
            base_amount: dec!(-1),
            cleaning_fee: None,
            extra_guest_charge: Some(dec!(0)),
        };
        assert!(request.validate().is_err());
    }
}
