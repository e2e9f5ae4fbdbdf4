//! API error handling
//!
//! Domain errors are mapped to HTTP statuses here and nowhere else, so
//! handlers can use `?` on service calls.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::{MoneyError, PortError, TemporalError};
use domain_booking::BookingError;
use domain_payout::PayoutError;
use domain_rates::RateError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Well-formed request the current state cannot honour
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String, Vec<String>),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) | ApiError::Validation(..) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unprocessable(_) => "unprocessable",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Internal(_) => "internal_error",
            ApiError::Validation(..) => "validation_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_type = self.error_type();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let (message, details) = match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::ServiceUnavailable(msg) => (msg, None),
            ApiError::Unauthorized => ("Unauthorized".to_string(), None),
            // Store details stay in the log
            ApiError::Internal(_) => ("internal error".to_string(), None),
            ApiError::Validation(msg, details) => (msg, Some(details)),
        };
        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Validation { .. } => ApiError::BadRequest(err.to_string()),
            PortError::Conflict { .. } => ApiError::Conflict(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<MoneyError> for ApiError {
    fn from(err: MoneyError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<TemporalError> for ApiError {
    fn from(err: TemporalError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<RateError> for ApiError {
    fn from(err: RateError) -> Self {
        match err {
            RateError::SettingsNotConfigured => ApiError::ServiceUnavailable(err.to_string()),
            RateError::InvalidRateValue { .. } => ApiError::Unprocessable(err.to_string()),
            RateError::InvalidAmount { .. } | RateError::Currency(_) => ApiError::BadRequest(err.to_string()),
            RateError::VersionConflict { .. } => ApiError::Conflict(err.to_string()),
            RateError::Forbidden(msg) => ApiError::Forbidden(msg),
            RateError::Port(e) => e.into(),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::BookingNotFound(_) | BookingError::DisputeNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            BookingError::InvalidAction(_) | BookingError::Money(_) => ApiError::BadRequest(err.to_string()),
            BookingError::InvalidAmount(_) | BookingError::RefundNotAllowed(_) => {
                ApiError::Unprocessable(err.to_string())
            }
            BookingError::InvalidStatusTransition { .. } | BookingError::DisputeAlreadyOpen(_) => {
                ApiError::Conflict(err.to_string())
            }
            BookingError::Forbidden(msg) => ApiError::Forbidden(msg),
            BookingError::Rate(e) => e.into(),
            BookingError::Port(e) => e.into(),
        }
    }
}

impl From<PayoutError> for ApiError {
    fn from(err: PayoutError) -> Self {
        match err {
            PayoutError::PayoutNotFound(_) => ApiError::NotFound(err.to_string()),
            PayoutError::InvalidAction(_) | PayoutError::Money(_) => ApiError::BadRequest(err.to_string()),
            PayoutError::PayoutDestinationMissing { .. }
            | PayoutError::MissingTransactionId
            | PayoutError::RefundNotSettled(_)
            | PayoutError::NoPayoutForBooking(_)
            | PayoutError::PayoutCancelled(_) => ApiError::Unprocessable(err.to_string()),
            PayoutError::AlreadyProcessed(_)
            | PayoutError::InvalidStatusTransition { .. }
            | PayoutError::AdjustmentExists(_)
            | PayoutError::Conflict(_) => ApiError::Conflict(err.to_string()),
            PayoutError::Forbidden(msg) => ApiError::Forbidden(msg),
            PayoutError::Rate(e) => e.into(),
            PayoutError::Booking(e) => e.into(),
            PayoutError::Port(e) => e.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        ApiError::Validation("request failed validation".to_string(), details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_missing_is_unavailable() {
        let err: ApiError = RateError::SettingsNotConfigured.into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_already_processed_is_conflict() {
        let err: ApiError = PayoutError::AlreadyProcessed("p-1".into()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_cancelled_payout_is_unprocessable() {
        let err: ApiError = PayoutError::PayoutCancelled("p-1".into()).into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_nested_not_found_is_404() {
        let err: ApiError = PayoutError::Booking(BookingError::BookingNotFound("b".into())).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_connection_failure_is_internal() {
        let err: ApiError = PortError::connection("pool closed").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
