//! Booking domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};
use domain_rates::RateError;

/// Errors that can occur in the booking ledger, refund and dispute workflows
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Dispute not found: {0}")]
    DisputeNotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Refund not allowed: {0}")]
    RefundNotAllowed(String),

    #[error("Booking {0} already has an open dispute")]
    DisputeAlreadyOpen(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Rate(#[from] RateError),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl BookingError {
    pub(crate) fn transition(from: impl std::fmt::Debug, to: impl std::fmt::Debug) -> Self {
        BookingError::InvalidStatusTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }
}
