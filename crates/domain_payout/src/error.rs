//! Payout domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};
use domain_booking::BookingError;
use domain_rates::RateError;

/// Errors that can occur generating, transitioning or reconciling payouts
#[derive(Debug, Error)]
pub enum PayoutError {
    #[error("Payout not found: {0}")]
    PayoutNotFound(String),

    #[error("No payout destination configured for host {host_id}: {reason}")]
    PayoutDestinationMissing { host_id: String, reason: String },

    #[error("Payout {0} is already processed")]
    AlreadyProcessed(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("A transaction id is required to process a payout")]
    MissingTransactionId,

    #[error("Payout {0} already has a refund adjustment")]
    AdjustmentExists(String),

    #[error("Booking {0} has no approved or processed refund")]
    RefundNotSettled(String),

    #[error("Booking {0} has no payout")]
    NoPayoutForBooking(String),

    #[error("Payout {0} was cancelled and cannot be adjusted")]
    PayoutCancelled(String),

    #[error("Concurrent update: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Rate(#[from] RateError),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl PayoutError {
    pub(crate) fn transition(from: impl std::fmt::Debug, to: impl std::fmt::Debug) -> Self {
        PayoutError::InvalidStatusTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }

    pub(crate) fn destination_missing(host_id: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        PayoutError::PayoutDestinationMissing {
            host_id: host_id.to_string(),
            reason: reason.into(),
        }
    }
}
