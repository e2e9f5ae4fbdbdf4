//! Host Payout Domain
//!
//! This crate turns settled bookings into host payouts and tracks each payout
//! until the money has left the platform.
//!
//! # Payout Lifecycle
//!
//! ```text
//! pending -> processing -> completed
//!    |            |
//!    +-> failed <-+ -> (retry)
//!    +-> cancelled
//! ```
//!
//! Generation is idempotent per (host, booking). Refunds approved after a
//! payout exists are booked as negative adjustments by the reconciler.

pub mod payout;
pub mod transition;
pub mod generator;
pub mod reconciliation;
pub mod ports;
pub mod service;
pub mod error;

pub use payout::{
    AmountsSnapshot, BankAccount, HostPayoutProfile, PayoutDestination, PayoutMethod, PayoutRecord,
    PayoutStatus,
};
pub use transition::{PayoutAction, TransitionRequest};
pub use generator::{
    payout_breakdown, BookingOutcome, GenerationReport, PayoutGenerator, PayoutOutcome, SkipReason,
};
pub use reconciliation::{refund_adjustment, PayoutAdjustment, RefundReconciler};
pub use ports::{HostProfilePort, PayoutPort};
pub use service::PayoutService;
pub use error::PayoutError;
