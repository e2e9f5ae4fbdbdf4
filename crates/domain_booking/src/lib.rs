//! Booking Ledger Domain
//!
//! This crate holds the financial record of each booking and the workflows
//! that move its refund and dispute state.
//!
//! # Refund Lifecycle
//!
//! ```text
//! none -> pending -> approved -> processed
//!            \-> rejected
//! ```
//!
//! # Dispute Lifecycle
//!
//! ```text
//! pending -> resolved (optionally requesting + approving a refund)
//!         \-> rejected
//! ```

pub mod booking;
pub mod refund;
pub mod dispute;
pub mod ports;
pub mod services;
pub mod error;

pub use booking::{BookingLedgerEntry, BookingPricing, BookingStatus, DisputeStatus, PaymentStatus};
pub use refund::{RefundAction, RefundDetails, RefundStatus};
pub use dispute::{DisputeAction, DisputeCase, DisputeParty};
pub use ports::{BookingPort, DisputePort, PayoutEligibility};
pub use services::{BookingService, DisputeService};
pub use error::BookingError;
