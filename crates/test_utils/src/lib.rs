//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! settlement core test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built settings, bookings, host profiles and actors
//! - `builders`: Builder patterns for bookings and host profiles
//! - `database`: PostgreSQL container management for adapter tests
//! - `assertions`: Assertion helpers for money and breakdowns
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
