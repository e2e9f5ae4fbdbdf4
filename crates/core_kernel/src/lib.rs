//! Core Kernel - Foundational types for the homestay settlement system
//!
//! This crate provides the building blocks shared by every domain crate:
//! - Money and percentage rates with precise decimal arithmetic
//! - Settlement periods in the marketplace timezone
//! - Strongly typed identifiers
//! - Actor identity for audited mutations
//! - Port error and health types for the adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod actor;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{SettlementPeriod, Timezone, TemporalError};
pub use identifiers::{
    HostId, GuestId, StayId, BookingId, DisputeId, PayoutId, AdjustmentId,
};
pub use actor::{Actor, Role};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
