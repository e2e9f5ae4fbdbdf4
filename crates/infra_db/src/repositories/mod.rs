//! Repository implementations for settlement entities
//!
//! Repositories own the SQL and speak in row types; the adapters in
//! `crate::adapters` convert rows to domain values. Queries are checked at
//! runtime (`query_as` with `FromRow`) so the crate builds without a live
//! database.

pub mod settings;
pub mod bookings;
pub mod disputes;
pub mod payouts;
pub mod host_profiles;

pub use settings::SettingsRepository;
pub use bookings::BookingRepository;
pub use disputes::DisputeRepository;
pub use payouts::PayoutRepository;
pub use host_profiles::HostProfileRepository;
