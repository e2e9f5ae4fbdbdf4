//! Request handlers

pub mod health;
pub mod settings;
pub mod bookings;
pub mod disputes;
pub mod payouts;
