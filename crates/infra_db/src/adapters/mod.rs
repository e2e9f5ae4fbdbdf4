//! Domain Adapters
//!
//! PostgreSQL implementations of the domain ports. Each adapter wraps its
//! repository, converts rows to domain values and maps `DatabaseError` to
//! `PortError`.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_payout::PayoutPort;
//! use infra_db::adapters::PostgresPayoutAdapter;
//!
//! let payouts: Arc<dyn PayoutPort> = Arc::new(PostgresPayoutAdapter::new(pool));
//! ```

pub mod settings;
pub mod bookings;
pub mod disputes;
pub mod payouts;
pub mod host_profiles;

pub use settings::PostgresSettingsAdapter;
pub use bookings::PostgresBookingAdapter;
pub use disputes::PostgresDisputeAdapter;
pub use payouts::PostgresPayoutAdapter;
pub use host_profiles::PostgresHostProfileAdapter;

use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, Currency, HealthCheckResult, Money, PortError};

/// Runs `SELECT 1` and reports latency
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (status, message) = match result {
        Ok(_) => (AdapterHealth::Healthy, None),
        Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
    };
    HealthCheckResult {
        adapter_id: adapter_id.to_string(),
        status,
        latency_ms,
        message,
        checked_at: Utc::now(),
    }
}

pub(crate) fn currency(code: &str) -> Result<Currency, PortError> {
    Currency::from_str(code.trim()).map_err(|e| PortError::transformation(e.to_string()))
}

pub(crate) fn money(amount: Decimal, currency: Currency) -> Money {
    Money::new(amount, currency)
}
