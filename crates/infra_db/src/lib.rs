//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the settlement core using SQLx.
//!
//! # Architecture
//!
//! Repositories own the SQL and work on plain row structs. Adapters wrap a
//! repository, convert rows to domain values and implement the domain ports
//! (`SettingsPort`, `BookingPort`, `DisputePort`, `PayoutPort`,
//! `HostProfilePort`), so services never see SQL or `DatabaseError`.
//!
//! Invariants that must hold across concurrent writers live in the schema:
//! one payout per (host, booking), one adjustment per payout, one open
//! dispute per booking, a single current settings version.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresPayoutAdapter;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/settlement")).await?;
//! run_migrations(&pool).await?;
//! let payouts = PostgresPayoutAdapter::new(pool.clone());
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::{
    PostgresBookingAdapter, PostgresDisputeAdapter, PostgresHostProfileAdapter, PostgresPayoutAdapter,
    PostgresSettingsAdapter,
};
