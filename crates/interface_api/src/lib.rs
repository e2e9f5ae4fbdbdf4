//! HTTP API Layer
//!
//! Admin REST API for the settlement core using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: thin request handlers calling the domain services
//! - **Middleware**: JWT authentication, audit logging, request ids, tracing
//! - **DTOs**: validated request bodies and composite responses
//! - **Error Handling**: domain errors mapped to `{error, message}` responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, Ports};
//!
//! let state = AppState::new(Ports::postgres(pool), config);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::{HealthCheckResult, HealthCheckable};
use domain_booking::{BookingPort, BookingService, DisputePort, DisputeService};
use domain_payout::{HostProfilePort, PayoutGenerator, PayoutPort, PayoutService, RefundReconciler};
use domain_rates::{SettingsPort, SettingsService};
use infra_db::{
    DatabasePool, PostgresBookingAdapter, PostgresDisputeAdapter, PostgresHostProfileAdapter,
    PostgresPayoutAdapter, PostgresSettingsAdapter,
};

use crate::config::ApiConfig;
use crate::handlers::{bookings, disputes, health, payouts, settings};
use crate::middleware::{audit_middleware, auth_middleware};

/// The store adapters behind the services
#[derive(Clone)]
pub struct Ports {
    pub settings: Arc<dyn SettingsPort>,
    pub bookings: Arc<dyn BookingPort>,
    pub disputes: Arc<dyn DisputePort>,
    pub payouts: Arc<dyn PayoutPort>,
    pub hosts: Arc<dyn HostProfilePort>,
}

impl Ports {
    /// PostgreSQL adapters sharing one pool
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            settings: Arc::new(PostgresSettingsAdapter::new(pool.clone())),
            bookings: Arc::new(PostgresBookingAdapter::new(pool.clone())),
            disputes: Arc::new(PostgresDisputeAdapter::new(pool.clone())),
            payouts: Arc::new(PostgresPayoutAdapter::new(pool.clone())),
            hosts: Arc::new(PostgresHostProfileAdapter::new(pool)),
        }
    }

    /// Health of every adapter, in a fixed order
    pub async fn health_checks(&self) -> Vec<HealthCheckResult> {
        vec![
            self.settings.health_check().await,
            self.bookings.health_check().await,
            self.disputes.health_check().await,
            self.payouts.health_check().await,
            self.hosts.health_check().await,
        ]
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub ports: Ports,
    pub settings: SettingsService,
    pub bookings: BookingService,
    pub disputes: DisputeService,
    pub payouts: PayoutService,
    pub generator: PayoutGenerator,
    pub reconciler: RefundReconciler,
}

impl AppState {
    /// Wires the domain services over `ports`
    pub fn new(ports: Ports, config: ApiConfig) -> Self {
        let settings = SettingsService::new(ports.settings.clone());
        Self {
            bookings: BookingService::new(ports.bookings.clone(), settings.clone()),
            disputes: DisputeService::new(ports.bookings.clone(), ports.disputes.clone()),
            payouts: PayoutService::new(ports.payouts.clone()),
            generator: PayoutGenerator::new(
                ports.bookings.clone(),
                ports.payouts.clone(),
                ports.hosts.clone(),
                settings.clone(),
            ),
            reconciler: RefundReconciler::new(
                ports.bookings.clone(),
                ports.payouts.clone(),
                settings.clone(),
            ),
            settings,
            ports,
            config,
        }
    }
}

/// Creates the main API router
///
/// Health probes are public; everything under `/api/v1` needs a bearer token.
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static("x-request-id");

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let settings_routes = Router::new()
        .route("/", get(settings::get_settings).patch(settings::update_settings))
        .route("/history", get(settings::settings_history));

    let booking_routes = Router::new()
        .route("/:id", get(bookings::get_booking))
        .route(
            "/:id/breakdown",
            get(bookings::booking_breakdown).post(bookings::refresh_breakdown),
        )
        .route("/:id/penalty", post(bookings::record_penalty))
        .route("/:id/refund", post(bookings::refund_action))
        .route("/:id/reconcile", post(bookings::reconcile_refund))
        .route("/:id/disputes", post(bookings::open_dispute));

    let dispute_routes = Router::new()
        .route("/:id", get(disputes::get_dispute).post(disputes::dispute_action));

    let payout_routes = Router::new()
        .route("/generate", post(payouts::generate_payouts))
        .route("/:id", get(payouts::get_payout))
        .route("/:id/transition", post(payouts::transition_payout));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/settings", settings_routes)
        .route("/breakdown", post(settings::preview_breakdown))
        .nest("/bookings", booking_routes)
        .nest("/disputes", dispute_routes)
        .nest("/payouts", payout_routes)
        .route("/hosts/:id/payouts", get(payouts::list_host_payouts))
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
