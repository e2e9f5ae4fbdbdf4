//! HTTP API Tests
//!
//! Drives the router end to end over the in-memory stores.
//!
//! - `auth` - public health checks, bearer tokens and roles
//! - `settings` - reads, partial updates and the calculator preview
//! - `payouts` - generation and the payout state machine
//! - `refunds` - refund workflow, disputes and reconciliation
//! - `admin` - penalties and repricing of stored bookings

use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::{GuestId, HostId, Money, Role, StayId};
use domain_booking::ports::mock::{MockBookingPort, MockDisputePort};
use domain_booking::{BookingLedgerEntry, BookingPricing, BookingStatus};
use domain_payout::ports::mock::{MockHostProfilePort, MockPayoutPort};
use domain_payout::{HostPayoutProfile, PayoutMethod};
use domain_rates::ports::mock::MockSettingsPort;
use domain_rates::RateSettings;
use interface_api::auth::create_token;
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState, Ports};

const SECRET: &str = "api-test-secret";

struct TestApp {
    server: TestServer,
    host_id: HostId,
    booking: BookingLedgerEntry,
}

fn settled_booking(host_id: HostId) -> BookingLedgerEntry {
    let mut entry = BookingLedgerEntry::new(
        host_id,
        GuestId::new(),
        StayId::new(),
        BookingPricing::base_only(Money::inr(dec!(10000))),
    )
    .unwrap();
    entry.created_at = Utc.with_ymd_and_hms(2025, 3, 10, 6, 0, 0).unwrap();
    entry.mark_paid().unwrap();
    entry.update_booking_status(BookingStatus::Ongoing).unwrap();
    entry.update_booking_status(BookingStatus::Completed).unwrap();
    entry
}

async fn app() -> TestApp {
    let host_id = HostId::new();
    let booking = settled_booking(host_id);

    let ports = Ports {
        settings: Arc::new(MockSettingsPort::with_settings(RateSettings::default()).await),
        bookings: Arc::new(MockBookingPort::with_bookings(vec![booking.clone()]).await),
        disputes: Arc::new(MockDisputePort::new()),
        payouts: Arc::new(MockPayoutPort::new()),
        hosts: Arc::new(
            MockHostProfilePort::with_profile(HostPayoutProfile {
                host_id,
                preferred_method: Some(PayoutMethod::Upi),
                bank_account: None,
                upi_id: Some("host@oksbi".into()),
                wallet_id: None,
            })
            .await,
        ),
    };
    let config = ApiConfig {
        jwt_secret: SECRET.to_string(),
        ..ApiConfig::default()
    };
    let server = TestServer::new(create_router(AppState::new(ports, config))).unwrap();

    TestApp {
        server,
        host_id,
        booking,
    }
}

fn bearer(roles: &[Role]) -> HeaderValue {
    let token = create_token("operator-1", roles, SECRET, 300).unwrap();
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

fn as_finance(request: TestRequest) -> TestRequest {
    request.add_header(header::AUTHORIZATION, bearer(&[Role::Finance]))
}

fn as_admin(request: TestRequest) -> TestRequest {
    request.add_header(header::AUTHORIZATION, bearer(&[Role::Admin]))
}

fn amount(value: &Value) -> Decimal {
    value["amount"].as_str().unwrap().parse().unwrap()
}

impl TestApp {
    async fn generate(&self) -> Value {
        let response = as_finance(self.server.post("/api/v1/payouts/generate"))
            .json(&json!({
                "host_id": self.host_id.to_string(),
                "period_start": "2025-03-01",
                "period_end": "2025-03-31",
            }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()
    }

    async fn refund(&self, body: Value) -> axum_test::TestResponse {
        as_finance(
            self.server
                .post(&format!("/api/v1/bookings/{}/refund", self.booking.id)),
        )
        .json(&body)
        .await
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app().await;
        app.server.get("/health").await.assert_status_ok();

        let ready = app.server.get("/health/ready").await;
        ready.assert_status_ok();
        assert_eq!(ready.json::<Value>()["status"], "ready");
    }

    #[tokio::test]
    async fn test_api_requires_token() {
        let app = app().await;
        app.server
            .get("/api/v1/settings")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let app = app().await;
        app.server
            .get("/api/v1/settings")
            .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer nope"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

mod settings {
    use super::*;

    #[tokio::test]
    async fn test_read_current_settings() {
        let app = app().await;
        let response = as_finance(app.server.get("/api/v1/settings")).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["version"], 1);
    }

    #[tokio::test]
    async fn test_update_requires_admin() {
        let app = app().await;
        as_finance(app.server.patch("/api/v1/settings"))
            .json(&json!({ "commission_rate": "12" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_partial_update_bumps_version() {
        let app = app().await;
        let response = as_admin(app.server.patch("/api/v1/settings"))
            .json(&json!({ "tcs_enabled": false }))
            .await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["version"], 2);
        assert_eq!(body["tcs_enabled"], false);
        assert_eq!(body["gst_enabled"], true);
        assert_eq!(body["updated_by"], "operator-1");

        let history = as_admin(app.server.get("/api/v1/settings/history")).await;
        history.assert_status_ok();
        assert_eq!(history.json::<Value>()["versions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_out_of_bounds_rate_is_unprocessable() {
        let app = app().await;
        let response = as_admin(app.server.patch("/api/v1/settings"))
            .json(&json!({ "gst_rate": "45" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "unprocessable");
    }

    #[tokio::test]
    async fn test_breakdown_preview() {
        let app = app().await;
        let response = as_finance(app.server.post("/api/v1/breakdown"))
            .json(&json!({ "base_amount": "10000" }))
            .await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(amount(&body["commission_amount"]), dec!(1000));
        assert_eq!(amount(&body["gst_amount"]), dec!(1800));
        assert_eq!(amount(&body["tcs_amount"]), dec!(118));
        assert_eq!(amount(&body["net_payout"]), dec!(8882));
    }

    #[tokio::test]
    async fn test_negative_preview_fails_validation() {
        let app = app().await;
        let response = as_finance(app.server.post("/api/v1/breakdown"))
            .json(&json!({ "base_amount": "-5" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_oversized_preview_fails_validation() {
        let app = app().await;
        let response = as_finance(app.server.post("/api/v1/breakdown"))
            .json(&json!({ "base_amount": "39614081257132168796771975167" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "validation_error");
    }
}

mod payouts {
    use super::*;

    #[tokio::test]
    async fn test_generation_is_idempotent() {
        let app = app().await;

        let first = app.generate().await;
        assert_eq!(first["created"], 1);
        assert_eq!(amount(&first["total_net_payout"]), dec!(8882));

        let second = app.generate().await;
        assert_eq!(second["created"], 0);
        assert_eq!(second["skipped"], 1);
        assert_eq!(second["outcomes"][0]["outcome"], "skipped");
    }

    #[tokio::test]
    async fn test_inverted_period_is_bad_request() {
        let app = app().await;
        as_finance(app.server.post("/api/v1/payouts/generate"))
            .json(&json!({
                "host_id": app.host_id.to_string(),
                "period_start": "2025-03-31",
                "period_end": "2025-03-01",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_process_then_reprocess() {
        let app = app().await;
        let report = app.generate().await;
        let payout_id = report["outcomes"][0]["payout_id"].as_str().unwrap().to_string();
        let path = format!("/api/v1/payouts/{}/transition", payout_id);

        as_finance(app.server.post(&path))
            .json(&json!({ "action": "process" }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let done = as_finance(app.server.post(&path))
            .json(&json!({ "action": "process", "transaction_id": "UTR123456" }))
            .await;
        done.assert_status_ok();
        assert_eq!(done.json::<Value>()["status"], "completed");

        as_finance(app.server.post(&path))
            .json(&json!({ "action": "cancel" }))
            .await
            .assert_status(StatusCode::CONFLICT);

        let listed = as_finance(
            app.server
                .get(&format!("/api/v1/hosts/{}/payouts?status=completed", app.host_id)),
        )
        .await;
        listed.assert_status_ok();
        assert_eq!(listed.json::<Value>().as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_action_is_bad_request() {
        let app = app().await;
        let report = app.generate().await;
        let payout_id = report["outcomes"][0]["payout_id"].as_str().unwrap().to_string();

        as_finance(app.server.post(&format!("/api/v1/payouts/{}/transition", payout_id)))
            .json(&json!({ "action": "teleport" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

mod refunds {
    use super::*;

    #[tokio::test]
    async fn test_refund_then_reconcile() {
        let app = app().await;
        app.generate().await;

        app.refund(json!({ "action": "request", "amount": "5000", "reason": "host cancelled a night" }))
            .await
            .assert_status_ok();
        let approved = app.refund(json!({ "action": "approve" })).await;
        approved.assert_status_ok();
        assert_eq!(approved.json::<Value>()["refund"]["status"], "approved");

        let path = format!("/api/v1/bookings/{}/reconcile", app.booking.id);
        as_finance(app.server.post(&path))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let adjustment = as_admin(app.server.post(&path)).await;
        adjustment.assert_status(StatusCode::CREATED);
        let body = adjustment.json::<Value>();
        assert_eq!(amount(&body["amount"]), dec!(-4382));
        assert_eq!(amount(&body["revised_net_payout"]), dec!(4500));

        as_admin(app.server.post(&path))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_reconcile_without_refund_is_unprocessable() {
        let app = app().await;
        app.generate().await;
        as_admin(
            app.server
                .post(&format!("/api/v1/bookings/{}/reconcile", app.booking.id)),
        )
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_refund_above_total_rejected() {
        let app = app().await;
        app.refund(json!({ "action": "request", "amount": "10000.01" }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_approve_before_request_conflicts() {
        let app = app().await;
        app.refund(json!({ "action": "approve" }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_dispute_resolution_approves_refund() {
        let app = app().await;

        let opened = as_finance(
            app.server
                .post(&format!("/api/v1/bookings/{}/disputes", app.booking.id)),
        )
        .json(&json!({ "raised_by": "guest", "reason": "no hot water for two days" }))
        .await;
        opened.assert_status(StatusCode::CREATED);
        let dispute_id = opened.json::<Value>()["id"].as_str().unwrap().to_string();

        as_finance(
            app.server
                .post(&format!("/api/v1/bookings/{}/disputes", app.booking.id)),
        )
        .json(&json!({ "raised_by": "host", "reason": "second case" }))
        .await
        .assert_status(StatusCode::CONFLICT);

        let resolved = as_finance(app.server.post(&format!("/api/v1/disputes/{}", dispute_id)))
            .json(&json!({ "action": "resolve", "notes": "partial refund", "refund_amount": "1500" }))
            .await;
        resolved.assert_status_ok();

        let body = resolved.json::<Value>();
        assert_eq!(body["dispute"]["status"], "resolved");
        assert_eq!(body["booking"]["refund"]["status"], "approved");
        assert_eq!(amount(&body["booking"]["refund"]["amount"]), dec!(1500));
    }

    #[tokio::test]
    async fn test_unknown_booking_is_not_found() {
        let app = app().await;
        let response = as_finance(
            app.server
                .get(&format!("/api/v1/bookings/{}/breakdown", uuid_like())),
        )
        .await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"], "not_found");
    }

    fn uuid_like() -> String {
        HostId::new().to_string()
    }
}

mod admin {
    use super::*;

    fn penalty(app: &TestApp, body: Value) -> TestRequest {
        app.server
            .post(&format!("/api/v1/bookings/{}/penalty", app.booking.id))
            .json(&body)
    }

    #[tokio::test]
    async fn test_penalty_reduces_generated_payout() {
        let app = app().await;

        as_finance(penalty(&app, json!({ "amount": "500" })))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let recorded = as_admin(penalty(&app, json!({ "amount": "500" }))).await;
        recorded.assert_status_ok();
        assert_eq!(amount(&recorded.json::<Value>()["penalty_amount"]), dec!(500));

        let report = app.generate().await;
        assert_eq!(amount(&report["total_net_payout"]), dec!(8382));
    }

    #[tokio::test]
    async fn test_zero_penalty_fails_validation() {
        let app = app().await;
        let response = as_admin(penalty(&app, json!({ "amount": "0" }))).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_reprice_stores_breakdown() {
        let app = app().await;
        let path = format!("/api/v1/bookings/{}/breakdown", app.booking.id);

        as_finance(app.server.post(&path))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let repriced = as_admin(app.server.post(&path)).await;
        repriced.assert_status_ok();
        assert_eq!(amount(&repriced.json::<Value>()["net_payout"]), dec!(8882));

        let stored = as_finance(
            app.server
                .get(&format!("/api/v1/bookings/{}", app.booking.id)),
        )
        .await;
        assert!(stored.json::<Value>()["breakdown"].is_object());
    }
}
