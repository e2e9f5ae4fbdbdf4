//! Settlement Workflow Tests
//!
//! Cross-crate scenarios over the in-memory stores: settings bootstrap,
//! payout generation, payout lifecycle and refund reconciliation.

use std::sync::Arc;

use core_kernel::{HostId, Money};
use domain_booking::ports::mock::MockBookingPort;
use domain_booking::{BookingPort, BookingService, RefundAction};
use domain_payout::ports::mock::{MockHostProfilePort, MockPayoutPort};
use domain_payout::{
    PayoutAction, PayoutError, PayoutGenerator, PayoutOutcome, PayoutService, PayoutStatus,
    RefundReconciler, TransitionRequest,
};
use domain_rates::ports::mock::MockSettingsPort;
use domain_rates::{RateSettingsUpdate, SettingsService};
use rust_decimal_macros::dec;
use test_utils::{
    assert_inr, assert_payout_status, ActorFixtures, BookingBuilder, BookingStage, HostFixtures,
    TemporalFixtures,
};

struct Harness {
    host_id: HostId,
    settings: SettingsService,
    bookings: BookingService,
    booking_port: MockBookingPort,
    payouts: PayoutService,
    generator: PayoutGenerator,
    reconciler: RefundReconciler,
}

async fn harness() -> Harness {
    let host_id = HostFixtures::host_id();
    let booking_port = MockBookingPort::new();
    let payout_port = Arc::new(MockPayoutPort::new());
    let hosts = Arc::new(MockHostProfilePort::with_profile(HostFixtures::upi_profile(host_id)).await);

    let settings = SettingsService::new(Arc::new(MockSettingsPort::new()));
    settings.ensure_default(&ActorFixtures::admin()).await.unwrap();

    let booking_arc: Arc<dyn BookingPort> = Arc::new(booking_port.clone());
    Harness {
        host_id,
        bookings: BookingService::new(booking_arc.clone(), settings.clone()),
        payouts: PayoutService::new(payout_port.clone()),
        generator: PayoutGenerator::new(booking_arc.clone(), payout_port.clone(), hosts, settings.clone()),
        reconciler: RefundReconciler::new(booking_arc, payout_port, settings.clone()),
        settings,
        booking_port,
    }
}

mod payout_generation {
    use super::*;

    #[tokio::test]
    async fn test_only_settled_bookings_in_period_are_paid_out() {
        let h = harness().await;
        let big = BookingBuilder::new().with_host(h.host_id).build();
        let small = BookingBuilder::new()
            .with_host(h.host_id)
            .with_base_amount(Money::inr(dec!(5000)))
            .build();
        let unpaid = BookingBuilder::new().with_host(h.host_id).stage(BookingStage::Created).build();
        let cancelled = BookingBuilder::new().with_host(h.host_id).stage(BookingStage::Cancelled).build();
        let other_host = BookingBuilder::new().build();
        for booking in [&big, &small, &unpaid, &cancelled, &other_host] {
            h.booking_port.insert(booking).await.unwrap();
        }

        let report = h
            .generator
            .generate_payouts(&h.host_id, TemporalFixtures::march_2025(), &ActorFixtures::finance())
            .await
            .unwrap();

        assert_eq!(report.created, 2);
        assert_eq!(report.failed, 0);
        assert_inr(&report.total_net_payout, dec!(13382));

        let listed = h.payouts.list_for_host(&h.host_id, None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|p| p.status == PayoutStatus::Pending));
    }

    #[tokio::test]
    async fn test_second_run_skips_existing_payouts() {
        let h = harness().await;
        h.booking_port
            .insert(&BookingBuilder::new().with_host(h.host_id).build())
            .await
            .unwrap();
        let finance = ActorFixtures::finance();

        h.generator
            .generate_payouts(&h.host_id, TemporalFixtures::march_2025(), &finance)
            .await
            .unwrap();
        let rerun = h
            .generator
            .generate_payouts(&h.host_id, TemporalFixtures::march_2025(), &finance)
            .await
            .unwrap();

        assert_eq!(rerun.created, 0);
        assert_eq!(rerun.skipped, 1);
        assert!(rerun.total_net_payout.is_zero());
    }

    #[tokio::test]
    async fn test_empty_period_creates_nothing() {
        let h = harness().await;
        h.booking_port
            .insert(&BookingBuilder::new().with_host(h.host_id).build())
            .await
            .unwrap();

        let report = h
            .generator
            .generate_payouts(&h.host_id, TemporalFixtures::april_2025(), &ActorFixtures::finance())
            .await
            .unwrap();

        assert_eq!(report.created, 0);
        assert!(report.outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_survives_settings_change() {
        let h = harness().await;
        h.booking_port
            .insert(&BookingBuilder::new().with_host(h.host_id).build())
            .await
            .unwrap();
        let report = h
            .generator
            .generate_payouts(&h.host_id, TemporalFixtures::march_2025(), &ActorFixtures::finance())
            .await
            .unwrap();
        let PayoutOutcome::Created { payout_id, .. } = report.outcomes[0].outcome.clone() else {
            panic!("expected a created payout");
        };

        let update = RateSettingsUpdate {
            commission_rate: Some(dec!(15)),
            ..RateSettingsUpdate::default()
        };
        h.settings.update(&update, &ActorFixtures::admin()).await.unwrap();

        let payout = h.payouts.get(&payout_id).await.unwrap();
        assert_inr(&payout.net_payout(), dec!(8882));
        assert_eq!(payout.amounts.settings_version, 1);
    }
}

mod payout_lifecycle {
    use super::*;

    #[tokio::test]
    async fn test_initiate_then_complete() {
        let h = harness().await;
        h.booking_port
            .insert(&BookingBuilder::new().with_host(h.host_id).build())
            .await
            .unwrap();
        let finance = ActorFixtures::finance();
        h.generator
            .generate_payouts(&h.host_id, TemporalFixtures::march_2025(), &finance)
            .await
            .unwrap();
        let payout = h.payouts.list_for_host(&h.host_id, None).await.unwrap().remove(0);

        let processing = h
            .payouts
            .transition(&payout.id, PayoutAction::Initiate, TransitionRequest::default(), &finance)
            .await
            .unwrap();
        assert_payout_status(&processing, PayoutStatus::Processing);

        let request = TransitionRequest {
            transaction_id: Some("UTR0001".to_string()),
            notes: None,
        };
        let completed = h
            .payouts
            .transition(&payout.id, PayoutAction::Process, request, &finance)
            .await
            .unwrap();
        assert_payout_status(&completed, PayoutStatus::Completed);

        let err = h
            .payouts
            .transition(&payout.id, PayoutAction::Fail, TransitionRequest::default(), &finance)
            .await
            .unwrap_err();
        assert!(matches!(err, PayoutError::AlreadyProcessed(_)));
    }
}

mod refund_reconciliation {
    use super::*;

    #[tokio::test]
    async fn test_partial_refund_adjusts_payout() {
        let h = harness().await;
        let booking = BookingBuilder::new().with_host(h.host_id).build();
        h.booking_port.insert(&booking).await.unwrap();
        let finance = ActorFixtures::finance();
        h.generator
            .generate_payouts(&h.host_id, TemporalFixtures::march_2025(), &finance)
            .await
            .unwrap();

        let request = RefundAction::parse("request", Some(dec!(5000)), Some("early checkout".into())).unwrap();
        h.bookings.apply_refund(&booking.id, request, &finance).await.unwrap();
        let approve = RefundAction::parse("approve", None, None).unwrap();
        h.bookings.apply_refund(&booking.id, approve, &finance).await.unwrap();

        let adjustment = h
            .reconciler
            .reconcile_refund(&booking.id, &ActorFixtures::admin())
            .await
            .unwrap();
        assert_inr(&adjustment.amount, dec!(-4382));
        assert_inr(&adjustment.revised_net_payout, dec!(4500));

        let again = h
            .reconciler
            .reconcile_refund(&booking.id, &ActorFixtures::admin())
            .await
            .unwrap_err();
        assert!(matches!(again, PayoutError::AdjustmentExists(_)));
    }

    #[tokio::test]
    async fn test_refund_before_payout_is_rejected() {
        let h = harness().await;
        let booking = BookingBuilder::new()
            .with_host(h.host_id)
            .with_processed_refund(dec!(1000))
            .build();
        h.booking_port.insert(&booking).await.unwrap();

        let err = h
            .reconciler
            .reconcile_refund(&booking.id, &ActorFixtures::admin())
            .await
            .unwrap_err();
        assert!(matches!(err, PayoutError::NoPayoutForBooking(_)));
    }

    #[tokio::test]
    async fn test_reconcile_needs_admin() {
        let h = harness().await;
        let booking = BookingBuilder::new().with_host(h.host_id).build();
        h.booking_port.insert(&booking).await.unwrap();

        let err = h
            .reconciler
            .reconcile_refund(&booking.id, &ActorFixtures::finance())
            .await
            .unwrap_err();
        assert!(matches!(err, PayoutError::Forbidden(_)));
    }
}
