//! Booking ledger, refund and dispute services
//!
//! Services load an entry through the port, apply the domain transition and
//! save it back. Every mutation carries the acting operator, which is
//! stamped on the record and logged.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use core_kernel::{Actor, BookingId, DisputeId, GuestId, HostId, Money, PortError, Role, StayId};
use domain_rates::{Breakdown, SettingsService};

use crate::booking::{BookingLedgerEntry, BookingPricing, BookingStatus, DisputeStatus};
use crate::dispute::{DisputeAction, DisputeCase, DisputeParty};
use crate::error::BookingError;
use crate::ports::{BookingPort, DisputePort};
use crate::refund::RefundAction;

fn booking_error(id: &BookingId) -> impl FnOnce(PortError) -> BookingError + '_ {
    move |e| {
        if e.is_not_found() {
            BookingError::BookingNotFound(id.to_string())
        } else {
            e.into()
        }
    }
}

fn require_role(actor: &Actor, role: Role, operation: &str) -> Result<(), BookingError> {
    if actor.has_role(role) {
        Ok(())
    } else {
        Err(BookingError::Forbidden(format!("{} may not {}", actor, operation)))
    }
}

/// Booking ledger operations
#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingPort>,
    settings: SettingsService,
}

impl BookingService {
    pub fn new(bookings: Arc<dyn BookingPort>, settings: SettingsService) -> Self {
        Self { bookings, settings }
    }

    /// Records a new booking from checkout
    #[instrument(skip(self, pricing), fields(host = %host_id))]
    pub async fn create(
        &self,
        host_id: HostId,
        guest_id: GuestId,
        stay_id: StayId,
        pricing: BookingPricing,
    ) -> Result<BookingLedgerEntry, BookingError> {
        let entry = BookingLedgerEntry::new(host_id, guest_id, stay_id, pricing)?;
        self.bookings.insert(&entry).await?;
        info!(booking = %entry.reference, total = %entry.total_amount, "Booking recorded");
        Ok(entry)
    }

    pub async fn get(&self, id: &BookingId) -> Result<BookingLedgerEntry, BookingError> {
        self.bookings.get_booking(id).await.map_err(booking_error(id))
    }

    pub async fn find_by_reference(&self, reference: &str) -> Result<BookingLedgerEntry, BookingError> {
        self.bookings
            .find_by_reference(reference)
            .await?
            .ok_or_else(|| BookingError::BookingNotFound(reference.to_string()))
    }

    /// Returns the stored breakdown, or computes one against the current settings
    pub async fn breakdown(&self, id: &BookingId) -> Result<Breakdown, BookingError> {
        let entry = self.get(id).await?;
        if let Some(cached) = entry.breakdown {
            return Ok(cached);
        }
        let settings = self.settings.current().await?;
        entry.compute_breakdown(&settings)
    }

    /// Recomputes the breakdown with the current settings and stores it
    pub async fn refresh_breakdown(&self, id: &BookingId, actor: &Actor) -> Result<Breakdown, BookingError> {
        require_role(actor, Role::Admin, "reprice bookings")?;
        let mut entry = self.get(id).await?;
        let settings = self.settings.current().await?;
        let breakdown = entry.cache_breakdown(&settings)?.clone();
        self.bookings.save(&entry).await?;
        Ok(breakdown)
    }

    pub async fn mark_paid(&self, id: &BookingId) -> Result<BookingLedgerEntry, BookingError> {
        let mut entry = self.get(id).await?;
        entry.mark_paid()?;
        self.bookings.save(&entry).await?;
        Ok(entry)
    }

    pub async fn update_status(
        &self,
        id: &BookingId,
        status: BookingStatus,
    ) -> Result<BookingLedgerEntry, BookingError> {
        let mut entry = self.get(id).await?;
        entry.update_booking_status(status)?;
        self.bookings.save(&entry).await?;
        Ok(entry)
    }

    /// Levies a penalty on the host, deducted from the booking's payout
    pub async fn record_penalty(
        &self,
        id: &BookingId,
        amount: Decimal,
        actor: &Actor,
    ) -> Result<BookingLedgerEntry, BookingError> {
        require_role(actor, Role::Admin, "record penalties")?;
        let mut entry = self.get(id).await?;
        entry.record_penalty(Money::new(amount, entry.currency()), actor)?;
        self.bookings.save(&entry).await?;
        Ok(entry)
    }

    /// Moves the booking's refund along its workflow
    #[instrument(skip(self, action), fields(booking = %id, action = action.name(), actor = %actor))]
    pub async fn apply_refund(
        &self,
        id: &BookingId,
        action: RefundAction,
        actor: &Actor,
    ) -> Result<BookingLedgerEntry, BookingError> {
        require_role(actor, Role::Finance, "act on refunds")?;
        let mut entry = self.get(id).await?;
        let before = entry.refund.status;

        entry.apply_refund_action(action, actor).inspect_err(|e| {
            warn!(error = %e, "Refund action rejected");
        })?;
        self.bookings.save(&entry).await?;

        info!(
            booking = %entry.reference,
            from = ?before,
            to = ?entry.refund.status,
            "Refund status changed"
        );
        Ok(entry)
    }
}

/// Dispute operations
#[derive(Clone)]
pub struct DisputeService {
    bookings: Arc<dyn BookingPort>,
    disputes: Arc<dyn DisputePort>,
}

impl DisputeService {
    pub fn new(bookings: Arc<dyn BookingPort>, disputes: Arc<dyn DisputePort>) -> Self {
        Self { bookings, disputes }
    }

    pub async fn get(&self, id: &DisputeId) -> Result<DisputeCase, BookingError> {
        self.disputes.get(id).await.map_err(|e| {
            if e.is_not_found() {
                BookingError::DisputeNotFound(id.to_string())
            } else {
                e.into()
            }
        })
    }

    /// Opens a dispute and flags the booking
    #[instrument(skip(self, reason), fields(booking = %booking_id, actor = %actor))]
    pub async fn open(
        &self,
        booking_id: &BookingId,
        raised_by: DisputeParty,
        reason: String,
        actor: &Actor,
    ) -> Result<DisputeCase, BookingError> {
        let mut booking = self
            .bookings
            .get_booking(booking_id)
            .await
            .map_err(booking_error(booking_id))?;

        if self.disputes.find_open_for_booking(booking_id).await?.is_some() {
            return Err(BookingError::DisputeAlreadyOpen(booking.reference));
        }

        let case = DisputeCase::open(*booking_id, raised_by, reason)?;
        self.disputes.insert(&case).await.map_err(|e| {
            if e.is_conflict() {
                BookingError::DisputeAlreadyOpen(booking.reference.clone())
            } else {
                e.into()
            }
        })?;

        booking.dispute_status = DisputeStatus::Pending;
        booking.touch();
        self.bookings.save(&booking).await?;

        info!(dispute = %case.id, raised_by = ?raised_by, "Dispute opened");
        Ok(case)
    }

    /// Resolves or rejects an open dispute
    ///
    /// A resolution with a refund amount requests and approves that refund on
    /// the booking. The booking is validated and saved before the case so a
    /// rejected refund leaves the dispute open.
    #[instrument(skip(self, action), fields(dispute = %id, actor = %actor))]
    pub async fn act(
        &self,
        id: &DisputeId,
        action: DisputeAction,
        actor: &Actor,
    ) -> Result<(DisputeCase, BookingLedgerEntry), BookingError> {
        require_role(actor, Role::Finance, "act on disputes")?;
        let mut case = self.get(id).await?;
        let mut booking = self
            .bookings
            .get_booking(&case.booking_id)
            .await
            .map_err(booking_error(&case.booking_id))?;

        match action {
            DisputeAction::Resolve { notes, refund_amount } => {
                let refund = match refund_amount {
                    Some(amount) => {
                        booking.request_refund(amount, Some(format!("dispute {}", case.id)), actor)?;
                        booking.approve_refund(None, notes.clone(), actor)?;
                        booking.refund.amount
                    }
                    None => None,
                };
                case.resolve(notes, refund, actor)?;
            }
            DisputeAction::Reject { notes } => case.reject(notes, actor)?,
        }

        booking.dispute_status = case.status;
        booking.touch();
        self.bookings.save(&booking).await?;
        self.disputes.save(&case).await?;

        info!(
            booking = %booking.reference,
            status = ?case.status,
            refund = ?case.refund_amount.map(|m| m.amount()),
            "Dispute closed"
        );
        Ok((case, booking))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::{MockBookingPort, MockDisputePort};
    use crate::refund::RefundStatus;
    use domain_rates::ports::mock::MockSettingsPort;
    use domain_rates::RateSettings;
    use rust_decimal_macros::dec;

    fn finance() -> Actor {
        Actor::new("fin-9", vec![Role::Finance])
    }

    async fn paid_booking(port: &MockBookingPort) -> BookingLedgerEntry {
        let mut entry = BookingLedgerEntry::new(
            HostId::new(),
            GuestId::new(),
            StayId::new(),
            BookingPricing::base_only(Money::inr(dec!(10000))),
        )
        .unwrap();
        entry.mark_paid().unwrap();
        port.insert(&entry).await.unwrap();
        entry
    }

    #[tokio::test]
    async fn test_breakdown_computed_when_not_cached() {
        let bookings = MockBookingPort::new();
        let entry = paid_booking(&bookings).await;
        let settings = SettingsService::new(Arc::new(
            MockSettingsPort::with_settings(RateSettings::default()).await,
        ));
        let service = BookingService::new(Arc::new(bookings), settings);

        let breakdown = service.breakdown(&entry.id).await.unwrap();
        assert_eq!(breakdown.net_payout.amount(), dec!(8882));
        assert!(service.get(&entry.id).await.unwrap().breakdown.is_none());

        assert!(matches!(
            service.refresh_breakdown(&entry.id, &finance()).await,
            Err(BookingError::Forbidden(_))
        ));
        let admin = Actor::new("adm-1", vec![Role::Admin]);
        service.refresh_breakdown(&entry.id, &admin).await.unwrap();
        assert!(service.get(&entry.id).await.unwrap().breakdown.is_some());
    }

    #[tokio::test]
    async fn test_breakdown_without_settings_fails() {
        let bookings = MockBookingPort::new();
        let entry = paid_booking(&bookings).await;
        let service = BookingService::new(
            Arc::new(bookings),
            SettingsService::new(Arc::new(MockSettingsPort::new())),
        );
        assert!(matches!(
            service.breakdown(&entry.id).await,
            Err(BookingError::Rate(domain_rates::RateError::SettingsNotConfigured))
        ));
    }

    #[tokio::test]
    async fn test_refund_on_missing_booking() {
        let service = BookingService::new(
            Arc::new(MockBookingPort::new()),
            SettingsService::new(Arc::new(MockSettingsPort::new())),
        );
        let result = service
            .apply_refund(&BookingId::new(), RefundAction::Process, &finance())
            .await;
        assert!(matches!(result, Err(BookingError::BookingNotFound(_))));
    }

    #[tokio::test]
    async fn test_dispute_resolution_drives_refund() {
        let bookings = MockBookingPort::new();
        let entry = paid_booking(&bookings).await;
        let service = DisputeService::new(Arc::new(bookings.clone()), Arc::new(MockDisputePort::new()));

        let case = service
            .open(&entry.id, DisputeParty::Guest, "room not as listed".into(), &finance())
            .await
            .unwrap();
        assert_eq!(
            bookings.get_booking(&entry.id).await.unwrap().dispute_status,
            DisputeStatus::Pending
        );

        let action = DisputeAction::parse("resolve", Some("partial".into()), Some(dec!(2500))).unwrap();
        let (case, booking) = service.act(&case.id, action, &finance()).await.unwrap();

        assert_eq!(case.status, DisputeStatus::Resolved);
        assert_eq!(booking.dispute_status, DisputeStatus::Resolved);
        assert_eq!(booking.refund.status, RefundStatus::Approved);
        assert_eq!(booking.refund.amount.unwrap().amount(), dec!(2500));
    }

    #[tokio::test]
    async fn test_second_open_dispute_rejected() {
        let bookings = MockBookingPort::new();
        let entry = paid_booking(&bookings).await;
        let service = DisputeService::new(Arc::new(bookings), Arc::new(MockDisputePort::new()));

        service
            .open(&entry.id, DisputeParty::Host, "guest damage".into(), &finance())
            .await
            .unwrap();
        let second = service
            .open(&entry.id, DisputeParty::Guest, "noise".into(), &finance())
            .await;
        assert!(matches!(second, Err(BookingError::DisputeAlreadyOpen(_))));
    }

    #[tokio::test]
    async fn test_oversized_dispute_refund_keeps_case_open() {
        let bookings = MockBookingPort::new();
        let entry = paid_booking(&bookings).await;
        let disputes = MockDisputePort::new();
        let service = DisputeService::new(Arc::new(bookings), Arc::new(disputes.clone()));

        let case = service
            .open(&entry.id, DisputeParty::Guest, "cancelled on arrival".into(), &finance())
            .await
            .unwrap();
        let action = DisputeAction::Resolve { notes: None, refund_amount: Some(dec!(20000)) };
        assert!(service.act(&case.id, action, &finance()).await.is_err());
        assert!(disputes.get(&case.id).await.unwrap().is_open());
    }
}
