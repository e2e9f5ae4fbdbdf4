//! Booking and dispute store ports

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{
    BookingId, DisputeId, DomainPort, HealthCheckable, HostId, PortError, SettlementPeriod,
};

use crate::booking::{BookingLedgerEntry, BookingStatus, PaymentStatus};
use crate::dispute::DisputeCase;

/// Which bookings a payout run picks up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutEligibility {
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    /// Bookings created within this period, bounds inclusive
    pub period: SettlementPeriod,
}

impl PayoutEligibility {
    /// Completed and paid bookings created in `period`
    pub fn settled_in(period: SettlementPeriod) -> Self {
        Self {
            booking_status: BookingStatus::Completed,
            payment_status: PaymentStatus::Paid,
            period,
        }
    }

    pub fn matches(&self, booking: &BookingLedgerEntry) -> bool {
        booking.booking_status == self.booking_status
            && booking.payment_status == self.payment_status
            && self.period.contains(booking.created_at)
    }
}

#[async_trait]
pub trait BookingPort: DomainPort + HealthCheckable {
    /// Bookings of `host_id` matching `criteria`, oldest first
    async fn find_bookings_for_payout(
        &self,
        host_id: &HostId,
        criteria: &PayoutEligibility,
    ) -> Result<Vec<BookingLedgerEntry>, PortError>;

    async fn get_booking(&self, id: &BookingId) -> Result<BookingLedgerEntry, PortError>;

    async fn find_by_reference(&self, reference: &str) -> Result<Option<BookingLedgerEntry>, PortError>;

    async fn insert(&self, booking: &BookingLedgerEntry) -> Result<(), PortError>;

    /// Overwrites the stored entry
    async fn save(&self, booking: &BookingLedgerEntry) -> Result<(), PortError>;
}

#[async_trait]
pub trait DisputePort: DomainPort + HealthCheckable {
    /// Stores a new case; fails with `Conflict` if the booking already has an open one
    async fn insert(&self, dispute: &DisputeCase) -> Result<(), PortError>;

    async fn get(&self, id: &DisputeId) -> Result<DisputeCase, PortError>;

    async fn find_open_for_booking(&self, booking_id: &BookingId) -> Result<Option<DisputeCase>, PortError>;

    async fn save(&self, dispute: &DisputeCase) -> Result<(), PortError>;
}

/// In-memory stores for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use core_kernel::HealthCheckResult;

    #[derive(Debug, Default, Clone)]
    pub struct MockBookingPort {
        bookings: Arc<RwLock<HashMap<BookingId, BookingLedgerEntry>>>,
    }

    impl MockBookingPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_bookings(bookings: impl IntoIterator<Item = BookingLedgerEntry>) -> Self {
            let port = Self::new();
            {
                let mut store = port.bookings.write().await;
                for booking in bookings {
                    store.insert(booking.id, booking);
                }
            }
            port
        }
    }

    impl DomainPort for MockBookingPort {}

    #[async_trait]
    impl HealthCheckable for MockBookingPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-booking-port")
        }
    }

    #[async_trait]
    impl BookingPort for MockBookingPort {
        async fn find_bookings_for_payout(
            &self,
            host_id: &HostId,
            criteria: &PayoutEligibility,
        ) -> Result<Vec<BookingLedgerEntry>, PortError> {
            let mut found: Vec<_> = self
                .bookings
                .read()
                .await
                .values()
                .filter(|b| b.host_id == *host_id && criteria.matches(b))
                .cloned()
                .collect();
            found.sort_by_key(|b| b.created_at);
            Ok(found)
        }

        async fn get_booking(&self, id: &BookingId) -> Result<BookingLedgerEntry, PortError> {
            self.bookings
                .read()
                .await
                .get(id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Booking", id))
        }

        async fn find_by_reference(&self, reference: &str) -> Result<Option<BookingLedgerEntry>, PortError> {
            Ok(self
                .bookings
                .read()
                .await
                .values()
                .find(|b| b.reference == reference)
                .cloned())
        }

        async fn insert(&self, booking: &BookingLedgerEntry) -> Result<(), PortError> {
            let mut store = self.bookings.write().await;
            if store.contains_key(&booking.id) || store.values().any(|b| b.reference == booking.reference) {
                return Err(PortError::conflict(format!("booking {} already exists", booking.reference)));
            }
            store.insert(booking.id, booking.clone());
            Ok(())
        }

        async fn save(&self, booking: &BookingLedgerEntry) -> Result<(), PortError> {
            let mut store = self.bookings.write().await;
            match store.get_mut(&booking.id) {
                Some(existing) => {
                    *existing = booking.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("Booking", booking.id)),
            }
        }
    }

    #[derive(Debug, Default, Clone)]
    pub struct MockDisputePort {
        disputes: Arc<RwLock<HashMap<DisputeId, DisputeCase>>>,
    }

    impl MockDisputePort {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockDisputePort {}

    #[async_trait]
    impl HealthCheckable for MockDisputePort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-dispute-port")
        }
    }

    #[async_trait]
    impl DisputePort for MockDisputePort {
        async fn insert(&self, dispute: &DisputeCase) -> Result<(), PortError> {
            let mut store = self.disputes.write().await;
            if store
                .values()
                .any(|d| d.booking_id == dispute.booking_id && d.is_open())
            {
                return Err(PortError::conflict(format!(
                    "booking {} already has an open dispute",
                    dispute.booking_id
                )));
            }
            store.insert(dispute.id, dispute.clone());
            Ok(())
        }

        async fn get(&self, id: &DisputeId) -> Result<DisputeCase, PortError> {
            self.disputes
                .read()
                .await
                .get(id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Dispute", id))
        }

        async fn find_open_for_booking(&self, booking_id: &BookingId) -> Result<Option<DisputeCase>, PortError> {
            Ok(self
                .disputes
                .read()
                .await
                .values()
                .find(|d| d.booking_id == *booking_id && d.is_open())
                .cloned())
        }

        async fn save(&self, dispute: &DisputeCase) -> Result<(), PortError> {
            let mut store = self.disputes.write().await;
            match store.get_mut(&dispute.id) {
                Some(existing) => {
                    *existing = dispute.clone();
                    Ok(())
                }
                None => Err(PortError::not_found("Dispute", dispute.id)),
            }
        }
    }
}
