//! Payout and host profile store ports

use std::collections::HashSet;

use async_trait::async_trait;

use core_kernel::{BookingId, DomainPort, HealthCheckable, HostId, PayoutId, PortError};

use crate::payout::{HostPayoutProfile, PayoutRecord, PayoutStatus};
use crate::reconciliation::PayoutAdjustment;

#[async_trait]
pub trait PayoutPort: DomainPort + HealthCheckable {
    /// Booking ids among `booking_ids` that already have a payout for `host_id`
    async fn find_existing_payouts(
        &self,
        host_id: &HostId,
        booking_ids: &[BookingId],
    ) -> Result<HashSet<BookingId>, PortError>;

    /// Stores a new payout; a second payout for the same (host, booking) is a `Conflict`
    async fn insert(&self, record: &PayoutRecord) -> Result<(), PortError>;

    async fn get(&self, id: &PayoutId) -> Result<PayoutRecord, PortError>;

    /// Writes `record` only if the stored status is still `expected_status`
    ///
    /// Fails with `Conflict` otherwise, leaving the stored record unchanged.
    async fn update_status(
        &self,
        record: &PayoutRecord,
        expected_status: PayoutStatus,
    ) -> Result<(), PortError>;

    /// Payouts of a host, newest first
    async fn list_for_host(
        &self,
        host_id: &HostId,
        status: Option<PayoutStatus>,
    ) -> Result<Vec<PayoutRecord>, PortError>;

    async fn find_by_booking(&self, booking_id: &BookingId) -> Result<Option<PayoutRecord>, PortError>;

    /// Stores an adjustment; a second adjustment for the same payout is a `Conflict`
    async fn insert_adjustment(&self, adjustment: &PayoutAdjustment) -> Result<(), PortError>;

    async fn find_adjustment(&self, payout_id: &PayoutId) -> Result<Option<PayoutAdjustment>, PortError>;
}

#[async_trait]
pub trait HostProfilePort: DomainPort + HealthCheckable {
    /// Payout preferences of the host, `None` if the host never set any
    async fn get_payout_profile(&self, host_id: &HostId) -> Result<Option<HostPayoutProfile>, PortError>;
}

/// In-memory stores for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use core_kernel::HealthCheckResult;

    #[derive(Debug, Default)]
    struct PayoutStore {
        payouts: HashMap<PayoutId, PayoutRecord>,
        adjustments: HashMap<PayoutId, PayoutAdjustment>,
    }

    #[derive(Debug, Default, Clone)]
    pub struct MockPayoutPort {
        store: Arc<RwLock<PayoutStore>>,
    }

    impl MockPayoutPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn count(&self) -> usize {
            self.store.read().await.payouts.len()
        }
    }

    impl DomainPort for MockPayoutPort {}

    #[async_trait]
    impl HealthCheckable for MockPayoutPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-payout-port")
        }
    }

    #[async_trait]
    impl PayoutPort for MockPayoutPort {
        async fn find_existing_payouts(
            &self,
            host_id: &HostId,
            booking_ids: &[BookingId],
        ) -> Result<HashSet<BookingId>, PortError> {
            let store = self.store.read().await;
            Ok(store
                .payouts
                .values()
                .filter(|p| p.host_id == *host_id && booking_ids.contains(&p.booking_id))
                .map(|p| p.booking_id)
                .collect())
        }

        async fn insert(&self, record: &PayoutRecord) -> Result<(), PortError> {
            let mut store = self.store.write().await;
            if store
                .payouts
                .values()
                .any(|p| p.host_id == record.host_id && p.booking_id == record.booking_id)
            {
                return Err(PortError::conflict(format!(
                    "payout for booking {} already exists",
                    record.booking_id
                )));
            }
            store.payouts.insert(record.id, record.clone());
            Ok(())
        }

        async fn get(&self, id: &PayoutId) -> Result<PayoutRecord, PortError> {
            self.store
                .read()
                .await
                .payouts
                .get(id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Payout", id))
        }

        async fn update_status(
            &self,
            record: &PayoutRecord,
            expected_status: PayoutStatus,
        ) -> Result<(), PortError> {
            let mut store = self.store.write().await;
            let stored = store
                .payouts
                .get_mut(&record.id)
                .ok_or_else(|| PortError::not_found("Payout", record.id))?;
            if stored.status != expected_status {
                return Err(PortError::conflict(format!(
                    "payout {} is {:?}, expected {:?}",
                    record.id, stored.status, expected_status
                )));
            }
            *stored = record.clone();
            Ok(())
        }

        async fn list_for_host(
            &self,
            host_id: &HostId,
            status: Option<PayoutStatus>,
        ) -> Result<Vec<PayoutRecord>, PortError> {
            let mut found: Vec<_> = self
                .store
                .read()
                .await
                .payouts
                .values()
                .filter(|p| p.host_id == *host_id && status.map_or(true, |s| p.status == s))
                .cloned()
                .collect();
            found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(found)
        }

        async fn find_by_booking(&self, booking_id: &BookingId) -> Result<Option<PayoutRecord>, PortError> {
            Ok(self
                .store
                .read()
                .await
                .payouts
                .values()
                .find(|p| p.booking_id == *booking_id)
                .cloned())
        }

        async fn insert_adjustment(&self, adjustment: &PayoutAdjustment) -> Result<(), PortError> {
            let mut store = self.store.write().await;
            if store.adjustments.contains_key(&adjustment.payout_id) {
                return Err(PortError::conflict(format!(
                    "payout {} already has an adjustment",
                    adjustment.payout_id
                )));
            }
            store.adjustments.insert(adjustment.payout_id, adjustment.clone());
            Ok(())
        }

        async fn find_adjustment(&self, payout_id: &PayoutId) -> Result<Option<PayoutAdjustment>, PortError> {
            Ok(self.store.read().await.adjustments.get(payout_id).cloned())
        }
    }

    #[derive(Debug, Default, Clone)]
    pub struct MockHostProfilePort {
        profiles: Arc<RwLock<HashMap<HostId, HostPayoutProfile>>>,
    }

    impl MockHostProfilePort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_profile(profile: HostPayoutProfile) -> Self {
            let port = Self::new();
            port.profiles.write().await.insert(profile.host_id, profile);
            port
        }
    }

    impl DomainPort for MockHostProfilePort {}

    #[async_trait]
    impl HealthCheckable for MockHostProfilePort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-host-profile-port")
        }
    }

    #[async_trait]
    impl HostProfilePort for MockHostProfilePort {
        async fn get_payout_profile(&self, host_id: &HostId) -> Result<Option<HostPayoutProfile>, PortError> {
            Ok(self.profiles.read().await.get(host_id).cloned())
        }
    }
}
