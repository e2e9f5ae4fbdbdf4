//! Settings store port
//!
//! The calculator never touches storage. Services read the current settings
//! through `SettingsPort` and persist new versions through it; the PostgreSQL
//! adapter lives in `infra_db`, the in-memory one below.

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError};
use crate::settings::RateSettings;

#[async_trait]
pub trait SettingsPort: DomainPort + HealthCheckable {
    /// Returns the current settings, or `None` before bootstrap
    async fn get_current_settings(&self) -> Result<Option<RateSettings>, PortError>;

    /// Stores `settings` as the new current version
    ///
    /// `expected_current` is the version the caller merged over (`None` when
    /// seeding). If the stored current version differs the call fails with
    /// `PortError::Conflict` and nothing is written.
    async fn save_new_version(
        &self,
        settings: &RateSettings,
        expected_current: Option<u32>,
    ) -> Result<(), PortError>;

    /// Lists stored versions, newest first
    async fn list_versions(&self, limit: u32) -> Result<Vec<RateSettings>, PortError>;
}

/// In-memory settings store for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use core_kernel::HealthCheckResult;

    #[derive(Debug, Default, Clone)]
    pub struct MockSettingsPort {
        versions: Arc<RwLock<Vec<RateSettings>>>,
    }

    impl MockSettingsPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with a current settings record
        pub async fn with_settings(settings: RateSettings) -> Self {
            let port = Self::new();
            port.versions.write().await.push(settings);
            port
        }
    }

    impl DomainPort for MockSettingsPort {}

    #[async_trait]
    impl HealthCheckable for MockSettingsPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-settings-port")
        }
    }

    #[async_trait]
    impl SettingsPort for MockSettingsPort {
        async fn get_current_settings(&self) -> Result<Option<RateSettings>, PortError> {
            Ok(self.versions.read().await.last().cloned())
        }

        async fn save_new_version(
            &self,
            settings: &RateSettings,
            expected_current: Option<u32>,
        ) -> Result<(), PortError> {
            let mut versions = self.versions.write().await;
            let current = versions.last().map(|s| s.version);
            if current != expected_current {
                return Err(PortError::conflict(format!(
                    "settings version is {:?}, expected {:?}",
                    current, expected_current
                )));
            }
            versions.push(settings.clone());
            Ok(())
        }

        async fn list_versions(&self, limit: u32) -> Result<Vec<RateSettings>, PortError> {
            Ok(self
                .versions
                .read()
                .await
                .iter()
                .rev()
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }
}
