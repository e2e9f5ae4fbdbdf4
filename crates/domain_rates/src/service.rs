//! Settings service
//!
//! Owns the settings lifecycle: a single bootstrap step seeds defaults when
//! the store is empty, reads fail loudly with `SettingsNotConfigured` instead
//! of inventing rates, and updates are merged, validated and versioned.

use std::sync::Arc;

use tracing::{info, warn};

use core_kernel::{Actor, Money, Role};
use crate::calculator::{self, Breakdown};
use crate::error::RateError;
use crate::ports::SettingsPort;
use crate::settings::RateSettings;
use crate::update::RateSettingsUpdate;

#[derive(Clone)]
pub struct SettingsService {
    port: Arc<dyn SettingsPort>,
}

impl SettingsService {
    pub fn new(port: Arc<dyn SettingsPort>) -> Self {
        Self { port }
    }

    /// Seeds the default settings if none exist and returns the current record
    ///
    /// Run once at startup. Concurrent bootstraps are harmless: the loser sees
    /// a version conflict and reads the winner's record.
    pub async fn ensure_default(&self, actor: &Actor) -> Result<RateSettings, RateError> {
        if let Some(current) = self.port.get_current_settings().await? {
            return Ok(current);
        }

        let seeded = RateSettings::bootstrap(actor.id.clone());
        match self.port.save_new_version(&seeded, None).await {
            Ok(()) => {
                info!(actor = %actor, version = seeded.version, "Seeded default rate settings");
                Ok(seeded)
            }
            Err(e) if e.is_conflict() => self.current().await,
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the current settings
    pub async fn current(&self) -> Result<RateSettings, RateError> {
        self.port
            .get_current_settings()
            .await?
            .ok_or(RateError::SettingsNotConfigured)
    }

    /// Applies a partial update as a new version
    ///
    /// # Errors
    ///
    /// * `Forbidden` unless the actor is an admin
    /// * `InvalidRateValue` / `InvalidAmount` when the merged settings are out of bounds
    /// * `VersionConflict` when another update landed first
    pub async fn update(
        &self,
        update: &RateSettingsUpdate,
        actor: &Actor,
    ) -> Result<RateSettings, RateError> {
        if !actor.has_role(Role::Admin) {
            return Err(RateError::Forbidden(format!(
                "{} may not change rate settings",
                actor
            )));
        }

        let current = self.current().await?;
        if update.is_empty() {
            return Ok(current);
        }

        let next = update.apply_to(&current, actor).inspect_err(|e| {
            warn!(actor = %actor, error = %e, "Rejected rate settings update");
        })?;

        self.port
            .save_new_version(&next, Some(current.version))
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    RateError::VersionConflict { expected: current.version }
                } else {
                    e.into()
                }
            })?;

        info!(
            actor = %actor,
            from_version = current.version,
            to_version = next.version,
            "Rate settings updated"
        );
        Ok(next)
    }

    /// Lists settings versions, newest first
    pub async fn history(&self, limit: u32) -> Result<Vec<RateSettings>, RateError> {
        Ok(self.port.list_versions(limit).await?)
    }

    /// Prices a prospective booking against the current settings
    pub async fn preview(
        &self,
        base_amount: Money,
        cleaning_fee: Money,
        extra_guest_charge: Money,
    ) -> Result<Breakdown, RateError> {
        let settings = self.current().await?;
        calculator::compute_breakdown(base_amount, cleaning_fee, extra_guest_charge, &settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MockSettingsPort;
    use rust_decimal_macros::dec;

    fn admin() -> Actor {
        Actor::new("admin-1", vec![Role::Admin])
    }

    #[tokio::test]
    async fn test_current_without_bootstrap_fails() {
        let service = SettingsService::new(Arc::new(MockSettingsPort::new()));
        assert!(matches!(service.current().await, Err(RateError::SettingsNotConfigured)));
    }

    #[tokio::test]
    async fn test_ensure_default_is_idempotent() {
        let service = SettingsService::new(Arc::new(MockSettingsPort::new()));
        let first = service.ensure_default(&Actor::system("bootstrap")).await.unwrap();
        let second = service.ensure_default(&Actor::system("bootstrap")).await.unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 1);
        assert_eq!(service.history(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_creates_new_version() {
        let service = SettingsService::new(Arc::new(MockSettingsPort::new()));
        service.ensure_default(&Actor::system("bootstrap")).await.unwrap();

        let update = RateSettingsUpdate {
            commission_rate: Some(dec!(12)),
            ..Default::default()
        };
        let next = service.update(&update, &admin()).await.unwrap();
        assert_eq!(next.version, 2);

        let history = service.history(10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].version, 2);
        assert_eq!(history[1].commission_rate.as_percentage(), dec!(10));
    }

    #[tokio::test]
    async fn test_invalid_update_leaves_current_untouched() {
        let service = SettingsService::new(Arc::new(MockSettingsPort::new()));
        service.ensure_default(&Actor::system("bootstrap")).await.unwrap();

        let update = RateSettingsUpdate {
            gst_rate: Some(dec!(31)),
            ..Default::default()
        };
        assert!(service.update(&update, &admin()).await.is_err());
        assert_eq!(service.current().await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_finance_role_cannot_update() {
        let service = SettingsService::new(Arc::new(MockSettingsPort::new()));
        service.ensure_default(&Actor::system("bootstrap")).await.unwrap();

        let finance = Actor::new("fin-1", vec![Role::Finance]);
        let update = RateSettingsUpdate {
            tcs_enabled: Some(false),
            ..Default::default()
        };
        assert!(matches!(service.update(&update, &finance).await, Err(RateError::Forbidden(_))));
    }
}
