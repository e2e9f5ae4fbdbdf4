//! PostgreSQL settings adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_rates::{RateSettings, SettingsPort};

use crate::error::DatabaseError;
use crate::repositories::settings::{SettingsRepository, SettingsRow};

#[derive(Debug, Clone)]
pub struct PostgresSettingsAdapter {
    repository: SettingsRepository,
    pool: PgPool,
}

impl PostgresSettingsAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: SettingsRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresSettingsAdapter {}

#[async_trait]
impl HealthCheckable for PostgresSettingsAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-settings-adapter").await
    }
}

fn row_to_settings(row: SettingsRow) -> Result<RateSettings, PortError> {
    let mut settings: RateSettings = serde_json::from_value(row.settings)
        .map_err(|e| PortError::transformation(format!("settings v{}: {}", row.version, e)))?;
    // Column values are authoritative over the document copy
    settings.version = row.version as u32;
    settings.updated_by = row.updated_by;
    settings.updated_at = row.created_at;
    Ok(settings)
}

#[async_trait]
impl SettingsPort for PostgresSettingsAdapter {
    #[instrument(skip(self))]
    async fn get_current_settings(&self) -> Result<Option<RateSettings>, PortError> {
        self.repository
            .get_current()
            .await?
            .map(row_to_settings)
            .transpose()
    }

    #[instrument(skip(self, settings), fields(version = settings.version))]
    async fn save_new_version(
        &self,
        settings: &RateSettings,
        expected_current: Option<u32>,
    ) -> Result<(), PortError> {
        debug!(?expected_current, "Saving settings version");
        let document = serde_json::to_value(settings).map_err(DatabaseError::from)?;
        self.repository
            .insert_version(
                settings.version as i32,
                document,
                settings.updated_by.as_deref(),
                expected_current.map(|v| v as i32),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_versions(&self, limit: u32) -> Result<Vec<RateSettings>, PortError> {
        self.repository
            .list(i64::from(limit))
            .await?
            .into_iter()
            .map(row_to_settings)
            .collect()
    }
}
