//! Rate settings repository
//!
//! Every version is a row holding the full settings document as JSONB. The
//! current row is flagged `is_current`; a partial unique index guarantees
//! there is never more than one.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::error::DatabaseError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SettingsRow {
    pub version: i32,
    pub settings: Value,
    pub is_current: bool,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_current(&self) -> Result<Option<SettingsRow>, DatabaseError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT version, settings, is_current, updated_by, created_at
            FROM rate_settings
            WHERE is_current
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Inserts `version` as current, retiring the previous current row
    ///
    /// Runs in one transaction. The current row is locked and compared with
    /// `expected_current`; a mismatch aborts with `StaleUpdate`.
    pub async fn insert_version(
        &self,
        version: i32,
        settings: Value,
        updated_by: Option<&str>,
        expected_current: Option<i32>,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<i32> = sqlx::query_scalar(
            "SELECT version FROM rate_settings WHERE is_current FOR UPDATE",
        )
        .fetch_optional(&mut *tx)
        .await?;

        if current != expected_current {
            return Err(DatabaseError::StaleUpdate(format!(
                "current settings version is {:?}, expected {:?}",
                current, expected_current
            )));
        }

        sqlx::query("UPDATE rate_settings SET is_current = FALSE WHERE is_current")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO rate_settings (version, settings, is_current, updated_by)
            VALUES ($1, $2, TRUE, $3)
            "#,
        )
        .bind(version)
        .bind(settings)
        .bind(updated_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn list(&self, limit: i64) -> Result<Vec<SettingsRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT version, settings, is_current, updated_by, created_at
            FROM rate_settings
            ORDER BY version DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
