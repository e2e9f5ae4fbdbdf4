//! Host payout profile repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::payouts::PayoutMethod;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HostProfileRow {
    pub host_id: Uuid,
    pub preferred_method: Option<PayoutMethod>,
    pub bank_account_number: Option<String>,
    pub bank_ifsc: Option<String>,
    pub bank_account_holder: Option<String>,
    pub upi_id: Option<String>,
    pub wallet_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct HostProfileRepository {
    pool: PgPool,
}

impl HostProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, host_id: Uuid) -> Result<Option<HostProfileRow>, DatabaseError> {
        let row = sqlx::query_as::<_, HostProfileRow>(
            r#"
            SELECT host_id, preferred_method, bank_account_number, bank_ifsc,
                   bank_account_holder, upi_id, wallet_id, updated_at
            FROM host_payout_profiles
            WHERE host_id = $1
            "#,
        )
        .bind(host_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Inserts or replaces the host's payout preferences
    pub async fn upsert(&self, row: &HostProfileRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO host_payout_profiles (
                host_id, preferred_method, bank_account_number, bank_ifsc,
                bank_account_holder, upi_id, wallet_id, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (host_id) DO UPDATE SET
                preferred_method = EXCLUDED.preferred_method,
                bank_account_number = EXCLUDED.bank_account_number,
                bank_ifsc = EXCLUDED.bank_ifsc,
                bank_account_holder = EXCLUDED.bank_account_holder,
                upi_id = EXCLUDED.upi_id,
                wallet_id = EXCLUDED.wallet_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(row.host_id)
        .bind(row.preferred_method)
        .bind(&row.bank_account_number)
        .bind(&row.bank_ifsc)
        .bind(&row.bank_account_holder)
        .bind(&row.upi_id)
        .bind(&row.wallet_id)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
