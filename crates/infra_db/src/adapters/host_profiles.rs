//! PostgreSQL host payout profile adapter

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, HostId, PortError};
use domain_payout::{BankAccount, HostPayoutProfile, HostProfilePort};

use crate::repositories::host_profiles::{HostProfileRepository, HostProfileRow};

use super::payouts::{method_from_db, method_to_db};

#[derive(Debug, Clone)]
pub struct PostgresHostProfileAdapter {
    repository: HostProfileRepository,
    pool: PgPool,
}

impl PostgresHostProfileAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: HostProfileRepository::new(pool.clone()),
            pool,
        }
    }

    /// Stores the host's payout preferences, replacing any previous ones
    #[instrument(skip(self, profile), fields(host = %profile.host_id))]
    pub async fn save_payout_profile(&self, profile: &HostPayoutProfile) -> Result<(), PortError> {
        self.repository.upsert(&profile_to_row(profile)).await?;
        Ok(())
    }
}

impl DomainPort for PostgresHostProfileAdapter {}

#[async_trait]
impl HealthCheckable for PostgresHostProfileAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-host-profile-adapter").await
    }
}

#[async_trait]
impl HostProfilePort for PostgresHostProfileAdapter {
    #[instrument(skip(self), fields(host = %host_id))]
    async fn get_payout_profile(&self, host_id: &HostId) -> Result<Option<HostPayoutProfile>, PortError> {
        Ok(self.repository.get(*host_id.as_uuid()).await?.map(row_to_profile))
    }
}

fn profile_to_row(p: &HostPayoutProfile) -> HostProfileRow {
    HostProfileRow {
        host_id: *p.host_id.as_uuid(),
        preferred_method: p.preferred_method.map(method_to_db),
        bank_account_number: p.bank_account.as_ref().map(|b| b.account_number.clone()),
        bank_ifsc: p.bank_account.as_ref().map(|b| b.ifsc.clone()),
        bank_account_holder: p.bank_account.as_ref().map(|b| b.account_holder.clone()),
        upi_id: p.upi_id.clone(),
        wallet_id: p.wallet_id.clone(),
        updated_at: Utc::now(),
    }
}

/// A bank account is only present when all three columns are set
fn row_to_profile(row: HostProfileRow) -> HostPayoutProfile {
    let bank_account = match (row.bank_account_number, row.bank_ifsc, row.bank_account_holder) {
        (Some(account_number), Some(ifsc), Some(account_holder)) => Some(BankAccount {
            account_number,
            ifsc,
            account_holder,
        }),
        _ => None,
    };
    HostPayoutProfile {
        host_id: HostId::from(row.host_id),
        preferred_method: row.preferred_method.map(method_from_db),
        bank_account,
        upi_id: row.upi_id,
        wallet_id: row.wallet_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_payout::{PayoutDestination, PayoutMethod};

    #[test]
    fn test_partial_bank_details_are_dropped() {
        let row = HostProfileRow {
            host_id: uuid::Uuid::new_v4(),
            preferred_method: Some(method_to_db(PayoutMethod::BankTransfer)),
            bank_account_number: Some("1234567890".into()),
            bank_ifsc: None,
            bank_account_holder: Some("R. Iyer".into()),
            upi_id: None,
            wallet_id: None,
            updated_at: Utc::now(),
        };
        let profile = row_to_profile(row);
        assert!(profile.bank_account.is_none());
        assert!(profile.resolve_destination().is_err());
    }

    #[test]
    fn test_upi_profile_resolves_after_round_trip() {
        let profile = HostPayoutProfile {
            host_id: HostId::new(),
            preferred_method: Some(PayoutMethod::Upi),
            bank_account: None,
            upi_id: Some("host@okaxis".into()),
            wallet_id: None,
        };
        let back = row_to_profile(profile_to_row(&profile));
        assert_eq!(back, profile);
        assert!(matches!(back.resolve_destination(), Ok(PayoutDestination::Upi { .. })));
    }
}
