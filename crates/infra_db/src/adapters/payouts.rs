//! PostgreSQL payout adapter
//!
//! The destination is stored as JSONB next to a `payout_method` column so
//! reports can filter by method without parsing the document.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    AdjustmentId, BookingId, DomainPort, HealthCheckResult, HealthCheckable, HostId, PayoutId, PortError,
};
use domain_payout::{
    AmountsSnapshot, PayoutAdjustment, PayoutDestination, PayoutMethod, PayoutPort, PayoutRecord,
    PayoutStatus,
};

use crate::error::DatabaseError;
use crate::repositories::payouts::{self as db, AdjustmentRow, PayoutRepository, PayoutRow};

#[derive(Debug, Clone)]
pub struct PostgresPayoutAdapter {
    repository: PayoutRepository,
    pool: PgPool,
}

impl PostgresPayoutAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PayoutRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresPayoutAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPayoutAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-payout-adapter").await
    }
}

#[async_trait]
impl PayoutPort for PostgresPayoutAdapter {
    #[instrument(skip(self, booking_ids), fields(host = %host_id, candidates = booking_ids.len()))]
    async fn find_existing_payouts(
        &self,
        host_id: &HostId,
        booking_ids: &[BookingId],
    ) -> Result<HashSet<BookingId>, PortError> {
        let ids: Vec<Uuid> = booking_ids.iter().map(|id| *id.as_uuid()).collect();
        let existing = self.repository.existing_booking_ids(*host_id.as_uuid(), &ids).await?;
        debug!(existing = existing.len(), "Checked for existing payouts");
        Ok(existing.into_iter().map(BookingId::from).collect())
    }

    #[instrument(skip(self, record), fields(payout = %record.id, booking = %record.booking_id))]
    async fn insert(&self, record: &PayoutRecord) -> Result<(), PortError> {
        self.repository.insert(&payout_to_row(record)?).await?;
        Ok(())
    }

    async fn get(&self, id: &PayoutId) -> Result<PayoutRecord, PortError> {
        let row = self.repository.get(*id.as_uuid()).await.map_err(|e| {
            if e.is_not_found() {
                PortError::not_found("Payout", id)
            } else {
                e.into()
            }
        })?;
        row_to_payout(row)
    }

    #[instrument(skip(self, record), fields(payout = %record.id, to = ?record.status))]
    async fn update_status(
        &self,
        record: &PayoutRecord,
        expected_status: PayoutStatus,
    ) -> Result<(), PortError> {
        self.repository
            .update_status(&payout_to_row(record)?, status_to_db(expected_status))
            .await?;
        Ok(())
    }

    async fn list_for_host(
        &self,
        host_id: &HostId,
        status: Option<PayoutStatus>,
    ) -> Result<Vec<PayoutRecord>, PortError> {
        self.repository
            .list_for_host(*host_id.as_uuid(), status.map(status_to_db))
            .await?
            .into_iter()
            .map(row_to_payout)
            .collect()
    }

    async fn find_by_booking(&self, booking_id: &BookingId) -> Result<Option<PayoutRecord>, PortError> {
        self.repository
            .find_by_booking(*booking_id.as_uuid())
            .await?
            .map(row_to_payout)
            .transpose()
    }

    #[instrument(skip(self, adjustment), fields(payout = %adjustment.payout_id))]
    async fn insert_adjustment(&self, adjustment: &PayoutAdjustment) -> Result<(), PortError> {
        self.repository.insert_adjustment(&adjustment_to_row(adjustment)).await?;
        Ok(())
    }

    async fn find_adjustment(&self, payout_id: &PayoutId) -> Result<Option<PayoutAdjustment>, PortError> {
        self.repository
            .find_adjustment(*payout_id.as_uuid())
            .await?
            .map(row_to_adjustment)
            .transpose()
    }
}

fn version_to_db(version: u32) -> Result<i32, PortError> {
    i32::try_from(version).map_err(|_| PortError::validation(format!("settings version {} out of range", version)))
}

fn version_from_db(version: i32) -> Result<u32, PortError> {
    u32::try_from(version).map_err(|_| PortError::transformation(format!("negative settings version {}", version)))
}

fn payout_to_row(r: &PayoutRecord) -> Result<PayoutRow, PortError> {
    let a = &r.amounts;
    Ok(PayoutRow {
        payout_id: *r.id.as_uuid(),
        host_id: *r.host_id.as_uuid(),
        booking_id: *r.booking_id.as_uuid(),
        currency: a.net_payout.currency().code().to_string(),
        total_amount: a.total.amount(),
        commission_amount: a.commission.amount(),
        gst_amount: a.gst.amount(),
        tcs_amount: a.tcs.amount(),
        platform_fee_amount: a.platform_fee.amount(),
        penalty_amount: a.penalties.amount(),
        total_deductions: a.total_deductions.amount(),
        net_payout: a.net_payout.amount(),
        settings_version: version_to_db(a.settings_version)?,
        payout_method: method_to_db(r.destination.method()),
        destination: serde_json::to_value(&r.destination).map_err(DatabaseError::from)?,
        status: status_to_db(r.status),
        transaction_id: r.transaction_id.clone(),
        notes: r.notes.clone(),
        failure_reason: r.failure_reason.clone(),
        retry_count: i32::try_from(r.retry_count).unwrap_or(i32::MAX),
        last_retry_at: r.last_retry_at,
        processed_at: r.processed_at,
        created_by: r.created_by.clone(),
        updated_by: r.updated_by.clone(),
        created_at: r.created_at,
        updated_at: r.updated_at,
    })
}

fn row_to_payout(row: PayoutRow) -> Result<PayoutRecord, PortError> {
    let currency = super::currency(&row.currency)?;
    let money = |amount| super::money(amount, currency);

    let destination: PayoutDestination = serde_json::from_value(row.destination)
        .map_err(|e| PortError::transformation(format!("destination of payout {}: {}", row.payout_id, e)))?;
    if destination.method() != method_from_db(row.payout_method) {
        return Err(PortError::transformation(format!(
            "payout {} method column disagrees with its destination",
            row.payout_id
        )));
    }

    Ok(PayoutRecord {
        id: PayoutId::from(row.payout_id),
        host_id: HostId::from(row.host_id),
        booking_id: BookingId::from(row.booking_id),
        amounts: AmountsSnapshot {
            total: money(row.total_amount),
            commission: money(row.commission_amount),
            gst: money(row.gst_amount),
            tcs: money(row.tcs_amount),
            platform_fee: money(row.platform_fee_amount),
            penalties: money(row.penalty_amount),
            total_deductions: money(row.total_deductions),
            net_payout: money(row.net_payout),
            settings_version: version_from_db(row.settings_version)?,
        },
        destination,
        status: status_from_db(row.status),
        transaction_id: row.transaction_id,
        notes: row.notes,
        failure_reason: row.failure_reason,
        retry_count: u32::try_from(row.retry_count).unwrap_or_default(),
        last_retry_at: row.last_retry_at,
        processed_at: row.processed_at,
        created_by: row.created_by,
        updated_by: row.updated_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn adjustment_to_row(a: &PayoutAdjustment) -> AdjustmentRow {
    AdjustmentRow {
        adjustment_id: *a.id.as_uuid(),
        payout_id: *a.payout_id.as_uuid(),
        booking_id: *a.booking_id.as_uuid(),
        host_id: *a.host_id.as_uuid(),
        currency: a.amount.currency().code().to_string(),
        amount: a.amount.amount(),
        revised_net_payout: a.revised_net_payout.amount(),
        settings_version: i32::try_from(a.settings_version).unwrap_or(i32::MAX),
        reason: a.reason.clone(),
        created_by: a.created_by.clone(),
        created_at: a.created_at,
    }
}

fn row_to_adjustment(row: AdjustmentRow) -> Result<PayoutAdjustment, PortError> {
    let currency = super::currency(&row.currency)?;
    Ok(PayoutAdjustment {
        id: AdjustmentId::from(row.adjustment_id),
        payout_id: PayoutId::from(row.payout_id),
        booking_id: BookingId::from(row.booking_id),
        host_id: HostId::from(row.host_id),
        amount: super::money(row.amount, currency),
        reason: row.reason,
        revised_net_payout: super::money(row.revised_net_payout, currency),
        settings_version: version_from_db(row.settings_version)?,
        created_by: row.created_by,
        created_at: row.created_at,
    })
}

fn status_to_db(status: PayoutStatus) -> db::PayoutStatus {
    match status {
        PayoutStatus::Pending => db::PayoutStatus::Pending,
        PayoutStatus::Processing => db::PayoutStatus::Processing,
        PayoutStatus::Completed => db::PayoutStatus::Completed,
        PayoutStatus::Failed => db::PayoutStatus::Failed,
        PayoutStatus::Cancelled => db::PayoutStatus::Cancelled,
    }
}

fn status_from_db(status: db::PayoutStatus) -> PayoutStatus {
    match status {
        db::PayoutStatus::Pending => PayoutStatus::Pending,
        db::PayoutStatus::Processing => PayoutStatus::Processing,
        db::PayoutStatus::Completed => PayoutStatus::Completed,
        db::PayoutStatus::Failed => PayoutStatus::Failed,
        db::PayoutStatus::Cancelled => PayoutStatus::Cancelled,
    }
}

pub(crate) fn method_to_db(method: PayoutMethod) -> db::PayoutMethod {
    match method {
        PayoutMethod::BankTransfer => db::PayoutMethod::BankTransfer,
        PayoutMethod::Upi => db::PayoutMethod::Upi,
        PayoutMethod::Wallet => db::PayoutMethod::Wallet,
    }
}

pub(crate) fn method_from_db(method: db::PayoutMethod) -> PayoutMethod {
    match method {
        db::PayoutMethod::BankTransfer => PayoutMethod::BankTransfer,
        db::PayoutMethod::Upi => PayoutMethod::Upi,
        db::PayoutMethod::Wallet => PayoutMethod::Wallet,
    }
}
