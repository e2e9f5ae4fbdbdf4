//! PostgreSQL dispute adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{BookingId, DisputeId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_booking::{DisputeCase, DisputeParty, DisputePort};

use crate::error::DatabaseError;
use crate::repositories::disputes::{self as db, DisputeRepository, DisputeRow};

use super::bookings::{dispute_status_from_db, dispute_status_to_db};

#[derive(Debug, Clone)]
pub struct PostgresDisputeAdapter {
    repository: DisputeRepository,
    pool: PgPool,
}

impl PostgresDisputeAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: DisputeRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresDisputeAdapter {}

#[async_trait]
impl HealthCheckable for PostgresDisputeAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-dispute-adapter").await
    }
}

#[async_trait]
impl DisputePort for PostgresDisputeAdapter {
    #[instrument(skip(self, dispute), fields(dispute = %dispute.id, booking = %dispute.booking_id))]
    async fn insert(&self, dispute: &DisputeCase) -> Result<(), PortError> {
        self.repository.insert(&dispute_to_row(dispute)).await.map_err(|e| {
            if matches!(e, DatabaseError::DuplicateEntry(_)) {
                PortError::conflict(format!(
                    "booking {} already has an open dispute",
                    dispute.booking_id
                ))
            } else {
                e.into()
            }
        })
    }

    async fn get(&self, id: &DisputeId) -> Result<DisputeCase, PortError> {
        let row = self.repository.get(*id.as_uuid()).await.map_err(|e| {
            if e.is_not_found() {
                PortError::not_found("Dispute", id)
            } else {
                e.into()
            }
        })?;
        row_to_dispute(row)
    }

    async fn find_open_for_booking(&self, booking_id: &BookingId) -> Result<Option<DisputeCase>, PortError> {
        self.repository
            .find_open(*booking_id.as_uuid())
            .await?
            .map(row_to_dispute)
            .transpose()
    }

    #[instrument(skip(self, dispute), fields(dispute = %dispute.id))]
    async fn save(&self, dispute: &DisputeCase) -> Result<(), PortError> {
        self.repository.update(&dispute_to_row(dispute)).await?;
        Ok(())
    }
}

fn dispute_to_row(d: &DisputeCase) -> DisputeRow {
    DisputeRow {
        dispute_id: *d.id.as_uuid(),
        booking_id: *d.booking_id.as_uuid(),
        raised_by: match d.raised_by {
            DisputeParty::Guest => db::DisputeParty::Guest,
            DisputeParty::Host => db::DisputeParty::Host,
        },
        reason: d.reason.clone(),
        status: dispute_status_to_db(d.status),
        resolution_notes: d.resolution_notes.clone(),
        refund_amount: d.refund_amount.map(|m| m.amount()),
        refund_currency: d.refund_amount.map(|m| m.currency().code().to_string()),
        resolved_by: d.resolved_by.clone(),
        resolved_at: d.resolved_at,
        created_at: d.created_at,
    }
}

fn row_to_dispute(row: DisputeRow) -> Result<DisputeCase, PortError> {
    let refund_amount = match (row.refund_amount, row.refund_currency.as_deref()) {
        (Some(amount), Some(code)) => Some(super::money(amount, super::currency(code)?)),
        (None, _) => None,
        (Some(_), None) => {
            return Err(PortError::transformation(format!(
                "dispute {} has a refund amount without a currency",
                row.dispute_id
            )))
        }
    };

    Ok(DisputeCase {
        id: DisputeId::from(row.dispute_id),
        booking_id: BookingId::from(row.booking_id),
        raised_by: match row.raised_by {
            db::DisputeParty::Guest => DisputeParty::Guest,
            db::DisputeParty::Host => DisputeParty::Host,
        },
        reason: row.reason,
        status: dispute_status_from_db(row.status),
        resolution_notes: row.resolution_notes,
        refund_amount,
        resolved_by: row.resolved_by,
        resolved_at: row.resolved_at,
        created_at: row.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Actor, Money, Role};
    use rust_decimal_macros::dec;

    #[test]
    fn test_resolved_case_round_trips_through_row() {
        let mut case = DisputeCase::open(BookingId::new(), DisputeParty::Host, "guest damaged lamp").unwrap();
        let admin = Actor::new("ops-7", vec![Role::Admin]);
        case.resolve(Some("split".into()), Some(Money::inr(dec!(1200))), &admin)
            .unwrap();

        let row = dispute_to_row(&case);
        assert_eq!(row.refund_currency.as_deref(), Some("INR"));
        assert_eq!(row_to_dispute(row).unwrap(), case);
    }

    #[test]
    fn test_amount_without_currency_is_rejected() {
        let case = DisputeCase::open(BookingId::new(), DisputeParty::Guest, "noise").unwrap();
        let mut row = dispute_to_row(&case);
        row.refund_amount = Some(dec!(10));
        assert!(row_to_dispute(row).is_err());
    }
}
