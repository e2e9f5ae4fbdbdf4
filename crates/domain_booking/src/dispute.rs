//! Dispute cases raised against a booking

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Actor, BookingId, DisputeId, Money};

use crate::booking::DisputeStatus;
use crate::error::BookingError;

/// Who raised the dispute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeParty {
    Guest,
    Host,
}

/// A dispute on one booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeCase {
    pub id: DisputeId,
    pub booking_id: BookingId,
    pub raised_by: DisputeParty,
    pub reason: String,
    pub status: DisputeStatus,
    pub resolution_notes: Option<String>,
    pub refund_amount: Option<Money>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Decision taken on an open dispute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisputeAction {
    Resolve { notes: Option<String>, refund_amount: Option<Decimal> },
    Reject { notes: Option<String> },
}

impl DisputeAction {
    pub fn parse(
        verb: &str,
        notes: Option<String>,
        refund_amount: Option<Decimal>,
    ) -> Result<Self, BookingError> {
        match verb.trim().to_ascii_lowercase().as_str() {
            "resolve" => Ok(DisputeAction::Resolve { notes, refund_amount }),
            "reject" => Ok(DisputeAction::Reject { notes }),
            other => Err(BookingError::InvalidAction(format!(
                "unknown dispute action '{}'",
                other
            ))),
        }
    }
}

impl DisputeCase {
    pub fn open(
        booking_id: BookingId,
        raised_by: DisputeParty,
        reason: impl Into<String>,
    ) -> Result<Self, BookingError> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(BookingError::InvalidAction(
                "a dispute needs a reason".to_string(),
            ));
        }
        Ok(Self {
            id: DisputeId::new_v7(),
            booking_id,
            raised_by,
            reason,
            status: DisputeStatus::Pending,
            resolution_notes: None,
            refund_amount: None,
            resolved_by: None,
            resolved_at: None,
            created_at: Utc::now(),
        })
    }

    pub fn is_open(&self) -> bool {
        self.status == DisputeStatus::Pending
    }

    /// Closes the case in the guest's or host's favour
    pub fn resolve(
        &mut self,
        notes: Option<String>,
        refund_amount: Option<Money>,
        actor: &Actor,
    ) -> Result<(), BookingError> {
        self.close(DisputeStatus::Resolved, notes, actor)?;
        self.refund_amount = refund_amount;
        Ok(())
    }

    pub fn reject(&mut self, notes: Option<String>, actor: &Actor) -> Result<(), BookingError> {
        self.close(DisputeStatus::Rejected, notes, actor)
    }

    fn close(
        &mut self,
        target: DisputeStatus,
        notes: Option<String>,
        actor: &Actor,
    ) -> Result<(), BookingError> {
        if !self.is_open() {
            return Err(BookingError::transition(self.status, target));
        }
        self.status = target;
        self.resolution_notes = notes;
        self.resolved_by = Some(actor.id.clone());
        self.resolved_at = Some(Utc::now());
        Ok(())
    }
}
