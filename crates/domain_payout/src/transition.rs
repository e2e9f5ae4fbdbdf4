//! Payout state transitions
//!
//! A completed payout is never touched again: every action on it fails with
//! `AlreadyProcessed`. A cancelled payout is closed as well. A failed payout
//! can be retried on the same record.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use core_kernel::Actor;

use crate::error::PayoutError;
use crate::payout::{PayoutRecord, PayoutStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutAction {
    /// Hand-off to the bank or UPI gateway
    Initiate,
    Process,
    Fail,
    Cancel,
}

impl PayoutAction {
    pub fn parse(verb: &str) -> Result<Self, PayoutError> {
        match verb.trim().to_ascii_lowercase().as_str() {
            "initiate" => Ok(PayoutAction::Initiate),
            "process" => Ok(PayoutAction::Process),
            "fail" => Ok(PayoutAction::Fail),
            "cancel" => Ok(PayoutAction::Cancel),
            other => Err(PayoutError::InvalidAction(format!("unknown payout action '{}'", other))),
        }
    }

    pub fn target(&self) -> PayoutStatus {
        match self {
            PayoutAction::Initiate => PayoutStatus::Processing,
            PayoutAction::Process => PayoutStatus::Completed,
            PayoutAction::Fail => PayoutStatus::Failed,
            PayoutAction::Cancel => PayoutStatus::Cancelled,
        }
    }
}

/// Extra data supplied with an action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}

impl PayoutRecord {
    /// Applies `action` in place
    ///
    /// The record is left unchanged when the action is rejected.
    pub fn apply(
        &mut self,
        action: PayoutAction,
        request: TransitionRequest,
        actor: &Actor,
    ) -> Result<(), PayoutError> {
        use PayoutStatus::*;

        match self.status {
            Completed => return Err(PayoutError::AlreadyProcessed(self.id.to_string())),
            Cancelled => return Err(PayoutError::transition(self.status, action.target())),
            _ => {}
        }

        let now = Utc::now();
        match action {
            PayoutAction::Initiate => {
                if self.status != Pending {
                    return Err(PayoutError::transition(self.status, Processing));
                }
                self.status = Processing;
            }
            PayoutAction::Process => {
                let transaction_id = request
                    .transaction_id
                    .filter(|t| !t.trim().is_empty())
                    .ok_or(PayoutError::MissingTransactionId)?;
                self.status = Completed;
                self.transaction_id = Some(transaction_id);
                self.processed_at = Some(now);
                if request.notes.is_some() {
                    self.notes = request.notes;
                }
            }
            PayoutAction::Fail => {
                self.status = Failed;
                self.failure_reason = request.notes;
                self.retry_count += 1;
                self.last_retry_at = Some(now);
            }
            PayoutAction::Cancel => {
                self.status = Cancelled;
                self.notes = request.notes;
            }
        }

        self.updated_by = Some(actor.id.clone());
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payout::{AmountsSnapshot, PayoutDestination};
    use core_kernel::{BookingId, HostId, Money};
    use rust_decimal_macros::dec;

    fn record() -> PayoutRecord {
        let m = |v| Money::inr(v);
        let amounts = AmountsSnapshot {
            total: m(dec!(11800)),
            commission: m(dec!(1000)),
            gst: m(dec!(1800)),
            tcs: m(dec!(118)),
            platform_fee: m(dec!(0)),
            penalties: m(dec!(0)),
            total_deductions: m(dec!(2918)),
            net_payout: m(dec!(8882)),
            settings_version: 1,
        };
        PayoutRecord::pending(
            HostId::new(),
            BookingId::new(),
            amounts,
            PayoutDestination::Upi { upi_id: "host@upi".into() },
            &Actor::system("test"),
        )
    }

    fn ops() -> Actor {
        Actor::new("ops-1", vec![core_kernel::Role::Finance])
    }

    fn with_txn(id: &str) -> TransitionRequest {
        TransitionRequest {
            transaction_id: Some(id.into()),
            notes: None,
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(PayoutAction::parse("Process").unwrap(), PayoutAction::Process);
        assert!(matches!(PayoutAction::parse("refund"), Err(PayoutError::InvalidAction(_))));
    }

    #[test]
    fn test_process_requires_transaction_id() {
        let mut r = record();
        assert!(matches!(
            r.apply(PayoutAction::Process, with_txn("  "), &ops()),
            Err(PayoutError::MissingTransactionId)
        ));
        assert_eq!(r.status, PayoutStatus::Pending);
    }

    #[test]
    fn test_initiate_then_process() {
        let mut r = record();
        r.apply(PayoutAction::Initiate, TransitionRequest::default(), &ops()).unwrap();
        assert_eq!(r.status, PayoutStatus::Processing);
        r.apply(PayoutAction::Process, with_txn("UTR123"), &ops()).unwrap();
        assert_eq!(r.status, PayoutStatus::Completed);
        assert_eq!(r.transaction_id.as_deref(), Some("UTR123"));
        assert!(r.processed_at.is_some());
        assert_eq!(r.updated_by.as_deref(), Some("ops-1"));
    }

    #[test]
    fn test_completed_rejects_every_action() {
        let mut r = record();
        r.apply(PayoutAction::Process, with_txn("UTR1"), &ops()).unwrap();
        let snapshot = r.clone();

        for action in [PayoutAction::Initiate, PayoutAction::Process, PayoutAction::Fail, PayoutAction::Cancel] {
            assert!(matches!(
                r.apply(action, with_txn("UTR2"), &ops()),
                Err(PayoutError::AlreadyProcessed(_))
            ));
        }
        assert_eq!(r, snapshot);
    }

    #[test]
    fn test_fail_counts_retries_and_can_be_retried() {
        let mut r = record();
        let failed = TransitionRequest {
            transaction_id: None,
            notes: Some("beneficiary bank down".into()),
        };
        r.apply(PayoutAction::Fail, failed.clone(), &ops()).unwrap();
        r.apply(PayoutAction::Fail, failed, &ops()).unwrap();
        assert_eq!(r.retry_count, 2);
        assert_eq!(r.failure_reason.as_deref(), Some("beneficiary bank down"));
        assert!(r.last_retry_at.is_some());

        r.apply(PayoutAction::Process, with_txn("UTR9"), &ops()).unwrap();
        assert_eq!(r.status, PayoutStatus::Completed);
    }

    #[test]
    fn test_cancelled_is_terminal() {
        let mut r = record();
        r.apply(
            PayoutAction::Cancel,
            TransitionRequest { transaction_id: None, notes: Some("host request".into()) },
            &ops(),
        )
        .unwrap();
        assert_eq!(r.notes.as_deref(), Some("host request"));
        assert!(matches!(
            r.apply(PayoutAction::Process, with_txn("UTR"), &ops()),
            Err(PayoutError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_initiate_only_from_pending() {
        let mut r = record();
        r.apply(PayoutAction::Fail, TransitionRequest::default(), &ops()).unwrap();
        assert!(r.apply(PayoutAction::Initiate, TransitionRequest::default(), &ops()).is_err());
    }
}
