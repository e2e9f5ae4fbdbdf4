//! Refund workflow on a booking
//!
//! ```text
//! none ──request──► pending ──approve──► approved ──process──► processed
//!   ▲                  │
//!   └──── request ── rejected ◄──reject──┘
//! ```
//!
//! Approval only records the decision; the money moves when the gateway
//! confirms and the refund is processed. Payouts are untouched here, see
//! refund reconciliation in the payout domain.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Actor, Money};

use crate::booking::{BookingLedgerEntry, PaymentStatus};
use crate::error::BookingError;

/// Refund state of a booking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    #[default]
    None,
    Pending,
    Approved,
    Processed,
    Rejected,
}

/// Refund fields carried on the booking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundDetails {
    pub status: RefundStatus,
    pub amount: Option<Money>,
    pub reason: Option<String>,
    pub requested_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    /// Actor of the most recent refund action
    pub actioned_by: Option<String>,
}

/// A refund action requested by an operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefundAction {
    Request { amount: Decimal, reason: Option<String> },
    /// Approve, optionally overriding the requested amount or reason
    Approve { amount: Option<Decimal>, reason: Option<String> },
    Process,
    Reject { reason: Option<String> },
}

impl RefundAction {
    /// Builds an action from its verb
    ///
    /// # Errors
    ///
    /// `InvalidAction` for unknown verbs, `InvalidAmount` when `request`
    /// comes without an amount.
    pub fn parse(
        verb: &str,
        amount: Option<Decimal>,
        reason: Option<String>,
    ) -> Result<Self, BookingError> {
        match verb.trim().to_ascii_lowercase().as_str() {
            "request" => {
                let amount = amount.ok_or_else(|| {
                    BookingError::InvalidAmount("refund request requires an amount".to_string())
                })?;
                Ok(RefundAction::Request { amount, reason })
            }
            "approve" => Ok(RefundAction::Approve { amount, reason }),
            "process" => Ok(RefundAction::Process),
            "reject" => Ok(RefundAction::Reject { reason }),
            other => Err(BookingError::InvalidAction(format!(
                "unknown refund action '{}'",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RefundAction::Request { .. } => "request",
            RefundAction::Approve { .. } => "approve",
            RefundAction::Process => "process",
            RefundAction::Reject { .. } => "reject",
        }
    }
}

impl BookingLedgerEntry {
    /// Applies a refund action, stamping the actor
    pub fn apply_refund_action(
        &mut self,
        action: RefundAction,
        actor: &Actor,
    ) -> Result<(), BookingError> {
        match action {
            RefundAction::Request { amount, reason } => self.request_refund(amount, reason, actor),
            RefundAction::Approve { amount, reason } => self.approve_refund(amount, reason, actor),
            RefundAction::Process => self.process_refund(actor),
            RefundAction::Reject { reason } => self.reject_refund(reason, actor),
        }
    }

    /// Opens a refund request
    pub fn request_refund(
        &mut self,
        amount: Decimal,
        reason: Option<String>,
        actor: &Actor,
    ) -> Result<(), BookingError> {
        if !matches!(self.refund.status, RefundStatus::None | RefundStatus::Rejected) {
            return Err(BookingError::transition(self.refund.status, RefundStatus::Pending));
        }
        if self.payment_status != PaymentStatus::Paid {
            return Err(BookingError::RefundNotAllowed(format!(
                "booking {} is not paid ({:?})",
                self.reference, self.payment_status
            )));
        }
        let amount = self.validate_refund_amount(amount)?;

        let now = Utc::now();
        self.refund = RefundDetails {
            status: RefundStatus::Pending,
            amount: Some(amount),
            reason,
            requested_at: Some(now),
            approved_at: None,
            processed_at: None,
            actioned_by: Some(actor.id.clone()),
        };
        self.touch();
        Ok(())
    }

    /// Approves the pending request
    pub fn approve_refund(
        &mut self,
        amount: Option<Decimal>,
        reason: Option<String>,
        actor: &Actor,
    ) -> Result<(), BookingError> {
        if self.refund.status != RefundStatus::Pending {
            return Err(BookingError::transition(self.refund.status, RefundStatus::Approved));
        }
        if let Some(amount) = amount {
            self.refund.amount = Some(self.validate_refund_amount(amount)?);
        }
        if reason.is_some() {
            self.refund.reason = reason;
        }
        self.refund.status = RefundStatus::Approved;
        self.refund.approved_at = Some(Utc::now());
        self.refund.actioned_by = Some(actor.id.clone());
        self.touch();
        Ok(())
    }

    /// Marks an approved refund as paid out by the gateway
    pub fn process_refund(&mut self, actor: &Actor) -> Result<(), BookingError> {
        if self.refund.status != RefundStatus::Approved {
            return Err(BookingError::transition(self.refund.status, RefundStatus::Processed));
        }
        self.refund.status = RefundStatus::Processed;
        self.refund.processed_at = Some(Utc::now());
        self.refund.actioned_by = Some(actor.id.clone());

        if self.refund.amount == Some(self.total_amount) {
            self.payment_status = PaymentStatus::Refunded;
        }
        self.touch();
        Ok(())
    }

    /// Declines the pending request
    pub fn reject_refund(&mut self, reason: Option<String>, actor: &Actor) -> Result<(), BookingError> {
        if self.refund.status != RefundStatus::Pending {
            return Err(BookingError::transition(self.refund.status, RefundStatus::Rejected));
        }
        self.refund.status = RefundStatus::Rejected;
        if reason.is_some() {
            self.refund.reason = reason;
        }
        self.refund.actioned_by = Some(actor.id.clone());
        self.touch();
        Ok(())
    }

    /// Approved or processed refund amount, if any
    pub fn settled_refund(&self) -> Option<Money> {
        match self.refund.status {
            RefundStatus::Approved | RefundStatus::Processed => self.refund.amount,
            _ => None,
        }
    }

    fn validate_refund_amount(&self, amount: Decimal) -> Result<Money, BookingError> {
        let amount = Money::new(amount, self.currency()).round_to_currency();
        if !amount.is_positive() {
            return Err(BookingError::InvalidAmount(format!(
                "refund must be positive, got {}",
                amount.amount()
            )));
        }
        if amount.amount() > self.total_amount.amount() {
            return Err(BookingError::InvalidAmount(format!(
                "refund {} exceeds booking total {}",
                amount.amount(),
                self.total_amount.amount()
            )));
        }
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::BookingPricing;
    use core_kernel::{GuestId, HostId, Role, StayId};
    use rust_decimal_macros::dec;

    fn finance() -> Actor {
        Actor::new("fin-2", vec![Role::Finance])
    }

    fn paid_booking() -> BookingLedgerEntry {
        let mut entry = BookingLedgerEntry::new(
            HostId::new(),
            GuestId::new(),
            StayId::new(),
            BookingPricing::base_only(Money::inr(dec!(6000))),
        )
        .unwrap();
        entry.mark_paid().unwrap();
        entry
    }

    #[test]
    fn test_parse_unknown_verb() {
        assert!(matches!(
            RefundAction::parse("refund_everything", None, None),
            Err(BookingError::InvalidAction(_))
        ));
        assert_eq!(
            RefundAction::parse(" Process ", None, None).unwrap(),
            RefundAction::Process
        );
    }

    #[test]
    fn test_request_requires_amount() {
        assert!(matches!(
            RefundAction::parse("request", None, None),
            Err(BookingError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_full_refund_marks_booking_refunded() {
        let mut entry = paid_booking();
        entry.request_refund(dec!(6000), Some("host cancelled".into()), &finance()).unwrap();
        entry.approve_refund(None, None, &finance()).unwrap();
        entry.process_refund(&finance()).unwrap();

        assert_eq!(entry.refund.status, RefundStatus::Processed);
        assert_eq!(entry.payment_status, PaymentStatus::Refunded);
        assert!(entry.refund.processed_at.is_some());
    }

    #[test]
    fn test_partial_refund_keeps_paid() {
        let mut entry = paid_booking();
        entry.request_refund(dec!(1500), None, &finance()).unwrap();
        entry.approve_refund(Some(dec!(1000)), Some("goodwill".into()), &finance()).unwrap();
        entry.process_refund(&finance()).unwrap();

        assert_eq!(entry.payment_status, PaymentStatus::Paid);
        assert_eq!(entry.refund.amount.unwrap().amount(), dec!(1000));
        assert_eq!(entry.refund.reason.as_deref(), Some("goodwill"));
        assert_eq!(entry.refundable_amount().amount(), dec!(5000));
    }

    #[test]
    fn test_cannot_process_before_approval() {
        let mut entry = paid_booking();
        entry.request_refund(dec!(100), None, &finance()).unwrap();
        assert!(matches!(
            entry.process_refund(&finance()),
            Err(BookingError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_refund_amount_bounds() {
        let mut entry = paid_booking();
        assert!(entry.request_refund(dec!(0), None, &finance()).is_err());
        assert!(entry.request_refund(dec!(6000.01), None, &finance()).is_err());
        assert_eq!(entry.refund.status, RefundStatus::None);
    }

    #[test]
    fn test_unpaid_booking_cannot_be_refunded() {
        let mut entry = BookingLedgerEntry::new(
            HostId::new(),
            GuestId::new(),
            StayId::new(),
            BookingPricing::base_only(Money::inr(dec!(6000))),
        )
        .unwrap();
        assert!(matches!(
            entry.request_refund(dec!(10), None, &finance()),
            Err(BookingError::RefundNotAllowed(_))
        ));
    }

    #[test]
    fn test_rejected_request_can_be_reopened() {
        let mut entry = paid_booking();
        entry.request_refund(dec!(500), None, &finance()).unwrap();
        entry.reject_refund(Some("outside policy".into()), &finance()).unwrap();
        assert!(entry.settled_refund().is_none());

        entry.request_refund(dec!(250), None, &finance()).unwrap();
        assert_eq!(entry.refund.status, RefundStatus::Pending);
    }
}
