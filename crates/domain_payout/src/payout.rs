//! Payout records and host payout destinations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Actor, BookingId, HostId, Money, PayoutId};
use domain_rates::Breakdown;

use crate::error::PayoutError;

/// Payout lifecycle state
///
/// ```text
/// pending ──► processing ──► completed
///    │  \          │
///    │   └────► failed ──► (retry) completed | failed | cancelled
///    └──────► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl PayoutStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PayoutStatus::Completed | PayoutStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    BankTransfer,
    Upi,
    Wallet,
}

/// Bank account details for NEFT/IMPS transfers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    pub account_number: String,
    pub ifsc: String,
    pub account_holder: String,
}

/// Where a payout is sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PayoutDestination {
    BankTransfer(BankAccount),
    Upi { upi_id: String },
    Wallet { wallet_id: String },
}

impl PayoutDestination {
    pub fn method(&self) -> PayoutMethod {
        match self {
            PayoutDestination::BankTransfer(_) => PayoutMethod::BankTransfer,
            PayoutDestination::Upi { .. } => PayoutMethod::Upi,
            PayoutDestination::Wallet { .. } => PayoutMethod::Wallet,
        }
    }

    /// Returns the name of the first blank required field, if any
    fn missing_field(&self) -> Option<&'static str> {
        let blank = |s: &str| s.trim().is_empty();
        match self {
            PayoutDestination::BankTransfer(account) => {
                if blank(&account.account_number) {
                    Some("account_number")
                } else if blank(&account.ifsc) {
                    Some("ifsc")
                } else if blank(&account.account_holder) {
                    Some("account_holder")
                } else {
                    None
                }
            }
            PayoutDestination::Upi { upi_id } if blank(upi_id) || !upi_id.contains('@') => Some("upi_id"),
            PayoutDestination::Wallet { wallet_id } if blank(wallet_id) => Some("wallet_id"),
            _ => None,
        }
    }
}

/// Payout preferences stored on the host profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPayoutProfile {
    pub host_id: HostId,
    pub preferred_method: Option<PayoutMethod>,
    pub bank_account: Option<BankAccount>,
    pub upi_id: Option<String>,
    pub wallet_id: Option<String>,
}

impl HostPayoutProfile {
    /// Resolves the destination for the preferred method
    ///
    /// # Errors
    ///
    /// `PayoutDestinationMissing` when no method is chosen, the chosen method
    /// has no details, or the details are incomplete.
    pub fn resolve_destination(&self) -> Result<PayoutDestination, PayoutError> {
        let method = self
            .preferred_method
            .ok_or_else(|| PayoutError::destination_missing(self.host_id, "no payout method configured"))?;

        let destination = match method {
            PayoutMethod::BankTransfer => self.bank_account.clone().map(PayoutDestination::BankTransfer),
            PayoutMethod::Upi => self.upi_id.clone().map(|upi_id| PayoutDestination::Upi { upi_id }),
            PayoutMethod::Wallet => self
                .wallet_id
                .clone()
                .map(|wallet_id| PayoutDestination::Wallet { wallet_id }),
        }
        .ok_or_else(|| {
            PayoutError::destination_missing(self.host_id, format!("{:?} selected but no details stored", method))
        })?;

        if let Some(field) = destination.missing_field() {
            return Err(PayoutError::destination_missing(
                self.host_id,
                format!("{:?} destination is missing {}", method, field),
            ));
        }
        Ok(destination)
    }
}

/// Amounts frozen onto a payout when it is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountsSnapshot {
    pub total: Money,
    pub commission: Money,
    pub gst: Money,
    pub tcs: Money,
    pub platform_fee: Money,
    pub penalties: Money,
    pub total_deductions: Money,
    pub net_payout: Money,
    pub settings_version: u32,
}

impl From<&Breakdown> for AmountsSnapshot {
    fn from(b: &Breakdown) -> Self {
        Self {
            total: b.total,
            commission: b.commission_amount,
            gst: b.gst_amount,
            tcs: b.tcs_amount,
            platform_fee: b.platform_fee_amount,
            penalties: b.penalty_amount,
            total_deductions: b.total_deductions,
            net_payout: b.net_payout,
            settings_version: b.settings_version,
        }
    }
}

/// One payout to a host for one booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub id: PayoutId,
    pub host_id: HostId,
    pub booking_id: BookingId,
    pub amounts: AmountsSnapshot,
    pub destination: PayoutDestination,
    pub status: PayoutStatus,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    pub failure_reason: Option<String>,
    pub retry_count: u32,
    pub last_retry_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PayoutRecord {
    /// A new pending payout
    pub fn pending(
        host_id: HostId,
        booking_id: BookingId,
        amounts: AmountsSnapshot,
        destination: PayoutDestination,
        actor: &Actor,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PayoutId::new_v7(),
            host_id,
            booking_id,
            amounts,
            destination,
            status: PayoutStatus::Pending,
            transaction_id: None,
            notes: None,
            failure_reason: None,
            retry_count: 0,
            last_retry_at: None,
            processed_at: None,
            created_by: actor.id.clone(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn net_payout(&self) -> Money {
        self.amounts.net_payout
    }

    pub fn method(&self) -> PayoutMethod {
        self.destination.method()
    }
}
