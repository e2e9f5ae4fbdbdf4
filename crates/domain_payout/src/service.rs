//! Payout service: state transitions and listings

use std::sync::Arc;

use tracing::{info, instrument, warn};

use core_kernel::{Actor, HostId, PayoutId, Role};

use crate::error::PayoutError;
use crate::payout::{PayoutRecord, PayoutStatus};
use crate::ports::PayoutPort;
use crate::transition::{PayoutAction, TransitionRequest};

#[derive(Clone)]
pub struct PayoutService {
    payouts: Arc<dyn PayoutPort>,
}

impl PayoutService {
    pub fn new(payouts: Arc<dyn PayoutPort>) -> Self {
        Self { payouts }
    }

    pub async fn get(&self, id: &PayoutId) -> Result<PayoutRecord, PayoutError> {
        self.payouts.get(id).await.map_err(|e| {
            if e.is_not_found() {
                PayoutError::PayoutNotFound(id.to_string())
            } else {
                e.into()
            }
        })
    }

    pub async fn list_for_host(
        &self,
        host_id: &HostId,
        status: Option<PayoutStatus>,
    ) -> Result<Vec<PayoutRecord>, PayoutError> {
        Ok(self.payouts.list_for_host(host_id, status).await?)
    }

    /// Moves a payout along its state machine
    ///
    /// The write only lands if the payout still has the status it was read
    /// with. Losing that race to a completion reports `AlreadyProcessed`.
    #[instrument(skip(self, request), fields(payout = %id, action = ?action, actor = %actor))]
    pub async fn transition(
        &self,
        id: &PayoutId,
        action: PayoutAction,
        request: TransitionRequest,
        actor: &Actor,
    ) -> Result<PayoutRecord, PayoutError> {
        if !actor.has_role(Role::Finance) {
            return Err(PayoutError::Forbidden(format!("{} may not update payouts", actor)));
        }

        let mut record = self.get(id).await?;
        let expected = record.status;

        record.apply(action, request, actor).inspect_err(|e| {
            warn!(status = ?expected, error = %e, "Payout transition rejected");
        })?;

        if let Err(e) = self.payouts.update_status(&record, expected).await {
            if !e.is_conflict() {
                return Err(e.into());
            }
            let current = self.get(id).await?;
            warn!(status = ?current.status, "Payout changed concurrently");
            return Err(if current.status == PayoutStatus::Completed {
                PayoutError::AlreadyProcessed(id.to_string())
            } else {
                PayoutError::Conflict(format!(
                    "payout {} moved from {:?} to {:?}",
                    id, expected, current.status
                ))
            });
        }

        info!(from = ?expected, to = ?record.status, "Payout status changed");
        Ok(record)
    }
}
