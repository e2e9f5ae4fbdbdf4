//! Payout handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Actor, HostId, PayoutId, SettlementPeriod};
use domain_payout::{GenerationReport, PayoutAction, PayoutRecord, TransitionRequest};

use crate::dto::payouts::{GeneratePayoutsRequest, ListPayoutsQuery, TransitionPayoutRequest};
use crate::{error::ApiError, AppState};

/// Creates pending payouts for a host's settled bookings in a period
pub async fn generate_payouts(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<GeneratePayoutsRequest>,
) -> Result<Json<GenerationReport>, ApiError> {
    request.validate()?;
    let period = SettlementPeriod::new(request.period_start, request.period_end)?;
    let report = state
        .generator
        .generate_payouts(&HostId::from(request.host_id), period, &actor)
        .await?;
    Ok(Json(report))
}

pub async fn list_host_payouts(
    State(state): State<AppState>,
    Path(host_id): Path<Uuid>,
    Query(query): Query<ListPayoutsQuery>,
) -> Result<Json<Vec<PayoutRecord>>, ApiError> {
    let payouts = state
        .payouts
        .list_for_host(&HostId::from(host_id), query.status)
        .await?;
    Ok(Json(payouts))
}

pub async fn get_payout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PayoutRecord>, ApiError> {
    Ok(Json(state.payouts.get(&PayoutId::from(id)).await?))
}

pub async fn transition_payout(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<TransitionPayoutRequest>,
) -> Result<Json<PayoutRecord>, ApiError> {
    request.validate()?;
    let action = PayoutAction::parse(&request.action)?;
    let transition = TransitionRequest {
        transaction_id: request.transaction_id,
        notes: request.notes,
    };
    let record = state
        .payouts
        .transition(&PayoutId::from(id), action, transition, &actor)
        .await?;
    Ok(Json(record))
}
