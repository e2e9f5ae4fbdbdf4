//! Dispute handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Actor, DisputeId};
use domain_booking::{DisputeAction, DisputeCase};

use crate::dto::bookings::{DisputeActionRequest, DisputeActionResponse};
use crate::{error::ApiError, AppState};

pub async fn get_dispute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DisputeCase>, ApiError> {
    Ok(Json(state.disputes.get(&DisputeId::from(id)).await?))
}

/// Resolves or rejects a dispute; a resolution may carry a refund
pub async fn dispute_action(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<DisputeActionRequest>,
) -> Result<Json<DisputeActionResponse>, ApiError> {
    request.validate()?;
    let action = DisputeAction::parse(&request.action, request.notes, request.refund_amount)?;
    let (dispute, booking) = state.disputes.act(&DisputeId::from(id), action, &actor).await?;
    Ok(Json(DisputeActionResponse { dispute, booking }))
}
