//! Booking, refund and dispute-opening handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Actor, BookingId};
use domain_booking::{BookingLedgerEntry, DisputeCase, RefundAction};
use domain_payout::PayoutAdjustment;
use domain_rates::Breakdown;

use crate::dto::bookings::{OpenDisputeRequest, PenaltyRequest, RefundActionRequest};
use crate::{error::ApiError, AppState};

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingLedgerEntry>, ApiError> {
    Ok(Json(state.bookings.get(&BookingId::from(id)).await?))
}

/// Stored breakdown if present, otherwise computed with current settings
pub async fn booking_breakdown(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Breakdown>, ApiError> {
    Ok(Json(state.bookings.breakdown(&BookingId::from(id)).await?))
}

/// Reprices the booking with the current settings and stores the result
pub async fn refresh_breakdown(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Breakdown>, ApiError> {
    Ok(Json(
        state
            .bookings
            .refresh_breakdown(&BookingId::from(id), &actor)
            .await?,
    ))
}

pub async fn record_penalty(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<PenaltyRequest>,
) -> Result<Json<BookingLedgerEntry>, ApiError> {
    request.validate()?;
    let entry = state
        .bookings
        .record_penalty(&BookingId::from(id), request.amount, &actor)
        .await?;
    Ok(Json(entry))
}

pub async fn refund_action(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<RefundActionRequest>,
) -> Result<Json<BookingLedgerEntry>, ApiError> {
    request.validate()?;
    let action = RefundAction::parse(&request.action, request.amount, request.reason)?;
    let entry = state
        .bookings
        .apply_refund(&BookingId::from(id), action, &actor)
        .await?;
    Ok(Json(entry))
}

/// Books the payout adjustment for the booking's settled refund
pub async fn reconcile_refund(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<PayoutAdjustment>), ApiError> {
    let adjustment = state
        .reconciler
        .reconcile_refund(&BookingId::from(id), &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(adjustment)))
}

pub async fn open_dispute(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<OpenDisputeRequest>,
) -> Result<(StatusCode, Json<DisputeCase>), ApiError> {
    request.validate()?;
    let case = state
        .disputes
        .open(&BookingId::from(id), request.raised_by, request.reason, &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(case)))
}
