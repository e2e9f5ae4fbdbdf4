//! Rate settings and calculator handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use validator::Validate;

use core_kernel::{Actor, Currency, Money};
use domain_rates::{Breakdown, RateSettings, RateSettingsUpdate};

use crate::dto::settings::{BreakdownRequest, HistoryQuery, SettingsHistoryResponse};
use crate::{error::ApiError, AppState};

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<RateSettings>, ApiError> {
    Ok(Json(state.settings.current().await?))
}

/// Partial update; unspecified fields keep their current values
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(update): Json<RateSettingsUpdate>,
) -> Result<Json<RateSettings>, ApiError> {
    Ok(Json(state.settings.update(&update, &actor).await?))
}

pub async fn settings_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<SettingsHistoryResponse>, ApiError> {
    query.validate()?;
    let cap = state.config.settings_history_limit;
    let limit = query.limit.unwrap_or(cap).min(cap);
    let versions = state.settings.history(limit).await?;
    Ok(Json(SettingsHistoryResponse { versions }))
}

/// Prices a prospective booking against the current settings
pub async fn preview_breakdown(
    State(state): State<AppState>,
    Json(request): Json<BreakdownRequest>,
) -> Result<Json<Breakdown>, ApiError> {
    request.validate()?;
    let currency = Currency::default();
    let money = |amount| Money::new(amount, currency);

    let breakdown = state
        .settings
        .preview(
            money(request.base_amount),
            request.cleaning_fee.map(money).unwrap_or(Money::zero(currency)),
            request.extra_guest_charge.map(money).unwrap_or(Money::zero(currency)),
        )
        .await?;
    Ok(Json(breakdown))
}
