use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{Map, Value};

use crate::display::CardView;
use crate::errors::AppError;
use crate::routes::timer::{resolve_query, settings_response, SettingsResponse};
use crate::settings::CardSettings;
use crate::state::AppState;

/// GET /api/v1/card
pub async fn handle_get_card(State(state): State<AppState>) -> Result<Json<CardView>, AppError> {
    state
        .card
        .view()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Waiting for event data".to_string()))
}

/// GET /api/v1/card/settings
pub async fn handle_get_card_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse<CardSettings>>, AppError> {
    settings_response(&state.card_settings.lock())
}

/// PATCH /api/v1/card/settings
pub async fn handle_patch_card_settings(
    State(state): State<AppState>,
    Json(updates): Json<Map<String, Value>>,
) -> Result<Json<SettingsResponse<CardSettings>>, AppError> {
    let (settings, response) = {
        let mut store = state.card_settings.lock();
        let settings = store.update(&updates)?;
        (settings, settings_response(&store)?)
    };
    state.apply_card_settings(&settings);
    Ok(response)
}

/// POST /api/v1/card/settings/reset
pub async fn handle_reset_card_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse<CardSettings>>, AppError> {
    let (settings, response) = {
        let mut store = state.card_settings.lock();
        store.reset();
        (store.current()?, settings_response(&store)?)
    };
    state.apply_card_settings(&settings);
    Ok(response)
}

/// GET /api/v1/card/settings/resolve?bg=true
pub async fn handle_resolve_card_settings(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<SettingsResponse<CardSettings>>, AppError> {
    resolve_query(&state.card_settings.lock(), params)
}
