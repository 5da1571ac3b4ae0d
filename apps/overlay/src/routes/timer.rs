use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::display::TimerSnapshot;
use crate::errors::AppError;
use crate::layout::{FitBounds, Size};
use crate::settings::{SettingStore, TimerSettings};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SettingsResponse<T> {
    pub settings: T,
    /// Query string a display page would carry for these settings.
    pub query: String,
}

pub(crate) fn settings_response<T>(store: &SettingStore<T>) -> Result<Json<SettingsResponse<T>>, AppError>
where
    T: Serialize + DeserializeOwned,
{
    Ok(Json(SettingsResponse {
        settings: store.current()?,
        query: store.query_string(),
    }))
}

/// Settings a page URL with `params` would start with.
pub(crate) fn resolve_query<T>(
    store: &SettingStore<T>,
    params: Vec<(String, String)>,
) -> Result<Json<SettingsResponse<T>>, AppError>
where
    T: Serialize + DeserializeOwned,
{
    let mut resolved = store.clone();
    resolved.reset();
    resolved.load_query(params);
    settings_response(&resolved)
}

fn validate_size(size: Size) -> Result<Size, AppError> {
    if size.width == 0 || size.height == 0 {
        return Err(AppError::Validation(format!(
            "size must be positive, got {}x{}",
            size.width, size.height
        )));
    }
    Ok(size)
}

/// GET /api/v1/timer
pub async fn handle_get_timer(State(state): State<AppState>) -> Json<TimerSnapshot> {
    Json(state.timer.snapshot())
}

/// GET /api/v1/timer/settings
pub async fn handle_get_timer_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse<TimerSettings>>, AppError> {
    settings_response(&state.timer_settings.lock())
}

/// PATCH /api/v1/timer/settings
/// Body is a map of setting paths to values, e.g. `{"textShadow.color": "#ff0000"}`.
pub async fn handle_patch_timer_settings(
    State(state): State<AppState>,
    Json(updates): Json<Map<String, Value>>,
) -> Result<Json<SettingsResponse<TimerSettings>>, AppError> {
    let (settings, response) = {
        let mut store = state.timer_settings.lock();
        let settings = store.update(&updates)?;
        (settings, settings_response(&store)?)
    };
    info!(keys = ?updates.keys().collect::<Vec<_>>(), "timer settings updated");
    state.apply_timer_settings(&settings);
    Ok(response)
}

/// POST /api/v1/timer/settings/reset
pub async fn handle_reset_timer_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse<TimerSettings>>, AppError> {
    let (settings, response) = {
        let mut store = state.timer_settings.lock();
        store.reset();
        (store.current()?, settings_response(&store)?)
    };
    state.apply_timer_settings(&settings);
    Ok(response)
}

/// GET /api/v1/timer/settings/resolve?showHours=false&...
pub async fn handle_resolve_timer_settings(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<SettingsResponse<TimerSettings>>, AppError> {
    resolve_query(&state.timer_settings.lock(), params)
}

/// PUT /api/v1/viewport
pub async fn handle_put_viewport(
    State(state): State<AppState>,
    Json(size): Json<Size>,
) -> Result<StatusCode, AppError> {
    state.resize_viewport(validate_size(size)?);
    Ok(StatusCode::ACCEPTED)
}

/// PUT /api/v1/timer/container
pub async fn handle_put_timer_container(
    State(state): State<AppState>,
    Json(size): Json<Size>,
) -> Result<StatusCode, AppError> {
    state.resize_timer_container(validate_size(size)?);
    Ok(StatusCode::ACCEPTED)
}

/// PUT /api/v1/timer/bounds
pub async fn handle_put_timer_bounds(
    State(state): State<AppState>,
    Json(bounds): Json<FitBounds>,
) -> Result<Json<TimerSnapshot>, AppError> {
    state.timer.surface().lock().set_bounds(bounds)?;
    Ok(Json(state.timer.snapshot()))
}
