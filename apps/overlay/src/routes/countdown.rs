use axum::{extract::State, Json};
use serde::Deserialize;

use crate::display::CountdownStatus;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetCountdown {
    pub minute: Option<u32>,
    pub second: Option<u32>,
}

/// GET /api/v1/countdown
pub async fn handle_get_countdown(State(state): State<AppState>) -> Json<CountdownStatus> {
    Json(state.countdown.status())
}

/// POST /api/v1/countdown/start
pub async fn handle_start_countdown(State(state): State<AppState>) -> Json<CountdownStatus> {
    Json(state.countdown.start())
}

/// POST /api/v1/countdown/pause
pub async fn handle_pause_countdown(State(state): State<AppState>) -> Json<CountdownStatus> {
    Json(state.countdown.pause())
}

/// POST /api/v1/countdown/reset
pub async fn handle_reset_countdown(State(state): State<AppState>) -> Json<CountdownStatus> {
    Json(state.countdown.reset())
}

/// PUT /api/v1/countdown
/// Minutes are applied before seconds.
pub async fn handle_set_countdown(
    State(state): State<AppState>,
    Json(req): Json<SetCountdown>,
) -> Result<Json<CountdownStatus>, AppError> {
    if req.minute.is_none() && req.second.is_none() {
        return Err(AppError::Validation(
            "expected at least one of minute, second".to_string(),
        ));
    }
    if let Some(second) = req.second.filter(|s| *s >= 60) {
        return Err(AppError::Validation(format!(
            "second must be below 60, got {second}"
        )));
    }
    let mut status = state.countdown.status();
    if let Some(minute) = req.minute {
        status = state.countdown.set_minute(minute);
    }
    if let Some(second) = req.second {
        status = state.countdown.set_second(second);
    }
    Ok(Json(status))
}
