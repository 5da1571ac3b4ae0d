use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::feed::{ConnectionState, LogEntry, LogKind};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    pub url: String,
    pub state: ConnectionState,
    pub is_connected: bool,
}

#[derive(Deserialize)]
pub struct LogQuery {
    #[serde(rename = "type")]
    pub kind: Option<LogKind>,
}

/// GET /api/v1/feed
pub async fn handle_get_feed(State(state): State<AppState>) -> Json<FeedStatus> {
    let connection = *state.feed_state.read();
    Json(FeedStatus {
        url: state.feed_url(),
        state: connection,
        is_connected: connection == ConnectionState::Connected,
    })
}

/// GET /api/v1/logs?type=event
pub async fn handle_get_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Json<Vec<LogEntry>> {
    Json(state.log.entries(query.kind))
}

/// DELETE /api/v1/logs
pub async fn handle_clear_logs(State(state): State<AppState>) -> StatusCode {
    state.log.clear();
    StatusCode::NO_CONTENT
}
