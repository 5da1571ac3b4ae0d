pub mod card;
pub mod countdown;
pub mod feed;
pub mod health;
pub mod timer;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Timer display
        .route("/api/v1/timer", get(timer::handle_get_timer))
        .route(
            "/api/v1/timer/settings",
            get(timer::handle_get_timer_settings).patch(timer::handle_patch_timer_settings),
        )
        .route(
            "/api/v1/timer/settings/reset",
            post(timer::handle_reset_timer_settings),
        )
        .route(
            "/api/v1/timer/settings/resolve",
            get(timer::handle_resolve_timer_settings),
        )
        .route(
            "/api/v1/timer/container",
            put(timer::handle_put_timer_container),
        )
        .route("/api/v1/timer/bounds", put(timer::handle_put_timer_bounds))
        .route("/api/v1/viewport", put(timer::handle_put_viewport))
        // Card display
        .route("/api/v1/card", get(card::handle_get_card))
        .route(
            "/api/v1/card/settings",
            get(card::handle_get_card_settings).patch(card::handle_patch_card_settings),
        )
        .route(
            "/api/v1/card/settings/reset",
            post(card::handle_reset_card_settings),
        )
        .route(
            "/api/v1/card/settings/resolve",
            get(card::handle_resolve_card_settings),
        )
        // Countdown
        .route(
            "/api/v1/countdown",
            get(countdown::handle_get_countdown).put(countdown::handle_set_countdown),
        )
        .route(
            "/api/v1/countdown/start",
            post(countdown::handle_start_countdown),
        )
        .route(
            "/api/v1/countdown/pause",
            post(countdown::handle_pause_countdown),
        )
        .route(
            "/api/v1/countdown/reset",
            post(countdown::handle_reset_countdown),
        )
        // Feed
        .route("/api/v1/feed", get(feed::handle_get_feed))
        .route(
            "/api/v1/logs",
            get(feed::handle_get_logs).delete(feed::handle_clear_logs),
        )
        .with_state(state)
}
