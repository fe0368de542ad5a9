pub mod error;
pub mod extract;
pub mod games;
pub mod owner;
pub mod recommendations;
pub mod sessions;

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use crate::AppState;

pub use error::{ApiError, ApiResult};
pub use owner::{Owner, OWNER_HEADER};

/// All HTTP routes. Every route except `/health` needs an owner header.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/games", get(games::list_games).post(games::add_game))
        .route("/games/scan-local", post(games::scan_local))
        .route(
            "/games/:id",
            put(games::update_game).delete(games::delete_game),
        )
        .route("/games/:id/playtime", put(games::set_play_time))
        .route("/games/:id/sessions", get(sessions::session_history))
        .route("/games/:id/sessions/active", get(sessions::active_session))
        .route("/games/:id/sessions/start", post(sessions::start_session))
        .route("/games/:id/sessions/stop", post(sessions::stop_session))
        .route("/recommendations", get(recommendations::get_recommendations))
        .route("/recommendations/stats", get(recommendations::get_stats))
        .route(
            "/preferences",
            get(recommendations::get_preferences).put(recommendations::set_preferences),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
