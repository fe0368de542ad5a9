use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::AppState;

use super::{error::ApiResult, extract::ApiQuery, owner::Owner};

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub async fn start_session(
    State(state): State<AppState>,
    owner: Owner,
    Path(game_id): Path<String>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let session = state.tracker.start(owner.id(), &game_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Play session started", "session": session })),
    ))
}

pub async fn stop_session(
    State(state): State<AppState>,
    owner: Owner,
    Path(game_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let stopped = state.tracker.stop(owner.id(), &game_id).await?;
    Ok(Json(json!({
        "message": "Play session stopped",
        "session": stopped.session,
        "totalPlayTime": stopped.total_play_time,
    })))
}

pub async fn session_history(
    State(state): State<AppState>,
    owner: Owner,
    Path(game_id): Path<String>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Json<Value>> {
    let history = state
        .tracker
        .history(owner.id(), &game_id, query.limit)
        .await?;
    Ok(Json(json!(history)))
}

pub async fn active_session(
    State(state): State<AppState>,
    owner: Owner,
    Path(game_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let session = state.tracker.active(owner.id(), &game_id).await?;
    Ok(Json(json!({
        "hasActiveSession": session.is_some(),
        "session": session,
    })))
}
