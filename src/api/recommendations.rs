use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::AppState;

use super::{error::ApiResult, extract::ApiJson, owner::Owner};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesRequest {
    #[serde(default)]
    pub favorite_genres: Vec<String>,
}

pub async fn get_recommendations(
    State(state): State<AppState>,
    owner: Owner,
) -> ApiResult<Json<Value>> {
    let recommendations = state.engine.recommendations(owner.id()).await?;
    Ok(Json(json!({
        "count": recommendations.len(),
        "recommendations": recommendations,
    })))
}

pub async fn get_stats(State(state): State<AppState>, owner: Owner) -> ApiResult<Json<Value>> {
    let stats = state.engine.stats(owner.id()).await?;
    Ok(Json(json!({ "stats": stats })))
}

pub async fn get_preferences(
    State(state): State<AppState>,
    owner: Owner,
) -> ApiResult<Json<Value>> {
    let preferences = state.db.get_preferences(owner.id()).await?;
    Ok(Json(json!({ "favoriteGenres": preferences.favorite_genres })))
}

pub async fn set_preferences(
    State(state): State<AppState>,
    owner: Owner,
    ApiJson(request): ApiJson<PreferencesRequest>,
) -> ApiResult<Json<Value>> {
    let preferences = state
        .db
        .set_favorite_genres(owner.id(), request.favorite_genres)
        .await?;
    Ok(Json(json!({ "favoriteGenres": preferences.favorite_genres })))
}
