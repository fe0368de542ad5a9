use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    db::{GameOrder, GameSource, NewGame, UpdateGame},
    error::LibraryError,
    scanner::ScannedGame,
    AppState,
};

use super::{
    error::ApiResult,
    extract::{ApiJson, ApiQuery},
    owner::Owner,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameSort {
    #[default]
    Title,
    Playtime,
    Recent,
}

impl GameSort {
    /// Unknown or missing names fall back to title order.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("playtime") => GameSort::Playtime,
            Some("recent") => GameSort::Recent,
            _ => GameSort::Title,
        }
    }
}

impl From<GameSort> for GameOrder {
    fn from(sort: GameSort) -> Self {
        match sort {
            GameSort::Title => GameOrder::TitleAsc,
            GameSort::Playtime => GameOrder::PlayTimeDesc,
            GameSort::Recent => GameOrder::RecentlyAdded,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListGamesQuery {
    pub source: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGameRequest {
    pub title: Option<String>,
    pub play_time: Option<i64>,
    pub genres: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPlayTimeRequest {
    pub play_time: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub paths: Vec<String>,
}

pub async fn list_games(
    State(state): State<AppState>,
    owner: Owner,
    ApiQuery(query): ApiQuery<ListGamesQuery>,
) -> ApiResult<Json<Value>> {
    let sort = GameSort::from_param(query.sort.as_deref());
    let source = match query.source.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<GameSource>() {
            Ok(source) => Some(source),
            // No stored game can carry an unknown source.
            Err(_) => return Ok(Json(json!({ "count": 0, "games": [] }))),
        },
    };

    let games = state.db.list_games(owner.id(), source, sort.into()).await?;
    Ok(Json(json!({ "count": games.len(), "games": games })))
}

pub async fn add_game(
    State(state): State<AppState>,
    owner: Owner,
    ApiJson(request): ApiJson<AddGameRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let title = request
        .title
        .filter(|title| !title.trim().is_empty())
        .ok_or_else(|| LibraryError::invalid_input("Game title is required"))?;
    let play_time = request.play_time.unwrap_or(0);
    if play_time < 0 {
        return Err(LibraryError::invalid_input("playTime must be zero or greater").into());
    }

    let game = state
        .db
        .create_manual_game(
            owner.id(),
            NewGame {
                title,
                play_time: play_time as u64,
                genres: request.genres.unwrap_or_default(),
                tags: request.tags.unwrap_or_default(),
                description: request.description.unwrap_or_default(),
                ..NewGame::default()
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Game added successfully", "game": game })),
    ))
}

pub async fn update_game(
    State(state): State<AppState>,
    owner: Owner,
    Path(game_id): Path<String>,
    ApiJson(changes): ApiJson<UpdateGame>,
) -> ApiResult<Json<Value>> {
    let game = state.db.update_game(owner.id(), &game_id, changes).await?;
    Ok(Json(json!({ "message": "Game updated successfully", "game": game })))
}

pub async fn delete_game(
    State(state): State<AppState>,
    owner: Owner,
    Path(game_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.db.delete_game(owner.id(), &game_id).await?;
    Ok(Json(json!({ "message": "Game deleted successfully" })))
}

pub async fn set_play_time(
    State(state): State<AppState>,
    owner: Owner,
    Path(game_id): Path<String>,
    ApiJson(request): ApiJson<SetPlayTimeRequest>,
) -> ApiResult<Json<Value>> {
    let play_time = request
        .play_time
        .ok_or_else(|| LibraryError::invalid_input("Valid playtime is required"))?;
    let game = state
        .db
        .set_play_time(owner.id(), &game_id, play_time)
        .await?;
    Ok(Json(json!({ "message": "Playtime updated successfully", "game": game })))
}

/// Scan the configured roots (or `paths`, when given) and import what turns up.
pub async fn scan_local(
    State(state): State<AppState>,
    owner: Owner,
    request: Option<ApiJson<ScanRequest>>,
) -> ApiResult<Json<Value>> {
    let custom_paths = request.map(|ApiJson(r)| r.paths).unwrap_or_default();
    let scanner = state.scanner.clone();

    let found: Vec<ScannedGame> = tokio::task::spawn_blocking(move || {
        if custom_paths.is_empty() {
            scanner.scan()
        } else {
            scanner.scan_custom(&custom_paths[..])
        }
    })
    .await
    .map_err(|err| LibraryError::Internal(anyhow::Error::new(err).context("scan task failed")))?;

    let candidates = found.into_iter().map(ScannedGame::into_new_game).collect();
    let summary = state.db.import_local_games(owner.id(), candidates).await?;

    Ok(Json(json!({
        "message": "Local scan completed",
        "imported": summary.imported,
        "skipped": summary.skipped,
        "total": summary.total,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{error::ApiError, test_support::test_state};
    use std::fs;

    fn alice() -> Owner {
        Owner("alice".into())
    }

    #[tokio::test]
    async fn add_requires_title() -> anyhow::Result<()> {
        let (_dir, state) = test_state()?;
        let result = add_game(State(state), alice(), ApiJson(AddGameRequest::default())).await;
        match result {
            Err(err) => assert_eq!(err.status(), StatusCode::BAD_REQUEST),
            Ok(_) => panic!("missing title must be rejected"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn add_then_list_and_duplicate() -> anyhow::Result<()> {
        let (_dir, state) = test_state()?;
        let request = || AddGameRequest {
            title: Some("Hades".into()),
            genres: Some(vec!["Roguelike".into()]),
            ..AddGameRequest::default()
        };

        let (status, Json(body)) = add_game(State(state.clone()), alice(), ApiJson(request())).await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["game"]["source"], "manual");
        assert_eq!(body["game"]["playTime"], 0);

        let duplicate = add_game(State(state.clone()), alice(), ApiJson(request())).await;
        assert!(matches!(
            duplicate,
            Err(ApiError::Library(LibraryError::Conflict(_)))
        ));

        let Json(listing) = list_games(
            State(state),
            alice(),
            ApiQuery(ListGamesQuery::default()),
        )
        .await?;
        assert_eq!(listing["count"], 1);
        assert_eq!(listing["games"][0]["title"], "Hades");
        Ok(())
    }

    #[tokio::test]
    async fn play_time_override_validates_input() -> anyhow::Result<()> {
        let (_dir, state) = test_state()?;
        let (_, Json(body)) = add_game(
            State(state.clone()),
            alice(),
            ApiJson(AddGameRequest {
                title: Some("Celeste".into()),
                ..AddGameRequest::default()
            }),
        )
        .await?;
        let id = body["game"]["id"].as_str().unwrap().to_string();

        let missing = set_play_time(
            State(state.clone()),
            alice(),
            Path(id.clone()),
            ApiJson(SetPlayTimeRequest::default()),
        )
        .await;
        assert!(matches!(missing, Err(ref e) if e.status() == StatusCode::BAD_REQUEST));

        let unknown = set_play_time(
            State(state.clone()),
            alice(),
            Path("nope".into()),
            ApiJson(SetPlayTimeRequest { play_time: Some(10) }),
        )
        .await;
        assert!(matches!(unknown, Err(ref e) if e.status() == StatusCode::NOT_FOUND));

        let Json(updated) = set_play_time(
            State(state),
            alice(),
            Path(id),
            ApiJson(SetPlayTimeRequest { play_time: Some(90) }),
        )
        .await?;
        assert_eq!(updated["game"]["playTime"], 90);
        Ok(())
    }

    #[tokio::test]
    async fn scan_imports_custom_paths() -> anyhow::Result<()> {
        let (dir, state) = test_state()?;
        let root = dir.path().join("library");
        fs::create_dir_all(root.join("Terraria"))?;
        fs::write(root.join("Terraria").join("Terraria.sh"), b"")?;

        let request = || {
            Some(ApiJson(ScanRequest {
                paths: vec![root.display().to_string()],
            }))
        };

        let Json(first) = scan_local(State(state.clone()), alice(), request()).await?;
        assert_eq!(first["imported"], 1);
        assert_eq!(first["total"], 1);

        let Json(second) = scan_local(State(state.clone()), alice(), request()).await?;
        assert_eq!(second["imported"], 0);
        assert_eq!(second["skipped"], 1);

        let Json(local) = list_games(
            State(state),
            alice(),
            ApiQuery(ListGamesQuery {
                source: Some("local".into()),
                sort: None,
            }),
        )
        .await?;
        assert_eq!(local["games"][0]["tags"][0], "Local Game");
        Ok(())
    }

    #[test]
    fn sort_param_falls_back_to_title() {
        assert_eq!(
            GameOrder::from(GameSort::from_param(Some("playtime"))),
            GameOrder::PlayTimeDesc
        );
        assert_eq!(GameSort::from_param(Some("recent")), GameSort::Recent);
        assert_eq!(GameSort::from_param(Some("bogus")), GameSort::Title);
        assert_eq!(GameSort::from_param(None), GameSort::Title);
    }

    #[tokio::test]
    async fn unknown_source_lists_nothing() -> anyhow::Result<()> {
        let (_dir, state) = test_state()?;
        add_game(
            State(state.clone()),
            alice(),
            ApiJson(AddGameRequest {
                title: Some("Hades".into()),
                ..AddGameRequest::default()
            }),
        )
        .await?;

        let Json(epic) = list_games(
            State(state.clone()),
            alice(),
            ApiQuery(ListGamesQuery {
                source: Some("epic".into()),
                sort: Some("bogus".into()),
            }),
        )
        .await?;
        assert_eq!(epic["count"], 0);

        let Json(blank) = list_games(
            State(state),
            alice(),
            ApiQuery(ListGamesQuery {
                source: Some(String::new()),
                sort: Some("bogus".into()),
            }),
        )
        .await?;
        assert_eq!(blank["count"], 1);
        Ok(())
    }
}
