use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use uuid::Uuid;

use crate::{
    db::{
        connection::Database,
        helpers::{
            decode_string_set, encode_string_set, format_datetime, is_unique_violation, now,
            parse_datetime, parse_optional_datetime, parse_source, to_i64, to_storage_precision,
            to_u64,
        },
        models::{
            game::normalize_set, GameOrder, GameRecord, GameSource, ImportSummary, NewGame,
            UpdateGame,
        },
    },
    error::LibraryError,
};

const GAME_COLUMNS: &str = "id, owner_id, title, app_id, source, play_time, genres, tags, \
     install_path, last_played, image_url, description, created_at, updated_at";

fn row_to_game(row: &Row) -> Result<GameRecord> {
    let source: String = row.get("source")?;
    let play_time: i64 = row.get("play_time")?;
    let genres: String = row.get("genres")?;
    let tags: String = row.get("tags")?;
    let last_played: Option<String> = row.get("last_played")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(GameRecord {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        app_id: row.get("app_id")?,
        source: parse_source(&source)?,
        play_time: to_u64(play_time, "play_time")?,
        genres: decode_string_set(&genres, "genres")?,
        tags: decode_string_set(&tags, "tags")?,
        install_path: row.get("install_path")?,
        last_played: parse_optional_datetime(last_played, "last_played")?,
        image_url: row.get("image_url")?,
        description: row.get("description")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

pub(crate) fn find_owned_game(
    conn: &Connection,
    owner_id: &str,
    game_id: &str,
) -> Result<Option<GameRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GAME_COLUMNS} FROM games WHERE id = ?1 AND owner_id = ?2"
    ))?;
    let mut rows = stmt.query(params![game_id, owner_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_game(row)?)),
        None => Ok(None),
    }
}

fn require_owned_game(conn: &Connection, owner_id: &str, game_id: &str) -> Result<GameRecord> {
    find_owned_game(conn, owner_id, game_id)?
        .ok_or_else(|| LibraryError::not_found("Game not found").into())
}

/// Insert a game. Returns `Ok(None)` when (owner, title) is already taken.
fn insert_game(
    conn: &Connection,
    owner_id: &str,
    source: GameSource,
    game: NewGame,
) -> Result<Option<GameRecord>> {
    let created_at = now();
    let record = GameRecord {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        title: game.title.trim().to_string(),
        app_id: game.app_id,
        source,
        play_time: game.play_time,
        genres: normalize_set(game.genres),
        tags: normalize_set(game.tags),
        install_path: game.install_path,
        last_played: None,
        image_url: game.image_url,
        description: game.description,
        created_at,
        updated_at: created_at,
    };

    let inserted = conn.execute(
        &format!(
            "INSERT INTO games ({GAME_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
        ),
        params![
            record.id,
            record.owner_id,
            record.title,
            record.app_id,
            record.source.as_str(),
            to_i64(record.play_time)?,
            encode_string_set(&record.genres)?,
            encode_string_set(&record.tags)?,
            record.install_path,
            Option::<String>::None,
            record.image_url,
            record.description,
            format_datetime(&record.created_at),
            format_datetime(&record.updated_at),
        ],
    );

    match inserted {
        Ok(_) => Ok(Some(record)),
        Err(err) if is_unique_violation(&err) => Ok(None),
        Err(err) => Err(err).context("failed to insert game"),
    }
}

impl Database {
    pub async fn list_games(
        &self,
        owner_id: &str,
        source: Option<GameSource>,
        order: GameOrder,
    ) -> Result<Vec<GameRecord>> {
        let owner_id = owner_id.to_string();
        self.execute(move |conn| {
            let mut query = format!("SELECT {GAME_COLUMNS} FROM games WHERE owner_id = ?1");
            let source_str = source.map(|s| s.as_str());
            let mut params_vec: Vec<&dyn ToSql> = vec![&owner_id];
            if let Some(source) = source_str.as_ref() {
                query.push_str(" AND source = ?2");
                params_vec.push(source);
            }
            query.push_str(" ORDER BY ");
            query.push_str(order.sql());

            let mut stmt = conn.prepare(&query)?;
            let mut rows = stmt.query(params_vec.as_slice())?;
            let mut games = Vec::new();
            while let Some(row) = rows.next()? {
                games.push(row_to_game(row)?);
            }
            Ok(games)
        })
        .await
    }

    pub async fn get_game(&self, owner_id: &str, game_id: &str) -> Result<GameRecord> {
        let owner_id = owner_id.to_string();
        let game_id = game_id.to_string();
        self.execute(move |conn| require_owned_game(conn, &owner_id, &game_id))
            .await
    }

    /// Add a manually entered game.
    pub async fn create_manual_game(&self, owner_id: &str, game: NewGame) -> Result<GameRecord> {
        if game.title.trim().is_empty() {
            return Err(LibraryError::invalid_input("Game title is required").into());
        }

        let owner_id = owner_id.to_string();
        self.execute(move |conn| {
            insert_game(conn, &owner_id, GameSource::Manual, game)?.ok_or_else(|| {
                LibraryError::conflict("This game already exists in your library").into()
            })
        })
        .await
    }

    pub async fn update_game(
        &self,
        owner_id: &str,
        game_id: &str,
        changes: UpdateGame,
    ) -> Result<GameRecord> {
        if let Some(play_time) = changes.play_time {
            if play_time < 0 {
                return Err(LibraryError::invalid_input("playTime must be zero or greater").into());
            }
        }

        let owner_id = owner_id.to_string();
        let game_id = game_id.to_string();
        self.execute(move |conn| {
            if changes.is_empty() {
                return require_owned_game(conn, &owner_id, &game_id);
            }

            let tx = conn.transaction()?;
            let mut game = require_owned_game(&tx, &owner_id, &game_id)?;

            if let Some(play_time) = changes.play_time {
                game.play_time = play_time as u64;
            }
            if let Some(genres) = changes.genres {
                game.genres = normalize_set(genres);
            }
            if let Some(tags) = changes.tags {
                game.tags = normalize_set(tags);
            }
            if let Some(last_played) = changes.last_played {
                game.last_played = last_played.map(to_storage_precision);
            }
            game.updated_at = now();

            tx.execute(
                "UPDATE games
                 SET play_time = ?1,
                     genres = ?2,
                     tags = ?3,
                     last_played = ?4,
                     updated_at = ?5
                 WHERE id = ?6 AND owner_id = ?7",
                params![
                    to_i64(game.play_time)?,
                    encode_string_set(&game.genres)?,
                    encode_string_set(&game.tags)?,
                    game.last_played.as_ref().map(format_datetime),
                    format_datetime(&game.updated_at),
                    game.id,
                    game.owner_id,
                ],
            )
            .context("failed to update game")?;
            tx.commit()?;

            Ok(game)
        })
        .await
    }

    /// Manual override of the cumulative playtime.
    pub async fn set_play_time(
        &self,
        owner_id: &str,
        game_id: &str,
        play_time: i64,
    ) -> Result<GameRecord> {
        if play_time < 0 {
            return Err(LibraryError::invalid_input("Valid playtime is required").into());
        }

        let owner_id = owner_id.to_string();
        let game_id = game_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE games SET play_time = ?1, updated_at = ?2
                 WHERE id = ?3 AND owner_id = ?4",
                params![
                    play_time,
                    format_datetime(&now()),
                    game_id,
                    owner_id
                ],
            )?;

            if rows_affected == 0 {
                return Err(LibraryError::not_found("Game not found").into());
            }

            require_owned_game(conn, &owner_id, &game_id)
        })
        .await
    }

    /// Delete a game. Its play sessions go with it via ON DELETE CASCADE.
    pub async fn delete_game(&self, owner_id: &str, game_id: &str) -> Result<()> {
        let owner_id = owner_id.to_string();
        let game_id = game_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "DELETE FROM games WHERE id = ?1 AND owner_id = ?2",
                params![game_id, owner_id],
            )?;

            if rows_affected == 0 {
                return Err(LibraryError::not_found("Game not found").into());
            }
            Ok(())
        })
        .await
    }

    /// Merge scanned candidates into the library, skipping titles already present.
    pub async fn import_local_games(
        &self,
        owner_id: &str,
        candidates: Vec<NewGame>,
    ) -> Result<ImportSummary> {
        let owner_id = owner_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let mut summary = ImportSummary {
                total: candidates.len(),
                ..ImportSummary::default()
            };

            for candidate in candidates {
                let existing: Option<String> = tx
                    .query_row(
                        "SELECT id FROM games
                         WHERE owner_id = ?1 AND title = ?2 AND source = ?3",
                        params![owner_id, candidate.title.trim(), GameSource::Local.as_str()],
                        |row| row.get(0),
                    )
                    .optional()?;

                if existing.is_some() {
                    summary.skipped += 1;
                    continue;
                }

                // A same-titled steam/manual entry also blocks the import.
                match insert_game(&tx, &owner_id, GameSource::Local, candidate)? {
                    Some(_) => summary.imported += 1,
                    None => summary.skipped += 1,
                }
            }

            tx.commit()?;
            Ok(summary)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::{tempdir, TempDir};

    fn open_db() -> Result<(TempDir, Database)> {
        let dir = tempdir()?;
        let db = Database::new(dir.path().join("games.sqlite3"))?;
        Ok((dir, db))
    }

    fn manual(title: &str, play_time: u64, genres: &[&str]) -> NewGame {
        NewGame {
            title: title.to_string(),
            play_time,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            ..NewGame::default()
        }
    }

    #[tokio::test]
    async fn duplicate_title_is_a_conflict() -> Result<()> {
        let (_dir, db) = open_db()?;
        db.create_manual_game("alice", manual("Hades", 0, &[])).await?;

        let err = db
            .create_manual_game("alice", manual("Hades", 5, &[]))
            .await
            .unwrap_err();
        assert!(matches!(LibraryError::from(err), LibraryError::Conflict(_)));

        let games = db.list_games("alice", None, GameOrder::TitleAsc).await?;
        assert_eq!(games.len(), 1);

        // Titles are only unique per owner.
        db.create_manual_game("bob", manual("Hades", 0, &[])).await?;
        Ok(())
    }

    #[tokio::test]
    async fn blank_title_is_invalid() -> Result<()> {
        let (_dir, db) = open_db()?;
        let err = db
            .create_manual_game("alice", manual("   ", 0, &[]))
            .await
            .unwrap_err();
        assert!(matches!(LibraryError::from(err), LibraryError::InvalidInput(_)));
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_and_sorts() -> Result<()> {
        let (_dir, db) = open_db()?;
        db.create_manual_game("alice", manual("Celeste", 30, &[])).await?;
        db.create_manual_game("alice", manual("anno 1800", 500, &[])).await?;
        db.import_local_games("alice", vec![manual("Braid", 0, &[])])
            .await?;

        let by_title = db.list_games("alice", None, GameOrder::TitleAsc).await?;
        let titles: Vec<_> = by_title.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Braid", "Celeste", "anno 1800"]);

        let by_play_time = db.list_games("alice", None, GameOrder::PlayTimeDesc).await?;
        assert_eq!(by_play_time[0].title, "anno 1800");

        let recent = db.list_games("alice", None, GameOrder::RecentlyAdded).await?;
        assert_eq!(recent[0].title, "Braid");

        let local = db
            .list_games("alice", Some(GameSource::Local), GameOrder::TitleAsc)
            .await?;
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].source, GameSource::Local);
        Ok(())
    }

    #[tokio::test]
    async fn partial_update_only_touches_given_fields() -> Result<()> {
        let (_dir, db) = open_db()?;
        let game = db
            .create_manual_game("alice", manual("Hades", 10, &["Roguelike"]))
            .await?;
        let played = Utc::now() - Duration::days(3);

        let updated = db
            .update_game(
                "alice",
                &game.id,
                UpdateGame {
                    tags: Some(vec!["Favorite".into(), "Favorite".into()]),
                    last_played: Some(Some(played)),
                    ..UpdateGame::default()
                },
            )
            .await?;
        assert_eq!(updated.play_time, 10);
        assert_eq!(updated.genres, vec!["Roguelike"]);
        assert_eq!(updated.tags, vec!["Favorite"]);

        let reloaded = db.get_game("alice", &game.id).await?;
        assert_eq!(reloaded.last_played, Some(to_storage_precision(played)));
        assert_eq!(reloaded, updated);

        let cleared = db
            .update_game(
                "alice",
                &game.id,
                UpdateGame {
                    last_played: Some(None),
                    ..UpdateGame::default()
                },
            )
            .await?;
        assert_eq!(cleared.last_played, None);

        // Nothing to change leaves the record untouched.
        let unchanged = db
            .update_game("alice", &game.id, UpdateGame::default())
            .await?;
        assert_eq!(unchanged, cleared);
        Ok(())
    }

    #[tokio::test]
    async fn other_owners_cannot_touch_a_game() -> Result<()> {
        let (_dir, db) = open_db()?;
        let game = db.create_manual_game("alice", manual("Hades", 0, &[])).await?;

        let update = db
            .update_game("mallory", &game.id, UpdateGame::default())
            .await
            .unwrap_err();
        assert!(matches!(LibraryError::from(update), LibraryError::NotFound(_)));

        let delete = db.delete_game("mallory", &game.id).await.unwrap_err();
        assert!(matches!(LibraryError::from(delete), LibraryError::NotFound(_)));

        let play_time = db.set_play_time("mallory", &game.id, 5).await.unwrap_err();
        assert!(matches!(LibraryError::from(play_time), LibraryError::NotFound(_)));

        db.delete_game("alice", &game.id).await?;
        assert!(db.list_games("alice", None, GameOrder::Inserted).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn set_play_time_rejects_negative_values() -> Result<()> {
        let (_dir, db) = open_db()?;
        let game = db.create_manual_game("alice", manual("Hades", 0, &[])).await?;

        let err = db.set_play_time("alice", &game.id, -1).await.unwrap_err();
        assert!(matches!(LibraryError::from(err), LibraryError::InvalidInput(_)));

        let updated = db.set_play_time("alice", &game.id, 125).await?;
        assert_eq!(updated.play_time, 125);
        Ok(())
    }

    #[tokio::test]
    async fn import_skips_existing_titles() -> Result<()> {
        let (_dir, db) = open_db()?;
        db.create_manual_game("alice", manual("Celeste", 0, &[])).await?;

        let first = db
            .import_local_games(
                "alice",
                vec![manual("Braid", 0, &[]), manual("Celeste", 0, &[])],
            )
            .await?;
        assert_eq!(
            first,
            ImportSummary {
                imported: 1,
                skipped: 1,
                total: 2
            }
        );

        let second = db
            .import_local_games("alice", vec![manual("Braid", 0, &[])])
            .await?;
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped, 1);
        Ok(())
    }
}
