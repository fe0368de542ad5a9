use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::{
    db::{
        connection::Database,
        helpers::{
            format_datetime, is_unique_violation, parse_datetime, parse_optional_datetime,
            to_i64, to_storage_precision, to_u64,
        },
        models::{PlaySession, StoppedSession},
        repositories::games::find_owned_game,
    },
    error::LibraryError,
};

const SESSION_COLUMNS: &str =
    "id, owner_id, game_id, start_time, end_time, duration, is_active, created_at, updated_at";

fn row_to_session(row: &Row) -> Result<PlaySession> {
    let start_time: String = row.get("start_time")?;
    let end_time: Option<String> = row.get("end_time")?;
    let duration: i64 = row.get("duration")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(PlaySession {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        game_id: row.get("game_id")?,
        start_time: parse_datetime(&start_time, "start_time")?,
        end_time: parse_optional_datetime(end_time, "end_time")?,
        duration: to_u64(duration, "duration")?,
        is_active: row.get("is_active")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn find_active_session(
    conn: &Connection,
    owner_id: &str,
    game_id: &str,
) -> Result<Option<PlaySession>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS}
         FROM play_sessions
         WHERE owner_id = ?1 AND game_id = ?2 AND is_active = 1
         LIMIT 1"
    ))?;

    let mut rows = stmt.query(params![owner_id, game_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_session(row)?)),
        None => Ok(None),
    }
}

impl Database {
    /// Open a session at `started_at`.
    ///
    /// The partial unique index on active rows is what rejects a second open
    /// session, so two processes racing here cannot both succeed.
    pub async fn start_session(
        &self,
        owner_id: &str,
        game_id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<PlaySession> {
        let owner_id = owner_id.to_string();
        let game_id = game_id.to_string();
        self.execute(move |conn| {
            if find_owned_game(conn, &owner_id, &game_id)?.is_none() {
                return Err(LibraryError::not_found("Game not found").into());
            }

            let session = PlaySession::open(
                Uuid::new_v4().to_string(),
                owner_id,
                game_id,
                to_storage_precision(started_at),
            );

            let inserted = conn.execute(
                &format!(
                    "INSERT INTO play_sessions ({SESSION_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    session.id,
                    session.owner_id,
                    session.game_id,
                    format_datetime(&session.start_time),
                    Option::<String>::None,
                    0i64,
                    true,
                    format_datetime(&session.created_at),
                    format_datetime(&session.updated_at),
                ],
            );

            match inserted {
                Ok(_) => Ok(session),
                Err(err) if is_unique_violation(&err) => Err(LibraryError::conflict(
                    "A play session is already active for this game",
                )
                .into()),
                Err(err) => Err(err).context("failed to insert play session"),
            }
        })
        .await
    }

    /// Close the active session at `stopped_at` and fold its duration into the game.
    ///
    /// Both writes share one transaction; the playtime is bumped in SQL so
    /// concurrent writers never lose an increment.
    pub async fn stop_session(
        &self,
        owner_id: &str,
        game_id: &str,
        stopped_at: DateTime<Utc>,
    ) -> Result<StoppedSession> {
        let owner_id = owner_id.to_string();
        let game_id = game_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let active = find_active_session(&tx, &owner_id, &game_id)?
                .ok_or_else(|| LibraryError::not_found("No active play session found"))?;
            // Never end before the start, whatever the clock did.
            let stopped_at = to_storage_precision(stopped_at).max(active.start_time);
            let closed = active.close(stopped_at);

            let rows_affected = tx.execute(
                "UPDATE play_sessions
                 SET end_time = ?1,
                     duration = ?2,
                     is_active = 0,
                     updated_at = ?3
                 WHERE id = ?4 AND is_active = 1",
                params![
                    closed.end_time.as_ref().map(format_datetime),
                    to_i64(closed.duration)?,
                    format_datetime(&closed.updated_at),
                    closed.id,
                ],
            )?;
            if rows_affected == 0 {
                return Err(LibraryError::not_found("No active play session found").into());
            }

            tx.execute(
                "UPDATE games
                 SET play_time = play_time + ?1,
                     last_played = ?2,
                     updated_at = ?2
                 WHERE id = ?3 AND owner_id = ?4",
                params![
                    to_i64(closed.duration)?,
                    format_datetime(&stopped_at),
                    game_id,
                    owner_id,
                ],
            )
            .context("failed to fold session into game playtime")?;

            let total_play_time: i64 = tx.query_row(
                "SELECT play_time FROM games WHERE id = ?1 AND owner_id = ?2",
                params![game_id, owner_id],
                |row| row.get(0),
            )?;

            tx.commit()?;

            Ok(StoppedSession {
                session: closed,
                total_play_time: to_u64(total_play_time, "play_time")?,
            })
        })
        .await
    }

    pub async fn get_active_session(
        &self,
        owner_id: &str,
        game_id: &str,
    ) -> Result<Option<PlaySession>> {
        let owner_id = owner_id.to_string();
        let game_id = game_id.to_string();
        self.execute(move |conn| find_active_session(conn, &owner_id, &game_id))
            .await
    }

    /// Closed sessions, newest start first.
    pub async fn list_closed_sessions(
        &self,
        owner_id: &str,
        game_id: &str,
        limit: usize,
    ) -> Result<Vec<PlaySession>> {
        let owner_id = owner_id.to_string();
        let game_id = game_id.to_string();
        let limit = limit as i64;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS}
                 FROM play_sessions
                 WHERE owner_id = ?1 AND game_id = ?2 AND is_active = 0
                 ORDER BY start_time DESC
                 LIMIT ?3"
            ))?;

            let mut rows = stmt.query(params![owner_id, game_id, limit])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }

            Ok(sessions)
        })
        .await
    }
}
