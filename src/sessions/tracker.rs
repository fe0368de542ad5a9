use chrono::Utc;

use crate::{
    db::{Database, PlaySession, SessionHistory, StoppedSession},
    error::LibraryResult,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

pub const MAX_HISTORY_LIMIT: usize = 50;

/// Start/stop play sessions and fold their durations into game playtime.
///
/// Durations come from wall-clock timestamps captured at stop time, never
/// from an incrementally ticking counter.
#[derive(Clone)]
pub struct SessionTracker {
    db: Database,
}

impl SessionTracker {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn start(&self, owner_id: &str, game_id: &str) -> LibraryResult<PlaySession> {
        let session = self.db.start_session(owner_id, game_id, Utc::now()).await?;
        log_info!(
            "Started play session {} for game {} (owner {})",
            session.id,
            game_id,
            owner_id
        );
        Ok(session)
    }

    pub async fn stop(&self, owner_id: &str, game_id: &str) -> LibraryResult<StoppedSession> {
        let stopped = self.db.stop_session(owner_id, game_id, Utc::now()).await?;
        log_info!(
            "Stopped play session {} after {} min; game {} now at {} min",
            stopped.session.id,
            stopped.session.duration,
            game_id,
            stopped.total_play_time
        );
        Ok(stopped)
    }

    pub async fn active(
        &self,
        owner_id: &str,
        game_id: &str,
    ) -> LibraryResult<Option<PlaySession>> {
        Ok(self.db.get_active_session(owner_id, game_id).await?)
    }

    /// Closed sessions, newest first, capped at [`MAX_HISTORY_LIMIT`].
    pub async fn history(
        &self,
        owner_id: &str,
        game_id: &str,
        limit: Option<usize>,
    ) -> LibraryResult<SessionHistory> {
        let limit = limit
            .unwrap_or(MAX_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        let sessions = self
            .db
            .list_closed_sessions(owner_id, game_id, limit)
            .await?;
        Ok(SessionHistory::from_sessions(sessions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::NewGame, error::LibraryError};
    use anyhow::Result;
    use tempfile::{tempdir, TempDir};

    async fn tracker_with_game(play_time: u64) -> Result<(TempDir, SessionTracker, Database, String)> {
        let dir = tempdir()?;
        let db = Database::new(dir.path().join("tracker.sqlite3"))?;
        let game = db
            .create_manual_game(
                "alice",
                NewGame {
                    title: "Outer Wilds".into(),
                    play_time,
                    ..NewGame::default()
                },
            )
            .await?;
        Ok((dir, SessionTracker::new(db.clone()), db, game.id))
    }

    #[tokio::test]
    async fn immediate_stop_adds_nothing() -> Result<()> {
        let (_dir, tracker, db, game_id) = tracker_with_game(75).await?;

        let started = tracker.start("alice", &game_id).await?;
        assert!(started.is_active);
        assert_eq!(
            tracker.active("alice", &game_id).await?.map(|s| s.id),
            Some(started.id.clone())
        );

        let stopped = tracker.stop("alice", &game_id).await?;
        assert_eq!(stopped.session.id, started.id);
        assert_eq!(stopped.session.duration, 0);
        assert_eq!(stopped.total_play_time, 75);

        let game = db.get_game("alice", &game_id).await?;
        assert_eq!(game.play_time, 75);
        assert_eq!(game.last_played, stopped.session.end_time);
        assert!(game.last_played.is_some());
        assert!(tracker.active("alice", &game_id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn double_start_and_orphan_stop_fail() -> Result<()> {
        let (_dir, tracker, _db, game_id) = tracker_with_game(0).await?;

        assert!(matches!(
            tracker.stop("alice", &game_id).await,
            Err(LibraryError::NotFound(_))
        ));

        tracker.start("alice", &game_id).await?;
        assert!(matches!(
            tracker.start("alice", &game_id).await,
            Err(LibraryError::Conflict(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn history_sums_closed_durations() -> Result<()> {
        let (_dir, tracker, _db, game_id) = tracker_with_game(0).await?;
        tracker.start("alice", &game_id).await?;
        tracker.stop("alice", &game_id).await?;
        tracker.start("alice", &game_id).await?;

        let history = tracker.history("alice", &game_id, None).await?;
        assert_eq!(history.count, 1);
        assert_eq!(history.total_play_time, 0);

        let clamped = tracker.history("alice", &game_id, Some(0)).await?;
        assert_eq!(clamped.count, 1);
        Ok(())
    }
}
