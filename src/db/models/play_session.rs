//! Play session models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A timed play session for one game. Closed sessions are immutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaySession {
    pub id: String,
    pub owner_id: String,
    pub game_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Whole minutes, set once when the session closes.
    pub duration: u64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlaySession {
    pub fn open(
        id: String,
        owner_id: String,
        game_id: String,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            game_id,
            start_time,
            end_time: None,
            duration: 0,
            is_active: true,
            created_at: start_time,
            updated_at: start_time,
        }
    }

    /// Close the session at `end_time`, deriving the duration in whole minutes.
    pub fn close(mut self, end_time: DateTime<Utc>) -> Self {
        self.duration = elapsed_minutes(self.start_time, end_time);
        self.end_time = Some(end_time);
        self.is_active = false;
        self.updated_at = end_time;
        self
    }
}

/// floor((end - start) in minutes), never negative.
pub fn elapsed_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    (end - start).num_minutes().max(0) as u64
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoppedSession {
    pub session: PlaySession,
    pub total_play_time: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistory {
    pub sessions: Vec<PlaySession>,
    pub total_play_time: u64,
    pub count: usize,
}

impl SessionHistory {
    pub fn from_sessions(sessions: Vec<PlaySession>) -> Self {
        let total_play_time = sessions.iter().map(|session| session.duration).sum();
        Self {
            count: sessions.len(),
            sessions,
            total_play_time,
        }
    }
}
