//! Game record models.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameSource {
    Steam,
    Local,
    Manual,
}

impl GameSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameSource::Steam => "steam",
            GameSource::Local => "local",
            GameSource::Manual => "manual",
        }
    }
}

impl fmt::Display for GameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameSource {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "steam" => Ok(GameSource::Steam),
            "local" => Ok(GameSource::Local),
            "manual" => Ok(GameSource::Manual),
            other => Err(anyhow!("unknown game source '{other}'")),
        }
    }
}

/// A game owned by one owner. Playtime is in whole minutes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub app_id: String,
    pub source: GameSource,
    pub play_time: u64,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub install_path: String,
    pub last_played: Option<DateTime<Utc>>,
    pub image_url: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when a game record is inserted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewGame {
    pub title: String,
    pub app_id: String,
    pub play_time: u64,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub install_path: String,
    pub image_url: String,
    pub description: String,
}

/// Partial update. `last_played: Some(None)` clears the timestamp.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGame {
    #[serde(default)]
    pub play_time: Option<i64>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub last_played: Option<Option<DateTime<Utc>>>,
}

impl UpdateGame {
    pub fn is_empty(&self) -> bool {
        self.play_time.is_none()
            && self.genres.is_none()
            && self.tags.is_none()
            && self.last_played.is_none()
    }
}

// Present-but-null must stay distinguishable from absent.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Ordering for game listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOrder {
    TitleAsc,
    PlayTimeDesc,
    PlayTimeAsc,
    RecentlyAdded,
    Inserted,
}

impl GameOrder {
    pub(crate) fn sql(&self) -> &'static str {
        match self {
            GameOrder::TitleAsc => "title ASC, rowid ASC",
            GameOrder::PlayTimeDesc => "play_time DESC, rowid ASC",
            GameOrder::PlayTimeAsc => "play_time ASC, rowid ASC",
            GameOrder::RecentlyAdded => "created_at DESC, rowid DESC",
            GameOrder::Inserted => "rowid ASC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub total: usize,
}

/// Drop blank and repeated entries, keeping first-seen order.
pub fn normalize_set(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
