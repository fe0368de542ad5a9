use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-owner preferences read by the recommendation engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OwnerPreferences {
    pub owner_id: String,
    pub favorite_genres: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OwnerPreferences {
    pub fn empty(owner_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            ..Self::default()
        }
    }
}

/// Trim, drop blanks and case-insensitive repeats, keeping the first spelling.
pub fn normalize_genres(genres: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    genres
        .into_iter()
        .map(|genre| genre.trim().to_string())
        .filter(|genre| !genre.is_empty())
        .filter(|genre| seen.insert(genre.to_lowercase()))
        .collect()
}
