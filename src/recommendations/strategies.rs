use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::db::GameRecord;
use crate::recommendations::config::RecommendationConfig;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum RecommendationReason {
    #[serde(rename = "Backlog Buster")]
    BacklogBuster,
    #[serde(rename = "Genre Match")]
    GenreMatch,
    #[serde(rename = "Revisit")]
    Revisit,
}

/// A suggested game. Built fresh for every query and never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub game: GameRecord,
    pub reason: RecommendationReason,
    pub description: String,
    pub score: f64,
}

/// Barely played games, in the order given. Score drops 1 per 10 minutes played.
pub fn backlog_busters(games: &[GameRecord], config: &RecommendationConfig) -> Vec<Recommendation> {
    games
        .iter()
        .filter(|game| game.play_time < config.backlog_max_minutes)
        .take(config.backlog_limit)
        .map(|game| Recommendation {
            game: game.clone(),
            reason: RecommendationReason::BacklogBuster,
            description: format!(
                "You've only played this for {} minutes. Give it a try!",
                game.play_time
            ),
            score: 10.0 - game.play_time as f64 / 10.0,
        })
        .collect()
}

/// Lightly played games whose genres contain one of the favorites (case-insensitive).
pub fn genre_matches(
    games: &[GameRecord],
    favorite_genres: &[String],
    config: &RecommendationConfig,
) -> Vec<Recommendation> {
    if favorite_genres.is_empty() {
        return Vec::new();
    }

    let favorites: Vec<String> = favorite_genres
        .iter()
        .map(|genre| genre.to_lowercase())
        .collect();

    games
        .iter()
        .filter(|game| game.play_time < config.genre_max_minutes)
        .filter_map(|game| {
            let matched = matched_genres(game, &favorites);
            (!matched.is_empty()).then_some((game, matched))
        })
        .take(config.genre_limit)
        .map(|(game, matched)| Recommendation {
            game: game.clone(),
            reason: RecommendationReason::GenreMatch,
            description: format!("Matches your favorite genres: {}", matched.join(", ")),
            score: config.genre_score,
        })
        .collect()
}

fn matched_genres<'a>(game: &'a GameRecord, favorites: &[String]) -> Vec<&'a str> {
    game.genres
        .iter()
        .filter(|genre| {
            let genre = genre.to_lowercase();
            favorites.iter().any(|favorite| genre.contains(favorite.as_str()))
        })
        .map(String::as_str)
        .collect()
}

/// Played games with no recorded activity in the last `revisit_after_days`.
pub fn revisits(
    games: &[GameRecord],
    now: DateTime<Utc>,
    config: &RecommendationConfig,
) -> Vec<Recommendation> {
    let cutoff = now - Duration::days(config.revisit_after_days);

    games
        .iter()
        .filter(|game| game.play_time > 0)
        .filter(|game| match game.last_played {
            Some(last_played) => last_played < cutoff,
            None => true,
        })
        .take(config.revisit_limit)
        .map(|game| Recommendation {
            game: game.clone(),
            reason: RecommendationReason::Revisit,
            description: match game.last_played {
                Some(last_played) => {
                    format!("Haven't played since {}", last_played.format("%Y-%m-%d"))
                }
                None => "Time to revisit this game!".to_string(),
            },
            score: config.revisit_score,
        })
        .collect()
}
