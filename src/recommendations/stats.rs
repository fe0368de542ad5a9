use std::collections::HashMap;

use serde::Serialize;

use crate::db::{GameRecord, GameSource};

const TOP_GENRES: usize = 5;
const MOST_PLAYED: usize = 5;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SourceCounts {
    pub steam: usize,
    pub local: usize,
    pub manual: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayedGame {
    pub title: String,
    pub play_time: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    pub total_games: usize,
    pub total_playtime: u64,
    pub average_playtime: f64,
    pub by_source: SourceCounts,
    pub top_genres: Vec<GenreCount>,
    pub most_played: Vec<PlayedGame>,
}

/// Aggregate statistics over `games`, taken in insertion order.
pub fn library_stats(games: &[GameRecord]) -> LibraryStats {
    let total_games = games.len();
    let total_playtime: u64 = games.iter().map(|game| game.play_time).sum();
    let average_playtime = if total_games > 0 {
        total_playtime as f64 / total_games as f64
    } else {
        0.0
    };

    let mut by_source = SourceCounts::default();
    for game in games {
        match game.source {
            GameSource::Steam => by_source.steam += 1,
            GameSource::Local => by_source.local += 1,
            GameSource::Manual => by_source.manual += 1,
        }
    }

    LibraryStats {
        total_games,
        total_playtime,
        average_playtime,
        by_source,
        top_genres: top_genres(games),
        most_played: most_played(games),
    }
}

fn top_genres(games: &[GameRecord]) -> Vec<GenreCount> {
    // First-seen order is the tie breaker, so keep a Vec and index into it.
    let mut counts: Vec<GenreCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for genre in games.iter().flat_map(|game| game.genres.iter()) {
        match index.get(genre.as_str()) {
            Some(&position) => counts[position].count += 1,
            None => {
                index.insert(genre.as_str(), counts.len());
                counts.push(GenreCount {
                    genre: genre.clone(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_GENRES);
    counts
}

fn most_played(games: &[GameRecord]) -> Vec<PlayedGame> {
    let mut ranked: Vec<&GameRecord> = games.iter().collect();
    ranked.sort_by(|a, b| b.play_time.cmp(&a.play_time));
    ranked
        .into_iter()
        .take(MOST_PLAYED)
        .map(|game| PlayedGame {
            title: game.title.clone(),
            play_time: game.play_time,
        })
        .collect()
}
