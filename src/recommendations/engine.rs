use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::{
    db::{Database, GameOrder, GameRecord},
    error::LibraryResult,
    recommendations::{
        config::RecommendationConfig,
        stats::{library_stats, LibraryStats},
        strategies::{backlog_busters, genre_matches, revisits, Recommendation},
    },
};

/// Run every strategy over `games` (expected in ascending playtime order)
/// and merge the results.
///
/// Earlier strategies win duplicates: a game picked by Backlog Buster is not
/// repeated under Genre Match or Revisit. The merged list is stably sorted by
/// score and cut to `config.max_results`.
pub fn recommend(
    games: &[GameRecord],
    favorite_genres: &[String],
    now: DateTime<Utc>,
    config: &RecommendationConfig,
) -> Vec<Recommendation> {
    if games.is_empty() {
        return Vec::new();
    }

    let candidates = backlog_busters(games, config)
        .into_iter()
        .chain(genre_matches(games, favorite_genres, config))
        .chain(revisits(games, now, config));

    let mut seen = HashSet::new();
    let mut merged: Vec<Recommendation> = candidates
        .filter(|rec| seen.insert(rec.game.id.clone()))
        .collect();

    // sort_by is stable, so equal scores keep strategy order.
    merged.sort_by(|a, b| b.score.total_cmp(&a.score));
    merged.truncate(config.max_results);
    merged
}

/// Loads an owner's library and preferences and derives suggestions from them.
#[derive(Clone)]
pub struct RecommendationEngine {
    db: Database,
    config: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(db: Database, config: RecommendationConfig) -> Self {
        Self { db, config }
    }

    pub async fn recommendations(&self, owner_id: &str) -> LibraryResult<Vec<Recommendation>> {
        let games = self
            .db
            .list_games(owner_id, None, GameOrder::PlayTimeAsc)
            .await?;
        if games.is_empty() {
            return Ok(Vec::new());
        }

        let preferences = self.db.get_preferences(owner_id).await?;
        Ok(recommend(
            &games,
            &preferences.favorite_genres,
            Utc::now(),
            &self.config,
        ))
    }

    pub async fn stats(&self, owner_id: &str) -> LibraryResult<LibraryStats> {
        let games = self
            .db
            .list_games(owner_id, None, GameOrder::Inserted)
            .await?;
        Ok(library_stats(&games))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{GameSource, NewGame, UpdateGame},
        recommendations::strategies::RecommendationReason,
    };
    use chrono::Duration;
    use tempfile::tempdir;

    fn game(id: &str, play_time: u64, genres: &[&str], last_played: Option<DateTime<Utc>>) -> GameRecord {
        let now = Utc::now();
        GameRecord {
            id: id.to_string(),
            owner_id: "alice".to_string(),
            title: id.to_string(),
            app_id: String::new(),
            source: GameSource::Manual,
            play_time,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            tags: Vec::new(),
            install_path: String::new(),
            last_played,
            image_url: String::new(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn by_play_time(mut games: Vec<GameRecord>) -> Vec<GameRecord> {
        games.sort_by_key(|g| g.play_time);
        games
    }

    #[test]
    fn worked_example_ranks_and_dedups() {
        let now = Utc::now();
        let games = by_play_time(vec![
            game("A", 10, &[], None),
            game("B", 200, &[], Some(now - Duration::days(40))),
            game("C", 0, &["RPG"], None),
        ]);
        let favorites = vec!["RPG".to_string()];

        let recs = recommend(&games, &favorites, now, &RecommendationConfig::default());
        let summary: Vec<_> = recs
            .iter()
            .map(|r| (r.game.id.as_str(), r.reason, r.score))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("C", RecommendationReason::BacklogBuster, 10.0),
                ("A", RecommendationReason::BacklogBuster, 9.0),
                ("B", RecommendationReason::Revisit, 6.0),
            ]
        );
    }

    #[test]
    fn earlier_strategy_wins_duplicates() {
        let now = Utc::now();
        // 100 minutes: too much for backlog, fine for genre match and revisit.
        let games = vec![game("X", 100, &["Strategy"], None)];
        let favorites = vec!["strategy".to_string()];

        let recs = recommend(&games, &favorites, now, &RecommendationConfig::default());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].reason, RecommendationReason::GenreMatch);
    }

    #[test]
    fn output_is_sorted_and_capped() {
        let now = Utc::now();
        let mut games = Vec::new();
        for i in 0..6 {
            games.push(game(&format!("backlog{i}"), i * 5, &[], None));
        }
        for i in 0..6 {
            games.push(game(&format!("genre{i}"), 100 + i, &["Puzzle"], Some(now)));
        }
        for i in 0..4 {
            games.push(game(&format!("old{i}"), 500 + i, &[], None));
        }
        let games = by_play_time(games);
        let favorites = vec!["puzzle".to_string()];

        let recs = recommend(&games, &favorites, now, &RecommendationConfig::default());
        assert_eq!(recs.len(), 10);
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));

        let ids: HashSet<_> = recs.iter().map(|r| r.game.id.clone()).collect();
        assert_eq!(ids.len(), recs.len());

        // 5 backlog + 5 genre fill the list before any revisit at score 6.
        assert!(recs
            .iter()
            .all(|r| r.reason != RecommendationReason::Revisit));
        assert_eq!(recs[5].game.id, "genre0");
    }

    #[test]
    fn empty_library_yields_nothing() {
        let recs = recommend(&[], &["RPG".to_string()], Utc::now(), &RecommendationConfig::default());
        assert!(recs.is_empty());
    }

    #[tokio::test]
    async fn engine_reads_library_and_preferences() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let db = Database::new(dir.path().join("engine.sqlite3"))?;
        let engine = RecommendationEngine::new(db.clone(), RecommendationConfig::default());

        assert!(engine.recommendations("alice").await?.is_empty());

        let played = db
            .create_manual_game(
                "alice",
                NewGame {
                    title: "Disco Elysium".into(),
                    play_time: 150,
                    genres: vec!["CRPG".into()],
                    ..NewGame::default()
                },
            )
            .await?;
        db.update_game(
            "alice",
            &played.id,
            UpdateGame {
                last_played: Some(Some(Utc::now())),
                ..UpdateGame::default()
            },
        )
        .await?;

        assert!(engine.recommendations("alice").await?.is_empty());

        db.set_favorite_genres("alice", vec!["rpg".into()]).await?;
        let recs = engine.recommendations("alice").await?;
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].reason, RecommendationReason::GenreMatch);
        assert_eq!(recs[0].description, "Matches your favorite genres: CRPG");
        Ok(())
    }
}
