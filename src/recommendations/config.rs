/// Thresholds for the recommendation strategies.
#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    /// Backlog Buster: games played for less than this many minutes
    pub backlog_max_minutes: u64,
    pub backlog_limit: usize,

    /// Genre Match: favorite-genre games played for less than this many minutes
    pub genre_max_minutes: u64,
    pub genre_limit: usize,
    pub genre_score: f64,

    /// Revisit: played games untouched for longer than this many days
    pub revisit_after_days: i64,
    pub revisit_limit: usize,
    pub revisit_score: f64,

    /// Final list length after dedup and sorting
    pub max_results: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            backlog_max_minutes: 60,
            backlog_limit: 5,
            genre_max_minutes: 180,
            genre_limit: 5,
            genre_score: 8.0,
            revisit_after_days: 30,
            revisit_limit: 3,
            revisit_score: 6.0,
            max_results: 10,
        }
    }
}
