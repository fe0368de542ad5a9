pub mod config;
pub mod engine;
pub mod stats;
pub mod strategies;

pub use config::RecommendationConfig;
pub use engine::{recommend, RecommendationEngine};
pub use stats::{library_stats, LibraryStats};
pub use strategies::{Recommendation, RecommendationReason};
