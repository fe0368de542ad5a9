pub mod heuristics;
pub mod local;

pub use heuristics::looks_like_game_dir;
pub use local::{LocalScanner, ScannedGame};
