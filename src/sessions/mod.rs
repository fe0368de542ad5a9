pub mod tracker;

pub use tracker::{SessionTracker, MAX_HISTORY_LIMIT};
