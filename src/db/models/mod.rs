pub mod game;
pub mod play_session;
pub mod preferences;

pub use game::{GameOrder, GameRecord, GameSource, ImportSummary, NewGame, UpdateGame};
pub use play_session::{PlaySession, SessionHistory, StoppedSession};
pub use preferences::OwnerPreferences;
