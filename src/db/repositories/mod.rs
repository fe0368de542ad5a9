pub mod games;
pub mod preferences;
pub mod sessions;
