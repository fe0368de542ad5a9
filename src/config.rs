use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

pub const BIND_ENV: &str = "GAMESHELF_BIND";
pub const DB_PATH_ENV: &str = "GAMESHELF_DB_PATH";
pub const SCAN_PATHS_ENV: &str = "GAME_SCAN_PATHS";

const DEFAULT_BIND: &str = "127.0.0.1:5000";

const DEFAULT_SCAN_PATHS: [&str; 5] = [
    "~/.steam/steam/steamapps/common",
    "~/.local/share/Steam/steamapps/common",
    "~/Games",
    "/usr/share/games",
    "/usr/local/games",
];

/// Process-wide settings, read once at startup and handed to each component.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    /// Already home-expanded.
    pub scan_paths: Vec<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = lookup(BIND_ENV).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind
            .parse()
            .with_context(|| format!("invalid {BIND_ENV} value '{bind}'"))?;

        let db_path = match lookup(DB_PATH_ENV) {
            Some(path) if !path.trim().is_empty() => expand_home(path.trim()),
            _ => default_db_path(),
        };

        let scan_paths = match lookup(SCAN_PATHS_ENV) {
            Some(raw) => parse_scan_paths(&raw),
            None => DEFAULT_SCAN_PATHS.iter().map(|p| expand_home(p)).collect(),
        };

        Ok(Self {
            bind_addr,
            db_path,
            scan_paths,
        })
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gameshelf")
        .join("gameshelf.sqlite3")
}

/// Split a comma-separated path list, trimming entries and dropping blanks.
pub fn parse_scan_paths(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(expand_home)
        .collect()
}

/// Expand a leading `~` to the current user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    expand_home_with(path, dirs::home_dir().as_deref())
}

fn expand_home_with(path: &str, home: Option<&Path>) -> PathBuf {
    let Some(rest) = path.strip_prefix('~') else {
        return PathBuf::from(path);
    };
    let Some(home) = home else {
        return PathBuf::from(path);
    };

    let rest = rest.trim_start_matches(['/', '\\']);
    if rest.is_empty() {
        home.to_path_buf()
    } else {
        home.join(rest)
    }
}
