use std::path::{Path, PathBuf};

use crate::{config::expand_home, db::NewGame};

use super::heuristics::looks_like_game_dir;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

pub const LOCAL_GAME_TAG: &str = "Local Game";

/// A directory the heuristics flagged as an installed game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedGame {
    pub title: String,
    pub install_path: PathBuf,
}

impl ScannedGame {
    /// Shape the candidate as a library record: no playtime, tagged as local.
    pub fn into_new_game(self) -> NewGame {
        let install_path = self.install_path.display().to_string();
        NewGame {
            title: self.title,
            description: format!("Game found in: {install_path}"),
            install_path,
            tags: vec![LOCAL_GAME_TAG.to_string()],
            ..NewGame::default()
        }
    }
}

/// Discovers installed games under a fixed set of root directories.
#[derive(Debug, Clone)]
pub struct LocalScanner {
    roots: Vec<PathBuf>,
}

impl LocalScanner {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Scan the configured roots. Blocking; run it off the async executor.
    pub fn scan(&self) -> Vec<ScannedGame> {
        scan_roots(&self.roots)
    }

    /// Scan caller-supplied roots instead of the configured ones.
    pub fn scan_custom<S: AsRef<str>>(&self, paths: &[S]) -> Vec<ScannedGame> {
        let roots: Vec<PathBuf> = paths.iter().map(|p| expand_home(p.as_ref().trim())).collect();
        scan_roots(&roots)
    }
}

fn scan_roots(roots: &[PathBuf]) -> Vec<ScannedGame> {
    let mut found = Vec::new();

    for root in roots {
        if !root.is_dir() {
            log_warn!("Scan path not found: {}", root.display());
            continue;
        }

        match scan_root(root) {
            Ok(mut games) => found.append(&mut games),
            Err(err) => log_error!("Error scanning {}: {err}", root.display()),
        }
    }

    log_info!("Found {} local games", found.len());
    found
}

fn scan_root(root: &Path) -> std::io::Result<Vec<ScannedGame>> {
    let mut games = Vec::new();

    for entry in std::fs::read_dir(root)?.flatten() {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        let path = entry.path();
        if looks_like_game_dir(&path) {
            games.push(ScannedGame {
                title: entry.file_name().to_string_lossy().into_owned(),
                install_path: path,
            });
        }
    }

    games.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_game_directories_under_roots() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("common");
        fs::create_dir_all(root.join("Hades"))?;
        fs::create_dir_all(root.join("Terraria"))?;
        fs::create_dir_all(root.join("Screenshots"))?;
        fs::write(root.join("Hades").join("Hades.exe"), b"")?;
        fs::write(root.join("Terraria").join("appmanifest.acf"), b"")?;
        fs::write(root.join("Screenshots").join("shot.png"), b"")?;
        fs::write(root.join("loose_file.sh"), b"")?;

        let scanner = LocalScanner::new(vec![root.clone(), dir.path().join("absent")]);
        let games = scanner.scan();

        let titles: Vec<_> = games.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Hades", "Terraria"]);
        assert_eq!(games[0].install_path, root.join("Hades"));
        Ok(())
    }

    #[test]
    fn custom_paths_replace_configured_roots() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("Braid"))?;
        fs::write(dir.path().join("Braid").join("run_braid"), b"")?;

        let scanner = LocalScanner::new(Vec::new());
        assert!(scanner.scan().is_empty());

        let custom = vec![dir.path().display().to_string()];
        let games = scanner.scan_custom(&custom[..]);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].title, "Braid");
        Ok(())
    }

    #[test]
    fn candidate_becomes_local_record_shape() {
        let game = ScannedGame {
            title: "Braid".into(),
            install_path: PathBuf::from("/games/Braid"),
        }
        .into_new_game();

        assert_eq!(game.title, "Braid");
        assert_eq!(game.play_time, 0);
        assert_eq!(game.tags, vec![LOCAL_GAME_TAG]);
        assert!(game.genres.is_empty());
        assert_eq!(game.install_path, "/games/Braid");
        assert_eq!(game.description, "Game found in: /games/Braid");
    }
}
