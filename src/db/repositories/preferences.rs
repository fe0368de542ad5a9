use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use crate::db::{
    connection::Database,
    helpers::{decode_string_set, encode_string_set, format_datetime, now, parse_datetime},
    models::{preferences::normalize_genres, OwnerPreferences},
};

impl Database {
    /// Stored preferences, or an empty set when the owner never saved any.
    pub async fn get_preferences(&self, owner_id: &str) -> Result<OwnerPreferences> {
        let owner_id = owner_id.to_string();
        self.execute(move |conn| {
            let row: Option<(String, String)> = conn
                .query_row(
                    "SELECT favorite_genres, updated_at
                     FROM owner_preferences WHERE owner_id = ?1",
                    params![owner_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            match row {
                Some((genres, updated_at)) => Ok(OwnerPreferences {
                    owner_id,
                    favorite_genres: decode_string_set(&genres, "favorite_genres")?,
                    updated_at: Some(parse_datetime(&updated_at, "updated_at")?),
                }),
                None => Ok(OwnerPreferences::empty(&owner_id)),
            }
        })
        .await
    }

    /// Replace the owner's favorite genres (upsert).
    pub async fn set_favorite_genres(
        &self,
        owner_id: &str,
        genres: Vec<String>,
    ) -> Result<OwnerPreferences> {
        let owner_id = owner_id.to_string();
        let genres = normalize_genres(genres);
        self.execute(move |conn| {
            let updated_at = now();
            conn.execute(
                "INSERT INTO owner_preferences (owner_id, favorite_genres, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT(owner_id) DO UPDATE SET
                     favorite_genres = excluded.favorite_genres,
                     updated_at = excluded.updated_at",
                params![owner_id, encode_string_set(&genres)?, format_datetime(&updated_at)],
            )?;

            Ok(OwnerPreferences {
                owner_id,
                favorite_genres: genres,
                updated_at: Some(updated_at),
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn preferences_default_to_empty_and_upsert() -> Result<()> {
        let dir = tempdir()?;
        let db = Database::new(dir.path().join("prefs.sqlite3"))?;

        let empty = db.get_preferences("alice").await?;
        assert!(empty.favorite_genres.is_empty());
        assert!(empty.updated_at.is_none());

        db.set_favorite_genres("alice", vec!["RPG".into(), "Puzzle".into()])
            .await?;
        db.set_favorite_genres("alice", vec!["Strategy".into(), "strategy".into()])
            .await?;

        let stored = db.get_preferences("alice").await?;
        assert_eq!(stored.favorite_genres, vec!["Strategy"]);
        assert!(stored.updated_at.is_some());

        assert!(db.get_preferences("bob").await?.favorite_genres.is_empty());
        Ok(())
    }
}
