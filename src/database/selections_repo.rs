// UserSelection repository
// A user's bookmarked segments. Not part of the pipeline core, but the
// segment deletion contract cascades through here.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::models::UserSelection;
use super::DatabaseManager;

impl DatabaseManager {
    /// Bookmark a segment for a user. Idempotent.
    pub fn select_segment(&self, user_id: &str, segment_id: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO user_selections (user_id, segment_id, selected_at)
                 VALUES (?1, ?2, ?3)",
                params![user_id, segment_id, chrono::Utc::now().to_rfc3339()],
            ).context("Failed to select segment")?;
            Ok(())
        })
    }

    /// Remove a user's bookmark
    pub fn unselect_segment(&self, user_id: &str, segment_id: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute(
                "DELETE FROM user_selections WHERE user_id = ? AND segment_id = ?",
                params![user_id, segment_id],
            ).context("Failed to unselect segment")?;
            Ok(())
        })
    }

    /// All bookmarks of one user, newest first
    pub fn selections_for_user(&self, user_id: &str) -> Result<Vec<UserSelection>> {
        self.with_connection(|conn| selections_for_user_impl(conn, user_id))
    }
}

fn selections_for_user_impl(conn: &Connection, user_id: &str) -> Result<Vec<UserSelection>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, segment_id, selected_at FROM user_selections
         WHERE user_id = ? ORDER BY selected_at DESC"
    ).context("Failed to prepare selections_for_user query")?;

    let selections = stmt.query_map(params![user_id], |row| {
        Ok(UserSelection {
            user_id: row.get(0)?,
            segment_id: row.get(1)?,
            selected_at: row.get(2)?,
        })
    }).context("Failed to query selections")?;

    selections.collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to collect selections")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{AudioFile, AudioSegment};
    use tempfile::tempdir;

    #[test]
    fn test_select_is_idempotent_and_cascades() {
        let dir = tempdir().unwrap();
        let db = DatabaseManager::new(dir.path().join("test.db")).unwrap();

        db.create_audio_file(&AudioFile::new(
            "af_1".into(), "user1".into(), "Song".into(), "/tmp/af_1.mp3".into(),
        )).unwrap();
        let segment = AudioSegment::new("seg_1".into(), "af_1".into(), 0.0, 2.0, "hi".into());
        db.save_segment(&segment, &[]).unwrap();

        db.select_segment("picker", "seg_1").unwrap();
        db.select_segment("picker", "seg_1").unwrap();
        assert_eq!(db.selections_for_user("picker").unwrap().len(), 1);

        db.delete_segment("seg_1").unwrap();
        assert!(db.selections_for_user("picker").unwrap().is_empty());
    }
}
