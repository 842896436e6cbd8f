// AudioFile repository
// CRUD for uploaded source tracks, including the one-shot lazy duration write

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::models::AudioFile;
use super::DatabaseManager;

impl DatabaseManager {
    /// Insert a new source track record
    pub fn create_audio_file(&self, file: &AudioFile) -> Result<()> {
        self.with_connection(|conn| create_audio_file_impl(conn, file))
    }

    /// Get a source track by ID
    pub fn get_audio_file(&self, id: &str) -> Result<Option<AudioFile>> {
        self.with_connection(|conn| get_audio_file_impl(conn, id))
    }

    /// List source tracks, optionally filtered by owner and/or title substring,
    /// newest first
    pub fn list_audio_files(
        &self,
        owner: Option<&str>,
        title_contains: Option<&str>,
    ) -> Result<Vec<AudioFile>> {
        self.with_connection(|conn| list_audio_files_impl(conn, owner, title_contains))
    }

    /// Record the decoded full-track duration, but only if it was never set.
    /// Returns true when this call performed the write.
    pub fn set_audio_file_duration_once(&self, id: &str, duration_seconds: f64) -> Result<bool> {
        self.with_connection(|conn| {
            let changed = conn.execute(
                "UPDATE audio_files SET duration_seconds = ?1
                 WHERE id = ?2 AND duration_seconds IS NULL",
                params![duration_seconds, id],
            ).context("Failed to set audio file duration")?;
            Ok(changed > 0)
        })
    }

    /// Delete a source track. Cascades to its segments and, through them, to
    /// any user selections.
    pub fn delete_audio_file(&self, id: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM audio_files WHERE id = ?", params![id])
                .context("Failed to delete audio file")?;
            Ok(())
        })
    }
}

fn create_audio_file_impl(conn: &Connection, file: &AudioFile) -> Result<()> {
    conn.execute(
        "INSERT INTO audio_files
            (id, owner, artiste, title, location_uri, duration_seconds, spotify_link, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            file.id,
            file.owner,
            file.artiste,
            file.title,
            file.location_uri,
            file.duration_seconds,
            file.spotify_link,
            file.uploaded_at,
        ],
    ).context("Failed to create audio file")?;

    Ok(())
}

fn row_to_audio_file(row: &rusqlite::Row) -> rusqlite::Result<AudioFile> {
    Ok(AudioFile {
        id: row.get(0)?,
        owner: row.get(1)?,
        artiste: row.get(2)?,
        title: row.get(3)?,
        location_uri: row.get(4)?,
        duration_seconds: row.get(5)?,
        spotify_link: row.get(6)?,
        uploaded_at: row.get(7)?,
    })
}

const AUDIO_FILE_COLUMNS: &str =
    "id, owner, artiste, title, location_uri, duration_seconds, spotify_link, uploaded_at";

fn get_audio_file_impl(conn: &Connection, id: &str) -> Result<Option<AudioFile>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM audio_files WHERE id = ?", AUDIO_FILE_COLUMNS
    )).context("Failed to prepare get_audio_file query")?;

    let result = stmt.query_row(params![id], row_to_audio_file);

    match result {
        Ok(file) => Ok(Some(file)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context("Failed to get audio file"),
    }
}

fn list_audio_files_impl(
    conn: &Connection,
    owner: Option<&str>,
    title_contains: Option<&str>,
) -> Result<Vec<AudioFile>> {
    let mut sql = format!(
        "SELECT {} FROM audio_files WHERE 1=1", AUDIO_FILE_COLUMNS
    );
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(owner) = owner {
        sql.push_str(" AND owner = ?");
        args.push(Box::new(owner.to_string()));
    }
    if let Some(title) = title_contains {
        sql.push_str(" AND title LIKE '%' || ? || '%' COLLATE NOCASE");
        args.push(Box::new(title.to_string()));
    }
    sql.push_str(" ORDER BY uploaded_at DESC");

    let mut stmt = conn.prepare(&sql)
        .context("Failed to prepare list_audio_files query")?;

    let params_ref: Vec<&dyn rusqlite::ToSql> = args.iter().map(|a| a.as_ref()).collect();
    let files = stmt.query_map(params_ref.as_slice(), row_to_audio_file)
        .context("Failed to query audio files")?;

    files.collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to collect audio files")
}
