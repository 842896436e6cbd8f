// Database migrations for the Audoji engine
// Creates and updates the database schema

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Current schema version
const SCHEMA_VERSION: i32 = 2;

/// Run all necessary migrations to bring the database up to date
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    ).unwrap_or(false);

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get(0),
    ).unwrap_or(0);

    Ok(version)
}

/// Initial schema creation (version 1)
fn migrate_v1(conn: &Connection) -> Result<()> {
    log::info!("Running database migration v1");

    conn.execute_batch(r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Source tracks uploaded by users
        CREATE TABLE IF NOT EXISTS audio_files (
            id TEXT PRIMARY KEY NOT NULL,
            owner TEXT NOT NULL,
            artiste TEXT NOT NULL DEFAULT '',
            title TEXT NOT NULL,
            location_uri TEXT NOT NULL,
            duration_seconds REAL,
            spotify_link TEXT,
            uploaded_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Category labels created on demand by the classifier.
        -- Names are unique case-insensitively; concurrent creators race on
        -- INSERT OR IGNORE and re-read the winner.
        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE
        );

        -- Transcribed, time-bounded slices of a source track
        CREATE TABLE IF NOT EXISTS audio_segments (
            id TEXT PRIMARY KEY NOT NULL,
            audio_file_id TEXT NOT NULL REFERENCES audio_files(id) ON DELETE CASCADE,
            start_seconds REAL NOT NULL,
            end_seconds REAL NOT NULL,
            transcription TEXT NOT NULL DEFAULT '',
            clip_uri TEXT,
            duration_seconds REAL NOT NULL DEFAULT 0.0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_segments_audio_file
            ON audio_segments(audio_file_id);

        -- Many-to-many segment <-> category
        CREATE TABLE IF NOT EXISTS segment_categories (
            segment_id TEXT NOT NULL REFERENCES audio_segments(id) ON DELETE CASCADE,
            category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            UNIQUE(segment_id, category_id)
        );

        -- A user's bookmarked segments
        CREATE TABLE IF NOT EXISTS user_selections (
            user_id TEXT NOT NULL,
            segment_id TEXT NOT NULL REFERENCES audio_segments(id) ON DELETE CASCADE,
            selected_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, segment_id)
        );

        INSERT INTO schema_version (version) VALUES (1);
    "#).context("Failed to run migration v1")?;

    Ok(())
}

/// Version 2: index for transcript substring search
fn migrate_v2(conn: &Connection) -> Result<()> {
    log::info!("Running database migration v2");

    conn.execute_batch(r#"
        CREATE INDEX IF NOT EXISTS idx_segments_transcription
            ON audio_segments(transcription);
        CREATE INDEX IF NOT EXISTS idx_selections_user
            ON user_selections(user_id);

        INSERT INTO schema_version (version) VALUES (2);
    "#).context("Failed to run migration v2")?;

    Ok(())
}
