// Segment repository
// Durable, idempotent persistence of segment records. Every save recomputes
// the derived duration and writes the row plus its category links in one
// transaction, so a concurrent reader never sees a half-written segment.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, TransactionBehavior};

use super::categories_repo::get_or_create_category_impl;
use super::models::{AudioSegment, SegmentFilter, SegmentPayload};
use super::DatabaseManager;

impl DatabaseManager {
    /// Save a segment (insert or update) together with its category names.
    /// The stored `duration_seconds` is always recomputed from the time
    /// bounds; whatever the caller supplied is ignored. Returns the segment
    /// as persisted.
    pub fn save_segment(
        &self,
        segment: &AudioSegment,
        category_names: &[String],
    ) -> Result<AudioSegment> {
        self.with_connection_mut(|conn| save_segment_impl(conn, segment, category_names))
    }

    /// Get a segment by ID
    pub fn get_segment(&self, id: &str) -> Result<Option<AudioSegment>> {
        self.with_connection(|conn| get_segment_impl(conn, id))
    }

    /// Delete a segment. Cascades to category links and user selections.
    pub fn delete_segment(&self, id: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM audio_segments WHERE id = ?", params![id])
                .context("Failed to delete segment")?;
            Ok(())
        })
    }

    /// Segments of one source track in stable time order
    pub fn list_segments_for_file(&self, audio_file_id: &str) -> Result<Vec<AudioSegment>> {
        self.with_connection(|conn| list_segments_for_file_impl(conn, audio_file_id))
    }

    /// Search segments across tracks; see [`SegmentFilter`]
    pub fn search_segments(&self, filter: &SegmentFilter) -> Result<Vec<SegmentPayload>> {
        self.with_connection(|conn| search_segments_impl(conn, filter))
    }

    /// The serialized shape for one segment (listing and notification payload)
    pub fn segment_payload(&self, id: &str) -> Result<Option<SegmentPayload>> {
        self.with_connection(|conn| segment_payload_impl(conn, id))
    }
}

fn save_segment_impl(
    conn: &mut Connection,
    segment: &AudioSegment,
    category_names: &[String],
) -> Result<AudioSegment> {
    // Derived, never trusted from the caller
    let duration = segment.end_seconds - segment.start_seconds;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .context("Failed to begin segment transaction")?;

    tx.execute(
        "INSERT INTO audio_segments
            (id, audio_file_id, start_seconds, end_seconds, transcription,
             clip_uri, duration_seconds, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            start_seconds = excluded.start_seconds,
            end_seconds = excluded.end_seconds,
            transcription = excluded.transcription,
            clip_uri = excluded.clip_uri,
            duration_seconds = excluded.duration_seconds",
        params![
            segment.id,
            segment.audio_file_id,
            segment.start_seconds,
            segment.end_seconds,
            segment.transcription,
            segment.clip_uri,
            duration,
            segment.created_at,
        ],
    ).context("Failed to save segment")?;

    // Replace category links wholesale; categories themselves are shared
    // and created on demand
    tx.execute(
        "DELETE FROM segment_categories WHERE segment_id = ?",
        params![segment.id],
    ).context("Failed to clear segment categories")?;

    for name in category_names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let category = get_or_create_category_impl(&tx, name)?;
        tx.execute(
            "INSERT OR IGNORE INTO segment_categories (segment_id, category_id) VALUES (?1, ?2)",
            params![segment.id, category.id],
        ).context("Failed to link segment category")?;
    }

    tx.commit().context("Failed to commit segment transaction")?;

    let mut persisted = segment.clone();
    persisted.duration_seconds = duration;
    Ok(persisted)
}

fn row_to_segment(row: &rusqlite::Row) -> rusqlite::Result<AudioSegment> {
    Ok(AudioSegment {
        id: row.get(0)?,
        audio_file_id: row.get(1)?,
        start_seconds: row.get(2)?,
        end_seconds: row.get(3)?,
        transcription: row.get(4)?,
        clip_uri: row.get(5)?,
        duration_seconds: row.get(6)?,
        created_at: row.get(7)?,
    })
}

const SEGMENT_COLUMNS: &str =
    "id, audio_file_id, start_seconds, end_seconds, transcription, clip_uri, duration_seconds, created_at";

fn get_segment_impl(conn: &Connection, id: &str) -> Result<Option<AudioSegment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM audio_segments WHERE id = ?", SEGMENT_COLUMNS
    )).context("Failed to prepare get_segment query")?;

    let result = stmt.query_row(params![id], row_to_segment);

    match result {
        Ok(segment) => Ok(Some(segment)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context("Failed to get segment"),
    }
}

fn list_segments_for_file_impl(conn: &Connection, audio_file_id: &str) -> Result<Vec<AudioSegment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM audio_segments WHERE audio_file_id = ?
         ORDER BY start_seconds ASC, created_at ASC",
        SEGMENT_COLUMNS
    )).context("Failed to prepare list_segments query")?;

    let segments = stmt.query_map(params![audio_file_id], row_to_segment)
        .context("Failed to query segments")?;

    segments.collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to collect segments")
}

fn search_segments_impl(conn: &Connection, filter: &SegmentFilter) -> Result<Vec<SegmentPayload>> {
    let mut sql = String::from(
        "SELECT s.id FROM audio_segments s
         JOIN audio_files f ON f.id = s.audio_file_id
         WHERE 1=1"
    );
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(owner) = &filter.owner {
        sql.push_str(" AND f.owner = ?");
        args.push(Box::new(owner.clone()));
    }
    if let Some(title) = &filter.title_contains {
        sql.push_str(" AND f.title LIKE '%' || ? || '%' COLLATE NOCASE");
        args.push(Box::new(title.clone()));
    }
    if let Some(text) = &filter.transcription_contains {
        sql.push_str(" AND s.transcription LIKE '%' || ? || '%' COLLATE NOCASE");
        args.push(Box::new(text.clone()));
    }
    if let Some(category) = &filter.category {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM segment_categories sc
                          JOIN categories c ON c.id = sc.category_id
                          WHERE sc.segment_id = s.id AND c.name = ? COLLATE NOCASE)"
        );
        args.push(Box::new(category.clone()));
    }
    if let Some(user) = &filter.selected_by {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM user_selections us
                          WHERE us.segment_id = s.id AND us.user_id = ?)"
        );
        args.push(Box::new(user.clone()));
    }
    sql.push_str(" ORDER BY f.uploaded_at DESC, s.start_seconds ASC");

    let mut stmt = conn.prepare(&sql)
        .context("Failed to prepare search_segments query")?;

    let params_ref: Vec<&dyn rusqlite::ToSql> = args.iter().map(|a| a.as_ref()).collect();
    let ids = stmt.query_map(params_ref.as_slice(), |row| row.get::<_, String>(0))
        .context("Failed to query segments")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to collect segment ids")?;

    let mut payloads = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(payload) = segment_payload_impl(conn, &id)? {
            payloads.push(payload);
        }
    }
    Ok(payloads)
}

fn segment_payload_impl(conn: &Connection, id: &str) -> Result<Option<SegmentPayload>> {
    let segment = match get_segment_impl(conn, id)? {
        Some(s) => s,
        None => return Ok(None),
    };

    let audio_full_duration: Option<f64> = conn.query_row(
        "SELECT duration_seconds FROM audio_files WHERE id = ?",
        params![segment.audio_file_id],
        |row| row.get(0),
    ).unwrap_or(None);

    let mut stmt = conn.prepare(
        "SELECT c.name FROM categories c
         JOIN segment_categories sc ON sc.category_id = c.id
         WHERE sc.segment_id = ?
         ORDER BY c.name ASC"
    ).context("Failed to prepare payload categories query")?;

    let categories = stmt.query_map(params![id], |row| row.get::<_, String>(0))
        .context("Failed to query payload categories")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to collect payload categories")?;

    Ok(Some(SegmentPayload {
        id: segment.id,
        audio_file_id: segment.audio_file_id,
        start_seconds: segment.start_seconds,
        end_seconds: segment.end_seconds,
        transcription: segment.transcription,
        categories,
        clip_uri: segment.clip_uri,
        duration_seconds: segment.duration_seconds,
        audio_full_duration,
    }))
}
