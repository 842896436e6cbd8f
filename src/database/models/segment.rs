// Database models - AudioSegment
use serde::{Deserialize, Serialize};

/// A time-bounded, transcribed slice of a source track, materialized as an
/// extractable clip once extraction succeeds.
///
/// `duration_seconds` is derived; the segments repo recomputes it as
/// `end_seconds - start_seconds` on every save and ignores whatever value the
/// caller put here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSegment {
    pub id: String,
    pub audio_file_id: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub transcription: String,
    pub clip_uri: Option<String>,
    pub duration_seconds: f64,
    pub created_at: String,
}

impl AudioSegment {
    pub fn new(
        id: String,
        audio_file_id: String,
        start_seconds: f64,
        end_seconds: f64,
        transcription: String,
    ) -> Self {
        Self {
            id,
            audio_file_id,
            start_seconds,
            end_seconds,
            transcription,
            clip_uri: None,
            duration_seconds: end_seconds - start_seconds,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Filters for listing/searching segments. All optional, combined with AND.
#[derive(Debug, Clone, Default)]
pub struct SegmentFilter {
    /// Owning user of the source track
    pub owner: Option<String>,
    /// Case-insensitive source title substring
    pub title_contains: Option<String>,
    /// Case-insensitive transcript substring
    pub transcription_contains: Option<String>,
    /// Category name (exact, case-insensitive)
    pub category: Option<String>,
    /// Only segments bookmarked by this user
    pub selected_by: Option<String>,
}

/// The serialized per-segment shape pushed to live subscribers and returned
/// by listing queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentPayload {
    pub id: String,
    pub audio_file_id: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub transcription: String,
    pub categories: Vec<String>,
    pub clip_uri: Option<String>,
    pub duration_seconds: f64,
    /// Full duration of the owning track, when known
    pub audio_full_duration: Option<f64>,
}
