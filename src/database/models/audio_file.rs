// Database models - AudioFile
use serde::{Deserialize, Serialize};

/// An uploaded source track. `duration_seconds` stays unset until the first
/// clip extraction decodes the whole file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFile {
    pub id: String,
    pub owner: String,
    pub artiste: String,
    pub title: String,
    /// Resolvable location of the source bytes: a filesystem path or an
    /// http(s) URL
    pub location_uri: String,
    pub duration_seconds: Option<f64>,
    pub spotify_link: Option<String>,
    pub uploaded_at: String,
}

impl AudioFile {
    pub fn new(id: String, owner: String, title: String, location_uri: String) -> Self {
        Self {
            id,
            owner,
            artiste: String::new(),
            title,
            location_uri,
            duration_seconds: None,
            spotify_link: None,
            uploaded_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Notification group for this upload's live subscribers, derived from
    /// the owning user so only the originating client sees updates.
    pub fn notify_group(&self) -> String {
        format!("user_{}", self.owner)
    }
}
