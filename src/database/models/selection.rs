// Database models - UserSelection
use serde::{Deserialize, Serialize};

/// A user's bookmark of a segment. Deleted when the segment goes away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSelection {
    pub user_id: String,
    pub segment_id: String,
    pub selected_at: String,
}
