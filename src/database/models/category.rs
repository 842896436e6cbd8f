// Database models - Category
use serde::{Deserialize, Serialize};

/// A semantic label attached to segments. Created lazily the first time the
/// classifier emits a new name; shared across segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}
