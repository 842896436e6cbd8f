//! Classifier trait and error types

use async_trait::async_trait;
use std::fmt;

/// Error types for classification. Always soft at the pipeline level: the
/// segment persists with zero categories and the error is logged.
#[derive(Debug, Clone)]
pub enum ClassificationError {
    /// The external service could not be reached
    Unreachable(String),
    /// The service answered with something we could not parse
    MalformedResponse(String),
    /// The per-segment call exceeded its configured timeout
    Timeout(u64),
    /// Backend-reported failure
    Backend(String),
}

impl fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationError::Unreachable(msg) => write!(f, "Classification service unreachable: {}", msg),
            ClassificationError::MalformedResponse(msg) => write!(f, "Malformed classification response: {}", msg),
            ClassificationError::Timeout(secs) => write!(f, "Classification timed out after {}s", secs),
            ClassificationError::Backend(msg) => write!(f, "Classification failed: {}", msg),
        }
    }
}

impl std::error::Error for ClassificationError {}

/// Common interface for text-classification backends. Invoked once per
/// segment; returns the matched category labels (possibly empty).
#[async_trait]
pub trait CategoryClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Vec<String>, ClassificationError>;

    /// Human-readable backend name for logs and diagnostics
    fn name(&self) -> &'static str;
}

/// Parse the structured JSON a backend was asked to produce. Accepts both
/// the multi-label shape `{"categories": ["..."]}` and the single-label
/// shape `{"category": "..."}` some prompts elicit.
pub fn parse_label_response(content: &str) -> Result<Vec<String>, ClassificationError> {
    let value: serde_json::Value = serde_json::from_str(content.trim())
        .map_err(|e| ClassificationError::MalformedResponse(e.to_string()))?;

    if let Some(list) = value.get("categories").and_then(|v| v.as_array()) {
        return Ok(list
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect());
    }

    if let Some(single) = value.get("category").and_then(|v| v.as_str()) {
        let single = single.trim();
        return Ok(if single.is_empty() {
            Vec::new()
        } else {
            vec![single.to_string()]
        });
    }

    Err(ClassificationError::MalformedResponse(format!(
        "no categories field in: {}",
        content
    )))
}
