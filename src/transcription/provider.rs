//! Transcription provider trait and error types
//!
//! Defines the common interface for all speech-to-text backends (hosted
//! Whisper API, self-hosted whisper.cpp).

use async_trait::async_trait;
use std::fmt;
use std::path::Path;

use super::types::SentenceGroup;

/// Error types for transcription. Any of these fails the whole run: no
/// segments exist to salvage. Retry policy belongs to the caller, not here.
#[derive(Debug, Clone)]
pub enum TranscriptionError {
    /// The external service could not be reached
    Unreachable(String),
    /// The service answered with something we could not parse
    MalformedResponse(String),
    /// The configured model is missing or failed to load
    ModelUnavailable(String),
    /// The whole-file call exceeded its configured timeout
    Timeout(u64),
    /// The source audio could not be read or decoded
    AudioUnreadable(String),
    /// Backend-reported failure
    Backend(String),
}

impl fmt::Display for TranscriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptionError::Unreachable(msg) => write!(f, "Transcription service unreachable: {}", msg),
            TranscriptionError::MalformedResponse(msg) => write!(f, "Malformed transcription response: {}", msg),
            TranscriptionError::ModelUnavailable(msg) => write!(f, "Transcription model unavailable: {}", msg),
            TranscriptionError::Timeout(secs) => write!(f, "Transcription timed out after {}s", secs),
            TranscriptionError::AudioUnreadable(msg) => write!(f, "Source audio unreadable: {}", msg),
            TranscriptionError::Backend(msg) => write!(f, "Transcription failed: {}", msg),
        }
    }
}

impl std::error::Error for TranscriptionError {}

/// Common interface for speech-to-text backends.
///
/// Implementations return the full transcript partitioned into sentence
/// groups; each raw segment carries the alignment score of its last word so
/// the boundary refiner can widen unreliable windows. No retries inside an
/// implementation.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> Result<Vec<SentenceGroup>, TranscriptionError>;

    /// Human-readable backend name for logs and diagnostics
    fn name(&self) -> &'static str;
}
