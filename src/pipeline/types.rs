// Pipeline run states and results

use std::fmt;

use crate::transcription::TranscriptionError;

/// Where a run currently is. Terminal states are `Completed`,
/// `CompletedWithErrors` and `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Transcribing,
    /// Processing refined segment `i` of `n`
    Segmenting(usize, usize),
    /// Every segment processed and stored without a single stage error
    Completed,
    /// Every segment processed; some lack categories or a clip
    CompletedWithErrors,
    /// Transcription failed (or storage was unreachable before any segment
    /// persisted); zero segments were produced
    Failed,
    /// The run was cancelled between segments; stored segments remain
    Cancelled,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Pending => write!(f, "pending"),
            RunState::Transcribing => write!(f, "transcribing"),
            RunState::Segmenting(i, n) => write!(f, "segmenting {}/{}", i, n),
            RunState::Completed => write!(f, "completed"),
            RunState::CompletedWithErrors => write!(f, "completed with errors"),
            RunState::Failed => write!(f, "failed"),
            RunState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A stage-local error recorded against one segment. None of these abort
/// the run; they are aggregated into the final result for diagnostics.
#[derive(Debug, Clone)]
pub enum StageError {
    /// Segment persisted with zero categories
    Classification(String),
    /// Segment persisted with a null clip URI; re-extractable later
    ClipExtraction(String),
    /// The segment's in-memory result was dropped
    Store(String),
    /// Stored state is unaffected
    Notify(String),
}

impl StageError {
    pub fn stage(&self) -> &'static str {
        match self {
            StageError::Classification(_) => "classification",
            StageError::ClipExtraction(_) => "clip_extraction",
            StageError::Store(_) => "store",
            StageError::Notify(_) => "notify",
        }
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::Classification(msg)
            | StageError::ClipExtraction(msg)
            | StageError::Store(msg)
            | StageError::Notify(msg) => write!(f, "{}: {}", self.stage(), msg),
        }
    }
}

/// Per-segment outcome within one run
#[derive(Debug, Clone)]
pub struct SegmentOutcome {
    pub segment_id: String,
    pub stored: bool,
    pub category_count: usize,
    pub has_clip: bool,
    pub errors: Vec<StageError>,
}

/// Final report of one pipeline run. Per-segment errors never roll back
/// previously stored segments.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub audio_file_id: String,
    pub state: RunState,
    pub segments: Vec<SegmentOutcome>,
}

impl PipelineResult {
    /// Segments that finished without categories or without a clip
    pub fn partial_segments(&self) -> Vec<&SegmentOutcome> {
        self.segments
            .iter()
            .filter(|s| !s.errors.is_empty())
            .collect()
    }
}

/// Whole-run failures. Anything here means zero (or no further) segments
/// were produced; stage-local problems live in [`StageError`] instead.
#[derive(Debug)]
pub enum PipelineError {
    /// No audio file row with the given id
    AudioFileNotFound(String),
    /// The source bytes could not be fetched or read
    SourceUnavailable(String),
    /// Whole-file transcription failed; the run is `Failed`
    Transcription(TranscriptionError),
    /// Every save failed before a single segment persisted
    StorageUnreachable(String),
    /// Cooperative cancellation between segments
    Cancelled(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::AudioFileNotFound(id) => write!(f, "Audio file not found: {}", id),
            PipelineError::SourceUnavailable(msg) => write!(f, "Source audio unavailable: {}", msg),
            PipelineError::Transcription(e) => write!(f, "{}", e),
            PipelineError::StorageUnreachable(msg) => {
                write!(f, "Storage unreachable, no segment persisted: {}", msg)
            }
            PipelineError::Cancelled(id) => write!(f, "Run cancelled for audio file {}", id),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<TranscriptionError> for PipelineError {
    fn from(e: TranscriptionError) -> Self {
        PipelineError::Transcription(e)
    }
}
