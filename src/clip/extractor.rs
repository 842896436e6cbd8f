//! Clip extraction
//!
//! Trait seam so the orchestrator can be tested without a real ffmpeg
//! binary; the production implementation shells out to ffmpeg.

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

use super::ffmpeg;
use crate::config::ClipConfig;

/// Error types for clip extraction. All of them are soft at the pipeline
/// level: the segment persists with a null clip URI and can be re-extracted
/// later with the same window.
#[derive(Debug, Clone)]
pub enum ClipExtractionError {
    /// start >= end
    InvalidWindow { start: f64, end: f64 },
    /// The window begins at or past the end of the track
    OutOfRange { start: f64, duration: f64 },
    /// No usable ffmpeg binary
    FfmpegNotFound,
    /// Decoding or encoding failed
    Decode(String),
    /// The per-clip timeout expired
    Timeout(u64),
}

impl fmt::Display for ClipExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipExtractionError::InvalidWindow { start, end } => {
                write!(f, "Invalid clip window: start {:.3}s >= end {:.3}s", start, end)
            }
            ClipExtractionError::OutOfRange { start, duration } => {
                write!(f, "Clip window starts at {:.3}s but the track is {:.3}s long", start, duration)
            }
            ClipExtractionError::FfmpegNotFound => {
                write!(f, "FFmpeg not found. Please install FFmpeg.")
            }
            ClipExtractionError::Decode(msg) => write!(f, "Clip extraction failed: {}", msg),
            ClipExtractionError::Timeout(secs) => write!(f, "Clip extraction timed out after {}s", secs),
        }
    }
}

impl std::error::Error for ClipExtractionError {}

/// A freshly encoded clip plus the full-track duration learned while
/// decoding, used to lazily backfill `AudioFile.duration_seconds`.
#[derive(Debug, Clone)]
pub struct ExtractedClip {
    pub bytes: Vec<u8>,
    pub source_duration_seconds: f64,
}

#[async_trait]
pub trait ClipExtractor: Send + Sync {
    /// Slice and re-encode the [start,end) window of the source file
    async fn extract(
        &self,
        source: &Path,
        start_seconds: f64,
        end_seconds: f64,
    ) -> Result<ExtractedClip, ClipExtractionError>;
}

/// Production extractor backed by an external ffmpeg binary
pub struct FfmpegClipExtractor {
    config: ClipConfig,
}

impl FfmpegClipExtractor {
    pub fn new(config: ClipConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ClipExtractor for FfmpegClipExtractor {
    async fn extract(
        &self,
        source: &Path,
        start_seconds: f64,
        end_seconds: f64,
    ) -> Result<ExtractedClip, ClipExtractionError> {
        if start_seconds >= end_seconds {
            return Err(ClipExtractionError::InvalidWindow {
                start: start_seconds,
                end: end_seconds,
            });
        }
        if ffmpeg::find_ffmpeg_path().is_none() {
            return Err(ClipExtractionError::FfmpegNotFound);
        }

        let source: PathBuf = source.to_path_buf();
        let format = self.config.format.clone();
        let bitrate = self.config.bitrate.clone();

        tokio::task::spawn_blocking(move || {
            let duration = ffmpeg::probe_duration(&source)
                .map_err(|e| ClipExtractionError::Decode(e.to_string()))?;

            if start_seconds >= duration {
                return Err(ClipExtractionError::OutOfRange {
                    start: start_seconds,
                    duration,
                });
            }

            // Refined windows may overshoot the track end by a pad; clamp
            // instead of failing, the way slicing the decoded audio would.
            let end = end_seconds.min(duration);

            let bytes = ffmpeg::extract_window(&source, start_seconds, end, &format, &bitrate)
                .map_err(|e| ClipExtractionError::Decode(e.to_string()))?;

            log::info!(
                "Extracted {:.3}s clip ({} bytes) from {}",
                end - start_seconds,
                bytes.len(),
                source.display()
            );

            Ok(ExtractedClip {
                bytes,
                source_duration_seconds: duration,
            })
        })
        .await
        .map_err(|e| ClipExtractionError::Decode(format!("extraction task panicked: {}", e)))?
    }
}
