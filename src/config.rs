// Engine configuration
// Every tunable the pipeline consumes lives here so deployments can override
// thresholds, backends and encoding targets without code changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which speech-to-text backend the pipeline uses for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionBackend {
    /// Hosted Whisper API (OpenAI-compatible)
    #[default]
    OpenAi,
    /// Self-hosted whisper.cpp model (requires the `local-whisper` feature)
    Local,
}

/// Which text-classification backend maps transcripts to categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationBackend {
    #[default]
    OpenAi,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub backend: TranscriptionBackend,
    /// Base URL of the hosted API
    pub api_base_url: String,
    /// API key for the hosted backend (empty for local)
    pub api_key: String,
    /// Hosted model name, e.g. "whisper-1"
    pub model: String,
    /// Path to a ggml model file for the local backend
    pub local_model_path: Option<PathBuf>,
    /// Whole-file transcription timeout; on expiry the run fails
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            backend: TranscriptionBackend::OpenAi,
            api_base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "whisper-1".to_string(),
            local_model_path: None,
            timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub backend: ClassificationBackend,
    pub api_base_url: String,
    pub api_key: String,
    pub model: String,
    /// Per-segment call timeout; on expiry the segment keeps zero categories
    pub timeout_secs: u64,
    /// When true, labels outside the vocabulary are dropped instead of
    /// passed through as free-form categories
    pub strict: bool,
    /// Controlled vocabulary presented to the backend. Empty means use the
    /// built-in default list.
    pub vocabulary: Vec<String>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            backend: ClassificationBackend::OpenAi,
            api_base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4-turbo".to_string(),
            timeout_secs: 30,
            strict: false,
            vocabulary: Vec::new(),
        }
    }
}

/// Boundary refinement tuning. Confidence is the word-alignment score of the
/// last word in a segment; low scores mean the reported boundary likely clips
/// speech, so the window is widened and the next start shifted forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinerConfig {
    /// Below this, the boundary is treated as unreliable
    pub low_confidence_threshold: f64,
    /// Below this (but above low), the boundary gets a fixed pad
    pub medium_confidence_threshold: f64,
    /// End pad for a low-confidence segment that closes its group
    pub last_segment_pad_secs: f64,
    /// End pad for a medium-confidence boundary
    pub medium_pad_secs: f64,
    /// Forward shift applied to the next segment after a low-confidence one
    pub low_next_shift_secs: f64,
    /// Forward shift applied to the next segment after a medium-confidence one
    pub medium_next_shift_secs: f64,
}

impl Default for RefinerConfig {
    fn default() -> Self {
        Self {
            low_confidence_threshold: 0.35,
            medium_confidence_threshold: 0.70,
            last_segment_pad_secs: 1.0,
            medium_pad_secs: 0.5,
            low_next_shift_secs: 0.5,
            medium_next_shift_secs: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Encoding container/codec passed to ffmpeg's -f flag
    pub format: String,
    /// Target bitrate for the lossy encode
    pub bitrate: String,
    /// Per-clip extraction timeout; on expiry the segment keeps a null clip
    pub timeout_secs: u64,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            format: "mp3".to_string(),
            bitrate: "192k".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub transcription: TranscriptionConfig,
    pub classification: ClassificationConfig,
    pub refiner: RefinerConfig,
    pub clip: ClipConfig,
    /// Root directory for extracted clip files
    pub media_root: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let media_root = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("AudojiEngine")
            .join("media");

        Self {
            transcription: TranscriptionConfig::default(),
            classification: ClassificationConfig::default(),
            refiner: RefinerConfig::default(),
            clip: ClipConfig::default(),
            media_root,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file. Missing keys fall back to
    /// defaults, so a partial override file is enough.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.refiner.low_confidence_threshold, 0.35);
        assert_eq!(config.refiner.medium_confidence_threshold, 0.70);
        assert_eq!(config.refiner.last_segment_pad_secs, 1.0);
        assert_eq!(config.refiner.medium_pad_secs, 0.5);
        assert_eq!(config.clip.bitrate, "192k");
        assert_eq!(config.transcription.backend, TranscriptionBackend::OpenAi);
    }

    #[test]
    fn test_partial_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "transcription": {{ "backend": "local", "timeout_secs": 60 }},
                "refiner": {{ "low_confidence_threshold": 0.4 }}
            }}"#
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.transcription.backend, TranscriptionBackend::Local);
        assert_eq!(config.transcription.timeout_secs, 60);
        assert_eq!(config.refiner.low_confidence_threshold, 0.4);
        // untouched keys keep defaults
        assert_eq!(config.refiner.medium_confidence_threshold, 0.70);
        assert_eq!(config.clip.format, "mp3");
    }
}
