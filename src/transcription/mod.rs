// Transcription module
// Speech-to-text behind a common provider trait. Backends are selected by
// configuration, never by inspecting the input.

pub mod provider;
pub mod types;

mod openai;
#[cfg(feature = "local-whisper")]
mod whisper_local;

pub use openai::OpenAiTranscriber;
pub use provider::{TranscriptionError, TranscriptionProvider};
pub use types::{RawTranscriptSegment, SentenceGroup};
#[cfg(feature = "local-whisper")]
pub use whisper_local::LocalWhisperTranscriber;

use std::sync::Arc;

use crate::config::{TranscriptionBackend, TranscriptionConfig};

/// Build the configured transcription backend
pub fn create_transcriber(
    config: &TranscriptionConfig,
) -> Result<Arc<dyn TranscriptionProvider>, TranscriptionError> {
    match config.backend {
        TranscriptionBackend::OpenAi => Ok(Arc::new(OpenAiTranscriber::new(config.clone()))),
        #[cfg(feature = "local-whisper")]
        TranscriptionBackend::Local => {
            let model_path = config.local_model_path.clone().ok_or_else(|| {
                TranscriptionError::ModelUnavailable(
                    "local backend selected but no model path configured".to_string(),
                )
            })?;
            Ok(Arc::new(LocalWhisperTranscriber::new(&model_path)?))
        }
        #[cfg(not(feature = "local-whisper"))]
        TranscriptionBackend::Local => Err(TranscriptionError::ModelUnavailable(
            "local backend requires the `local-whisper` feature".to_string(),
        )),
    }
}
