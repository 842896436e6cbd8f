//! Self-hosted transcription backend (whisper.cpp via whisper-rs)
//!
//! Decodes the source with ffmpeg to 16kHz mono PCM, runs whisper with
//! token timestamps, and reports per-segment confidence from the last
//! token's probability so the boundary refiner has real alignment scores.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::provider::{TranscriptionError, TranscriptionProvider};
use super::types::{group_into_sentences, RawTranscriptSegment, SentenceGroup};
use crate::clip::ffmpeg::decode_audio_file;

/// Local whisper.cpp transcriber
pub struct LocalWhisperTranscriber {
    context: Arc<WhisperContext>,
}

impl LocalWhisperTranscriber {
    pub fn new(model_path: &Path) -> Result<Self, TranscriptionError> {
        let path = model_path.to_str().ok_or_else(|| {
            TranscriptionError::ModelUnavailable(format!(
                "model path is not valid UTF-8: {}",
                model_path.display()
            ))
        })?;

        log::info!("Loading local whisper model from {}", path);
        let context = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .map_err(|e| TranscriptionError::ModelUnavailable(e.to_string()))?;

        Ok(Self {
            context: Arc::new(context),
        })
    }
}

#[async_trait]
impl TranscriptionProvider for LocalWhisperTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<Vec<SentenceGroup>, TranscriptionError> {
        let audio = audio.to_path_buf();
        let context = self.context.clone();

        tokio::task::spawn_blocking(move || {
            let (samples, _sample_rate) = decode_audio_file(&audio)
                .map_err(|e| TranscriptionError::AudioUnreadable(e.to_string()))?;

            let mut params = FullParams::new(SamplingStrategy::BeamSearch {
                beam_size: 5,
                patience: 1.0,
            });
            params.set_language(None);
            params.set_no_timestamps(false);
            params.set_token_timestamps(true);
            params.set_print_special(false);
            params.set_print_progress(false);
            params.set_print_realtime(false);
            params.set_print_timestamps(false);
            params.set_suppress_blank(true);
            params.set_suppress_non_speech_tokens(true);
            // Word-level segments so sentence grouping sees real boundaries
            params.set_max_len(1);
            params.set_split_on_word(true);
            params.set_no_context(true);

            let mut state = context
                .create_state()
                .map_err(|e| TranscriptionError::Backend(e.to_string()))?;
            state
                .full(params, &samples)
                .map_err(|e| TranscriptionError::Backend(e.to_string()))?;

            let num_segments = state
                .full_n_segments()
                .map_err(|e| TranscriptionError::Backend(e.to_string()))?;

            let mut raw_segments = Vec::with_capacity(num_segments as usize);
            for i in 0..num_segments {
                let text = match state.full_get_segment_text_lossy(i) {
                    Ok(text) => text,
                    Err(_) => continue,
                };
                let text = text.trim().to_string();
                if text.is_empty() {
                    continue;
                }

                // Timestamps come back in centiseconds
                let start = state
                    .full_get_segment_t0(i)
                    .map_err(|e| TranscriptionError::Backend(e.to_string()))? as f64
                    / 100.0;
                let end = state
                    .full_get_segment_t1(i)
                    .map_err(|e| TranscriptionError::Backend(e.to_string()))? as f64
                    / 100.0;

                let confidence = last_word_score(&state, i).unwrap_or(1.0);

                raw_segments.push(RawTranscriptSegment::new(text, start, end, confidence));
            }

            let groups = group_into_sentences(raw_segments);
            log::info!("Local whisper produced {} sentence groups", groups.len());
            Ok(groups)
        })
        .await
        .map_err(|e| TranscriptionError::Backend(format!("transcription task panicked: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "local-whisper"
    }
}

/// Probability of the last real (non-special) token in a segment
fn last_word_score(state: &whisper_rs::WhisperState, segment: i32) -> Option<f64> {
    let num_tokens = state.full_n_tokens(segment).ok()?;
    for j in (0..num_tokens).rev() {
        let text = state.full_get_token_text(segment, j).ok()?;
        // Special tokens render as "[_...]"
        if text.starts_with("[_") {
            continue;
        }
        let data = state.full_get_token_data(segment, j).ok()?;
        return Some(data.p as f64);
    }
    None
}
