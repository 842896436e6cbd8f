//! Hosted Whisper API transcription backend
//!
//! Uploads the whole file as multipart form data and asks for
//! `verbose_json` with segment granularity. A VTT parser is kept as a
//! fallback for deployments whose endpoint only returns subtitles.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::provider::{TranscriptionError, TranscriptionProvider};
use super::types::{RawTranscriptSegment, SentenceGroup};
use crate::config::TranscriptionConfig;

/// Verbose JSON transcription response
#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    segments: Vec<ApiSegment>,
}

#[derive(Debug, Deserialize)]
struct ApiSegment {
    start: f64,
    end: f64,
    text: String,
    /// Average log-probability over the segment's tokens
    #[serde(default = "default_logprob")]
    avg_logprob: f64,
}

fn default_logprob() -> f64 {
    0.0
}

/// Hosted Whisper API transcriber
pub struct OpenAiTranscriber {
    config: TranscriptionConfig,
    client: Client,
}

impl OpenAiTranscriber {
    pub fn new(config: TranscriptionConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// The API reports an average token log-probability per segment; map it
    /// onto the 0..1 alignment-score scale the refiner expects.
    fn confidence_from_logprob(avg_logprob: f64) -> f64 {
        avg_logprob.exp().clamp(0.0, 1.0)
    }
}

#[async_trait]
impl TranscriptionProvider for OpenAiTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<Vec<SentenceGroup>, TranscriptionError> {
        let bytes = tokio::fs::read(audio)
            .await
            .map_err(|e| TranscriptionError::AudioUnreadable(e.to_string()))?;

        let file_name = audio
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".to_string());

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| TranscriptionError::Backend(e.to_string()))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment");

        let url = format!("{}/audio/transcriptions", self.config.api_base_url);
        log::info!("Transcribing {:?} via hosted API ({})", audio, self.config.model);

        let response = self.client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranscriptionError::Timeout(self.config.timeout_secs)
                } else {
                    TranscriptionError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::Backend(format!(
                "API returned {}: {}", status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranscriptionError::MalformedResponse(e.to_string()))?;

        let groups = parse_transcription_body(&body)?;
        log::info!("Hosted API returned {} sentence groups", groups.len());
        Ok(groups)
    }

    fn name(&self) -> &'static str {
        "openai-whisper"
    }
}

/// Parse a transcription response body: verbose JSON with timestamped
/// segments, or a WebVTT payload from endpoints that only return subtitles.
fn parse_transcription_body(body: &str) -> Result<Vec<SentenceGroup>, TranscriptionError> {
    match serde_json::from_str::<VerboseTranscription>(body) {
        Ok(transcript) => Ok(transcript
            .segments
            .into_iter()
            .filter(|s| !s.text.trim().is_empty())
            .map(|s| {
                vec![RawTranscriptSegment::new(
                    s.text.trim(),
                    s.start,
                    s.end,
                    OpenAiTranscriber::confidence_from_logprob(s.avg_logprob),
                )]
            })
            .collect()),
        Err(_) if body.trim_start().starts_with("WEBVTT") => Ok(parse_vtt(body)),
        Err(e) => Err(TranscriptionError::MalformedResponse(e.to_string())),
    }
}

static VTT_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}:\d{2}:\d{2}\.\d{3}) --> (\d{2}:\d{2}:\d{2}\.\d{3})").expect("valid regex")
});

static NON_SENTENCE_RE: Lazy<Regex> = Lazy::new(|| {
    // Lines that are only musical-note glyphs carry no speech
    Regex::new(r"^[♪♫\s]+$").expect("valid regex")
});

/// Parse a WebVTT payload into sentence groups. Subtitle cues carry no
/// alignment scores, so boundaries are treated as reliable.
pub fn parse_vtt(vtt: &str) -> Vec<SentenceGroup> {
    let lines: Vec<&str> = vtt.lines().collect();
    let mut groups = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let captures = match VTT_TIME_RE.captures(line) {
            Some(c) => c,
            None => continue,
        };
        let text = match lines.get(i + 1) {
            Some(t) if !t.trim().is_empty() && !NON_SENTENCE_RE.is_match(t) => t.trim(),
            _ => continue,
        };

        let (start, end) = match (parse_vtt_time(&captures[1]), parse_vtt_time(&captures[2])) {
            (Some(s), Some(e)) => (s, e),
            _ => continue,
        };

        groups.push(vec![RawTranscriptSegment::new(text, start, end, 1.0)]);
    }

    groups
}

fn parse_vtt_time(time: &str) -> Option<f64> {
    let mut parts = time.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}
