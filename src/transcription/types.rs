// Transcription data types

use serde::{Deserialize, Serialize};

/// One time-stamped piece of transcribed speech, as reported by a backend.
/// Ephemeral: refined and persisted as a segment record, never stored as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawTranscriptSegment {
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    /// Word-alignment score of the last word in the segment, 0.0..=1.0.
    /// Low values mean the reported end boundary likely clips speech.
    pub confidence: f64,
}

impl RawTranscriptSegment {
    pub fn new(text: impl Into<String>, start_seconds: f64, end_seconds: f64, confidence: f64) -> Self {
        Self {
            text: text.into(),
            start_seconds,
            end_seconds,
            confidence,
        }
    }
}

/// A sentence-level run of consecutive raw segments. Boundary refinement
/// carries its forward-shift adjustment only within one group.
pub type SentenceGroup = Vec<RawTranscriptSegment>;

/// Fold word/phrase-level raw segments into sentence groups: a group closes
/// at terminal punctuation. Backends that already emit sentence-sized
/// segments wrap each in its own group instead.
pub fn group_into_sentences(segments: Vec<RawTranscriptSegment>) -> Vec<SentenceGroup> {
    let mut groups = Vec::new();
    let mut current: SentenceGroup = Vec::new();

    for segment in segments {
        let ends_sentence = segment
            .text
            .trim_end()
            .ends_with(['.', '!', '?']);
        current.push(segment);
        if ends_sentence {
            groups.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_splits_on_terminal_punctuation() {
        let segments = vec![
            RawTranscriptSegment::new("hi", 0.0, 0.5, 0.9),
            RawTranscriptSegment::new("there.", 0.5, 1.0, 0.8),
            RawTranscriptSegment::new("bye!", 1.2, 1.8, 0.7),
        ];

        let groups = group_into_sentences(segments);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
        assert_eq!(groups[1][0].text, "bye!");
    }

    #[test]
    fn test_grouping_keeps_trailing_fragment() {
        let segments = vec![
            RawTranscriptSegment::new("never", 0.0, 0.5, 0.9),
            RawTranscriptSegment::new("finished", 0.5, 1.0, 0.9),
        ];

        let groups = group_into_sentences(segments);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_grouping_empty_input() {
        assert!(group_into_sentences(Vec::new()).is_empty());
    }
}
