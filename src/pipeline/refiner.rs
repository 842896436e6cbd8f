// Segment boundary refinement
// Whisper-style word alignment gets unreliable exactly at segment boundaries:
// a low score on the last word usually means the reported end clips speech.
// The refiner widens unreliable windows and shifts the next start forward to
// compensate, trading boundary precision for never cutting a word in half.

use crate::config::RefinerConfig;
use crate::transcription::SentenceGroup;

/// A refined `(start, end, text)` window ready to persist as a segment
#[derive(Debug, Clone, PartialEq)]
pub struct RefinedSegment {
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

/// Refine one sentence group.
///
/// The forward-shift adjustment carries only within the group: each segment's
/// effective start is its reported start plus whatever the previous segment's
/// confidence decision left pending. Starts never go below zero; ends are
/// clamped to the track duration when it is known.
pub fn refine_group(
    group: &SentenceGroup,
    config: &RefinerConfig,
    track_duration: Option<f64>,
) -> Vec<RefinedSegment> {
    let mut refined = Vec::with_capacity(group.len());
    let mut pending_adjustment = 0.0_f64;

    for (i, segment) in group.iter().enumerate() {
        let start = (segment.start_seconds + pending_adjustment).max(0.0);
        let mut end = segment.end_seconds;
        let next = group.get(i + 1);

        if segment.confidence < config.low_confidence_threshold {
            match next {
                // Extend halfway toward the next start. Pathological inputs
                // where the next segment starts before this end would yield
                // a negative pad; clamp to zero extension.
                Some(next) => {
                    end += ((next.start_seconds - end) / 2.0).max(0.0);
                }
                None => {
                    end += config.last_segment_pad_secs;
                }
            }
            pending_adjustment = config.low_next_shift_secs;
        } else if segment.confidence < config.medium_confidence_threshold {
            end += config.medium_pad_secs;
            pending_adjustment = config.medium_next_shift_secs;
        } else {
            pending_adjustment = 0.0;
        }

        if let Some(duration) = track_duration {
            end = end.min(duration);
        }
        // A shifted start can meet a clamped end; keep the window non-inverted
        // and let the extractor reject the degenerate case.
        end = end.max(start);

        refined.push(RefinedSegment {
            text: segment.text.clone(),
            start_seconds: start,
            end_seconds: end,
        });
    }

    refined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::RawTranscriptSegment;

    fn config() -> RefinerConfig {
        RefinerConfig::default()
    }

    #[test]
    fn test_high_confidence_passes_through_untouched() {
        let group = vec![
            RawTranscriptSegment::new("hi", 0.0, 2.0, 0.9),
            RawTranscriptSegment::new("there", 2.0, 4.0, 0.85),
        ];

        let refined = refine_group(&group, &config(), None);
        assert_eq!(refined[0].start_seconds, 0.0);
        assert_eq!(refined[0].end_seconds, 2.0);
        assert_eq!(refined[1].start_seconds, 2.0);
        assert_eq!(refined[1].end_seconds, 4.0);
    }

    #[test]
    fn test_low_confidence_last_segment_gets_fixed_pad() {
        // hi is confident and passes zero adjustment on; there closes the
        // group at 0.2 confidence, so its end is padded by a full second.
        let group = vec![
            RawTranscriptSegment::new("hi", 0.0, 2.0, 0.9),
            RawTranscriptSegment::new("there", 2.0, 4.0, 0.2),
        ];

        let refined = refine_group(&group, &config(), None);
        assert_eq!(refined[0].end_seconds, 2.0);
        assert_eq!(refined[1].start_seconds, 2.0);
        assert_eq!(refined[1].end_seconds, 5.0);
    }

    #[test]
    fn test_low_confidence_extends_halfway_to_next() {
        let group = vec![
            RawTranscriptSegment::new("one", 0.0, 2.0, 0.1),
            RawTranscriptSegment::new("two", 3.0, 4.0, 0.9),
        ];

        let refined = refine_group(&group, &config(), None);
        // end 2.0 extended by (3.0 - 2.0) / 2
        assert_eq!(refined[0].end_seconds, 2.5);
        // successor start shifted forward by 0.5
        assert_eq!(refined[1].start_seconds, 3.5);
        assert_eq!(refined[1].end_seconds, 4.0);
    }

    #[test]
    fn test_medium_confidence_gets_fixed_pad_and_small_shift() {
        let group = vec![
            RawTranscriptSegment::new("one", 0.0, 2.0, 0.5),
            RawTranscriptSegment::new("two", 3.0, 4.0, 0.9),
        ];

        let refined = refine_group(&group, &config(), None);
        assert_eq!(refined[0].end_seconds, 2.5);
        assert_eq!(refined[1].start_seconds, 3.2);
    }

    #[test]
    fn test_adjustment_carries_across_consecutive_low_segments() {
        let group = vec![
            RawTranscriptSegment::new("a", 0.0, 1.0, 0.1),
            RawTranscriptSegment::new("b", 2.0, 3.0, 0.1),
            RawTranscriptSegment::new("c", 4.0, 5.0, 0.9),
        ];

        let refined = refine_group(&group, &config(), None);
        // a: end 1.0 + (2.0 - 1.0)/2 = 1.5
        assert_eq!(refined[0].end_seconds, 1.5);
        // b: start 2.0 + 0.5 carried, end 3.0 + (4.0 - 3.0)/2
        assert_eq!(refined[1].start_seconds, 2.5);
        assert_eq!(refined[1].end_seconds, 3.5);
        // c: start shifted by b's low-confidence decision
        assert_eq!(refined[2].start_seconds, 4.5);
    }

    #[test]
    fn test_negative_half_distance_clamps_to_zero_extension() {
        // Next segment starts before the current end; the half-distance pad
        // would be negative. The end must stay put.
        let group = vec![
            RawTranscriptSegment::new("a", 0.0, 3.0, 0.1),
            RawTranscriptSegment::new("b", 2.0, 4.0, 0.9),
        ];

        let refined = refine_group(&group, &config(), None);
        assert_eq!(refined[0].end_seconds, 3.0);
    }

    #[test]
    fn test_end_clamped_to_track_duration() {
        let group = vec![RawTranscriptSegment::new("tail", 8.5, 9.8, 0.2)];

        let refined = refine_group(&group, &config(), Some(10.0));
        // 9.8 + 1.0 pad would overshoot the 10 s track
        assert_eq!(refined[0].end_seconds, 10.0);
    }

    #[test]
    fn test_output_stays_time_ordered() {
        let group = vec![
            RawTranscriptSegment::new("a", 0.0, 1.0, 0.1),
            RawTranscriptSegment::new("b", 1.5, 2.5, 0.5),
            RawTranscriptSegment::new("c", 3.0, 4.0, 0.2),
        ];

        let refined = refine_group(&group, &config(), None);
        for pair in refined.windows(2) {
            assert!(pair[0].start_seconds <= pair[1].start_seconds);
        }
        for segment in &refined {
            assert!(segment.start_seconds <= segment.end_seconds);
        }
    }

    #[test]
    fn test_empty_group() {
        assert!(refine_group(&Vec::new(), &config(), None).is_empty());
    }

    #[test]
    fn test_custom_thresholds_respected() {
        let custom = RefinerConfig {
            low_confidence_threshold: 0.5,
            last_segment_pad_secs: 2.0,
            ..RefinerConfig::default()
        };
        let group = vec![RawTranscriptSegment::new("a", 0.0, 1.0, 0.45)];

        let refined = refine_group(&group, &custom, None);
        assert_eq!(refined[0].end_seconds, 3.0);
    }
}
