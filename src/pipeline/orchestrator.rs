// Pipeline orchestrator
// Drives one run end to end: resolve the source bytes, transcribe, then per
// refined segment classify, extract, store and notify. Stage failures after
// transcription are recorded against the segment and never abort the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::refiner::refine_group;
use super::types::{PipelineError, PipelineResult, RunState, SegmentOutcome, StageError};
use crate::classification::{create_classifier, CategoryClassifier, ClassificationError};
use crate::clip::{
    resolve_source, ClipExtractionError, ClipExtractor, FfmpegClipExtractor, MediaStore,
    SourceHandle,
};
use crate::config::{EngineConfig, TranscriptionBackend};
use crate::database::models::{AudioFile, AudioSegment, SegmentPayload};
use crate::database::DatabaseManager;
use crate::notify::SegmentNotifier;
use crate::transcription::{create_transcriber, TranscriptionError, TranscriptionProvider};

fn new_segment_id() -> String {
    format!("seg_{}", &Uuid::new_v4().to_string().replace('-', "")[..12])
}

/// One-run-at-a-time pipeline over injected stage implementations. Cheap to
/// share behind an `Arc`; independent runs only meet at the database.
pub struct AudioPipeline {
    db: Arc<DatabaseManager>,
    transcriber: Arc<dyn TranscriptionProvider>,
    classifier: Arc<dyn CategoryClassifier>,
    extractor: Arc<dyn ClipExtractor>,
    notifier: Arc<dyn SegmentNotifier>,
    media_store: MediaStore,
    config: EngineConfig,
}

impl AudioPipeline {
    pub fn new(
        db: Arc<DatabaseManager>,
        transcriber: Arc<dyn TranscriptionProvider>,
        classifier: Arc<dyn CategoryClassifier>,
        extractor: Arc<dyn ClipExtractor>,
        notifier: Arc<dyn SegmentNotifier>,
        config: EngineConfig,
    ) -> Self {
        let media_store = MediaStore::new(config.media_root.clone());
        Self {
            db,
            transcriber,
            classifier,
            extractor,
            notifier,
            media_store,
            config,
        }
    }

    /// Build a pipeline with the production stage implementations selected
    /// by configuration.
    pub fn from_config(
        db: Arc<DatabaseManager>,
        notifier: Arc<dyn SegmentNotifier>,
        config: EngineConfig,
    ) -> Result<Self, TranscriptionError> {
        let transcriber = create_transcriber(&config.transcription)?;
        let classifier = create_classifier(&config.classification);
        let extractor = Arc::new(FfmpegClipExtractor::new(config.clip.clone()));
        Ok(Self::new(db, transcriber, classifier, extractor, notifier, config))
    }

    pub fn db(&self) -> &Arc<DatabaseManager> {
        &self.db
    }

    /// Run the pipeline with the injected transcriber
    pub async fn run(
        &self,
        audio_file_id: &str,
        notify_group: &str,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult, PipelineError> {
        self.run_inner(self.transcriber.clone(), audio_file_id, notify_group, cancel)
            .await
    }

    /// Run the pipeline, overriding the transcription backend for this run
    /// only. `None` keeps the injected transcriber.
    pub async fn run_with_backend(
        &self,
        audio_file_id: &str,
        backend: Option<TranscriptionBackend>,
        notify_group: &str,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult, PipelineError> {
        let transcriber = match backend {
            Some(backend) if backend != self.config.transcription.backend => {
                let mut transcription = self.config.transcription.clone();
                transcription.backend = backend;
                create_transcriber(&transcription)?
            }
            _ => self.transcriber.clone(),
        };
        self.run_inner(transcriber, audio_file_id, notify_group, cancel)
            .await
    }

    async fn run_inner(
        &self,
        transcriber: Arc<dyn TranscriptionProvider>,
        audio_file_id: &str,
        notify_group: &str,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult, PipelineError> {
        log::info!("Pipeline {} for audio file {}", RunState::Pending, audio_file_id);

        let audio_file = self
            .db
            .get_audio_file(audio_file_id)
            .map_err(|e| PipelineError::StorageUnreachable(e.to_string()))?
            .ok_or_else(|| PipelineError::AudioFileNotFound(audio_file_id.to_string()))?;

        let source = resolve_source(&audio_file.location_uri)
            .await
            .map_err(|e| PipelineError::SourceUnavailable(e.to_string()))?;

        log::info!(
            "Pipeline {} '{}' via {}",
            RunState::Transcribing,
            audio_file.title,
            transcriber.name()
        );
        let transcription_timeout = self.config.transcription.timeout_secs;
        let groups = timeout(
            Duration::from_secs(transcription_timeout),
            transcriber.transcribe(source.path()),
        )
        .await
        .map_err(|_| TranscriptionError::Timeout(transcription_timeout))??;

        let total: usize = groups.iter().map(|g| g.len()).sum();
        log::info!(
            "Transcribed {} into {} group(s), {} segment(s)",
            audio_file.title,
            groups.len(),
            total
        );

        let mut outcomes: Vec<SegmentOutcome> = Vec::with_capacity(total);
        let mut known_duration = audio_file.duration_seconds;
        let mut index = 0usize;

        for group in &groups {
            // Refinement clamps against whatever duration is known so far;
            // the first successful extraction backfills it.
            let refined = refine_group(group, &self.config.refiner, known_duration);

            for window in refined {
                if cancel.is_cancelled() {
                    log::warn!(
                        "Pipeline cancelled for {} after {} of {} segments",
                        audio_file_id,
                        index,
                        total
                    );
                    return Err(PipelineError::Cancelled(audio_file_id.to_string()));
                }

                index += 1;
                log::debug!("Pipeline {}", RunState::Segmenting(index, total));

                let outcome = self
                    .process_segment(&audio_file, &source, &window.text, window.start_seconds,
                        window.end_seconds, notify_group, &mut known_duration,
                        outcomes.iter().any(|o| o.stored))
                    .await?;
                outcomes.push(outcome);
            }
        }

        let state = if outcomes.iter().all(|o| o.errors.is_empty()) {
            RunState::Completed
        } else {
            RunState::CompletedWithErrors
        };
        let result = PipelineResult {
            audio_file_id: audio_file_id.to_string(),
            state,
            segments: outcomes,
        };
        log::info!(
            "Pipeline {} for {}: {} segment(s), {} partial",
            result.state,
            audio_file_id,
            result.segments.len(),
            result.partial_segments().len()
        );
        Ok(result)
    }

    #[allow(clippy::too_many_arguments)]
    async fn process_segment(
        &self,
        audio_file: &AudioFile,
        source: &SourceHandle,
        text: &str,
        start_seconds: f64,
        end_seconds: f64,
        notify_group: &str,
        known_duration: &mut Option<f64>,
        any_stored: bool,
    ) -> Result<SegmentOutcome, PipelineError> {
        let segment_id = new_segment_id();
        let mut errors: Vec<StageError> = Vec::new();

        let categories = match self.classify_with_timeout(text).await {
            Ok(categories) => categories,
            Err(e) => {
                log::warn!("Segment {} keeps zero categories: {}", segment_id, e);
                errors.push(StageError::Classification(e.to_string()));
                Vec::new()
            }
        };

        let clip_uri = match self
            .extract_with_timeout(source, start_seconds, end_seconds)
            .await
        {
            Ok(clip) => {
                if known_duration.is_none() {
                    match self
                        .db
                        .set_audio_file_duration_once(&audio_file.id, clip.source_duration_seconds)
                    {
                        Ok(_) => *known_duration = Some(clip.source_duration_seconds),
                        Err(e) => log::warn!("Could not backfill track duration: {}", e),
                    }
                }
                match self.media_store.save_clip(
                    &audio_file.title,
                    &segment_id,
                    &self.config.clip.format,
                    &clip.bytes,
                ) {
                    Ok(uri) => Some(uri),
                    Err(e) => {
                        log::warn!("Segment {} keeps a null clip URI: {}", segment_id, e);
                        errors.push(StageError::ClipExtraction(e.to_string()));
                        None
                    }
                }
            }
            Err(e) => {
                log::warn!("Segment {} keeps a null clip URI: {}", segment_id, e);
                errors.push(StageError::ClipExtraction(e.to_string()));
                None
            }
        };

        let mut segment = AudioSegment::new(
            segment_id.clone(),
            audio_file.id.clone(),
            start_seconds,
            end_seconds,
            text.to_string(),
        );
        segment.clip_uri = clip_uri;

        let stored = match self.db.save_segment(&segment, &categories) {
            Ok(_) => true,
            Err(e) if !any_stored => {
                // A failure before anything persisted means a silent no-op
                // run; surface it as a whole-run failure instead.
                return Err(PipelineError::StorageUnreachable(e.to_string()));
            }
            Err(e) => {
                log::error!("Dropping segment {}: {}", segment_id, e);
                errors.push(StageError::Store(e.to_string()));
                false
            }
        };

        if stored {
            match self.db.segment_payload(&segment_id) {
                Ok(Some(payload)) => {
                    if let Err(e) = self.notifier.publish(notify_group, &payload).await {
                        log::warn!("Notify failed for segment {}: {}", segment_id, e);
                        errors.push(StageError::Notify(e.to_string()));
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Could not load payload for segment {}: {}", segment_id, e);
                    errors.push(StageError::Notify(e.to_string()));
                }
            }
        }

        Ok(SegmentOutcome {
            segment_id,
            stored,
            category_count: categories.len(),
            has_clip: segment.clip_uri.is_some(),
            errors,
        })
    }

    async fn classify_with_timeout(&self, text: &str) -> Result<Vec<String>, ClassificationError> {
        let secs = self.config.classification.timeout_secs;
        timeout(Duration::from_secs(secs), self.classifier.classify(text))
            .await
            .map_err(|_| ClassificationError::Timeout(secs))?
    }

    async fn extract_with_timeout(
        &self,
        source: &SourceHandle,
        start_seconds: f64,
        end_seconds: f64,
    ) -> Result<crate::clip::ExtractedClip, ClipExtractionError> {
        let secs = self.config.clip.timeout_secs;
        timeout(
            Duration::from_secs(secs),
            self.extractor.extract(source.path(), start_seconds, end_seconds),
        )
        .await
        .map_err(|_| ClipExtractionError::Timeout(secs))?
    }

    /// Re-extract a segment's clip, optionally with edited time bounds.
    /// Used both for retrying a failed extraction and for user edits; the
    /// stored duration is recomputed from the new bounds on save.
    pub async fn reclip_segment(
        &self,
        segment_id: &str,
        start_seconds: f64,
        end_seconds: f64,
    ) -> anyhow::Result<SegmentPayload> {
        let mut segment = self
            .db
            .get_segment(segment_id)?
            .ok_or_else(|| anyhow::anyhow!("Segment not found: {}", segment_id))?;
        let audio_file = self
            .db
            .get_audio_file(&segment.audio_file_id)?
            .ok_or_else(|| anyhow::anyhow!("Audio file not found: {}", segment.audio_file_id))?;

        let source = resolve_source(&audio_file.location_uri).await?;
        let clip = self
            .extract_with_timeout(&source, start_seconds, end_seconds)
            .await?;

        if audio_file.duration_seconds.is_none() {
            self.db
                .set_audio_file_duration_once(&audio_file.id, clip.source_duration_seconds)?;
        }

        let uri = self.media_store.save_clip(
            &audio_file.title,
            segment_id,
            &self.config.clip.format,
            &clip.bytes,
        )?;

        let categories: Vec<String> = self
            .db
            .categories_for_segment(segment_id)?
            .into_iter()
            .map(|c| c.name)
            .collect();

        segment.start_seconds = start_seconds;
        segment.end_seconds = end_seconds;
        segment.clip_uri = Some(uri);
        self.db.save_segment(&segment, &categories)?;

        self.db
            .segment_payload(segment_id)?
            .ok_or_else(|| anyhow::anyhow!("Segment vanished during re-clip: {}", segment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ExtractedClip;
    use crate::notify::{GroupChannelNotifier, NotifyError};
    use crate::transcription::{RawTranscriptSegment, SentenceGroup};
    use async_trait::async_trait;
    use std::path::Path;
    use tempfile::TempDir;

    struct FakeTranscriber {
        groups: Vec<SentenceGroup>,
    }

    #[async_trait]
    impl TranscriptionProvider for FakeTranscriber {
        async fn transcribe(&self, _audio: &Path) -> Result<Vec<SentenceGroup>, TranscriptionError> {
            Ok(self.groups.clone())
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    struct StuckTranscriber;

    #[async_trait]
    impl TranscriptionProvider for StuckTranscriber {
        async fn transcribe(&self, _audio: &Path) -> Result<Vec<SentenceGroup>, TranscriptionError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }

        fn name(&self) -> &'static str {
            "stuck"
        }
    }

    struct FakeClassifier {
        labels: Vec<String>,
    }

    #[async_trait]
    impl CategoryClassifier for FakeClassifier {
        async fn classify(&self, _text: &str) -> Result<Vec<String>, ClassificationError> {
            Ok(self.labels.clone())
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl CategoryClassifier for FailingClassifier {
        async fn classify(&self, _text: &str) -> Result<Vec<String>, ClassificationError> {
            Err(ClassificationError::Unreachable("connection refused".into()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    /// Classifier that knocks the storage layer out from under the run
    /// after a configurable number of segments, simulating an outage that
    /// begins mid-run.
    struct StoreOutageClassifier {
        db: Arc<DatabaseManager>,
        after_calls: usize,
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl CategoryClassifier for StoreOutageClassifier {
        async fn classify(&self, _text: &str) -> Result<Vec<String>, ClassificationError> {
            let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if call == self.after_calls {
                make_db_read_only(&self.db);
            }
            Ok(Vec::new())
        }

        fn name(&self) -> &'static str {
            "store-outage"
        }
    }

    fn make_db_read_only(db: &DatabaseManager) {
        db.with_connection(|conn| {
            conn.pragma_update(None, "query_only", true)?;
            Ok(())
        })
        .unwrap();
    }

    struct FakeExtractor {
        source_duration: f64,
    }

    #[async_trait]
    impl ClipExtractor for FakeExtractor {
        async fn extract(
            &self,
            _source: &Path,
            start: f64,
            end: f64,
        ) -> Result<ExtractedClip, ClipExtractionError> {
            if start >= end {
                return Err(ClipExtractionError::InvalidWindow { start, end });
            }
            Ok(ExtractedClip {
                bytes: vec![0u8; 64],
                source_duration_seconds: self.source_duration,
            })
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl ClipExtractor for FailingExtractor {
        async fn extract(
            &self,
            _source: &Path,
            _start: f64,
            _end: f64,
        ) -> Result<ExtractedClip, ClipExtractionError> {
            Err(ClipExtractionError::Decode("corrupt frame".into()))
        }
    }

    struct Fixture {
        _dir: TempDir,
        db: Arc<DatabaseManager>,
        config: EngineConfig,
        audio_file: AudioFile,
    }

    fn fixture() -> Fixture {
        let _ = env_logger::builder().is_test(true).try_init();

        let dir = TempDir::new().unwrap();
        let db = Arc::new(DatabaseManager::new(dir.path().join("engine.db")).unwrap());

        let source_path = dir.path().join("track.mp3");
        std::fs::write(&source_path, b"not really mp3").unwrap();

        let audio_file = AudioFile::new(
            "af_test".to_string(),
            "42".to_string(),
            "Test Track".to_string(),
            source_path.to_string_lossy().into_owned(),
        );
        db.create_audio_file(&audio_file).unwrap();

        let mut config = EngineConfig::default();
        config.media_root = dir.path().join("media");

        Fixture { _dir: dir, db, config, audio_file }
    }

    fn two_sentence_groups() -> Vec<SentenceGroup> {
        vec![
            vec![
                RawTranscriptSegment::new("hello", 0.0, 1.0, 0.9),
                RawTranscriptSegment::new("world.", 1.0, 2.0, 0.9),
            ],
            vec![RawTranscriptSegment::new("goodbye.", 3.0, 4.0, 0.9)],
        ]
    }

    fn pipeline(
        f: &Fixture,
        transcriber: Arc<dyn TranscriptionProvider>,
        classifier: Arc<dyn CategoryClassifier>,
        extractor: Arc<dyn ClipExtractor>,
        notifier: Arc<dyn SegmentNotifier>,
    ) -> AudioPipeline {
        AudioPipeline::new(
            f.db.clone(),
            transcriber,
            classifier,
            extractor,
            notifier,
            f.config.clone(),
        )
    }

    #[tokio::test]
    async fn test_successful_run_stores_and_notifies() {
        let f = fixture();
        let notifier = Arc::new(GroupChannelNotifier::new());
        let mut rx = notifier.subscribe("user_42");

        let p = pipeline(
            &f,
            Arc::new(FakeTranscriber { groups: two_sentence_groups() }),
            Arc::new(FakeClassifier { labels: vec!["Hello".into()] }),
            Arc::new(FakeExtractor { source_duration: 30.0 }),
            notifier.clone(),
        );

        let result = p
            .run("af_test", "user_42", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.state, RunState::Completed);
        assert_eq!(result.segments.len(), 3);
        assert!(result.segments.iter().all(|s| s.stored && s.has_clip));

        let stored = f.db.list_segments_for_file("af_test").unwrap();
        assert_eq!(stored.len(), 3);
        for pair in stored.windows(2) {
            assert!(pair[0].start_seconds <= pair[1].start_seconds);
        }

        // duration learned from the first extraction, exactly once
        let file = f.db.get_audio_file("af_test").unwrap().unwrap();
        assert_eq!(file.duration_seconds, Some(30.0));

        // one live event per stored segment, in order
        for _ in 0..3 {
            let payload = rx.recv().await.unwrap();
            assert_eq!(payload.categories, vec!["Hello".to_string()]);
            assert!(payload.clip_uri.is_some());
        }
    }

    #[tokio::test]
    async fn test_failing_classifier_yields_completed_with_errors() {
        let f = fixture();
        let p = pipeline(
            &f,
            Arc::new(FakeTranscriber { groups: two_sentence_groups() }),
            Arc::new(FailingClassifier),
            Arc::new(FakeExtractor { source_duration: 30.0 }),
            Arc::new(GroupChannelNotifier::new()),
        );

        let result = p
            .run("af_test", "user_42", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.state, RunState::CompletedWithErrors);
        // one segment per refined element, all stored, all category-less
        assert_eq!(result.segments.len(), 3);
        for outcome in &result.segments {
            assert!(outcome.stored);
            assert_eq!(outcome.category_count, 0);
            assert!(outcome
                .errors
                .iter()
                .any(|e| matches!(e, StageError::Classification(_))));
        }
        assert_eq!(f.db.list_segments_for_file("af_test").unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transcriber_timeout_fails_run_with_zero_segments() {
        let f = fixture();
        let mut config = f.config.clone();
        config.transcription.timeout_secs = 1;
        let p = AudioPipeline::new(
            f.db.clone(),
            Arc::new(StuckTranscriber),
            Arc::new(FakeClassifier { labels: vec![] }),
            Arc::new(FakeExtractor { source_duration: 30.0 }),
            Arc::new(GroupChannelNotifier::new()),
            config,
        );

        let err = p
            .run("af_test", "user_42", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Transcription(TranscriptionError::Timeout(1))
        ));
        assert!(f.db.list_segments_for_file("af_test").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_extraction_keeps_null_clip_uri() {
        let f = fixture();
        let p = pipeline(
            &f,
            Arc::new(FakeTranscriber { groups: two_sentence_groups() }),
            Arc::new(FakeClassifier { labels: vec!["Hello".into()] }),
            Arc::new(FailingExtractor),
            Arc::new(GroupChannelNotifier::new()),
        );

        let result = p
            .run("af_test", "user_42", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.state, RunState::CompletedWithErrors);
        let stored = f.db.list_segments_for_file("af_test").unwrap();
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().all(|s| s.clip_uri.is_none()));
        // duration never learned when extraction never succeeds
        let file = f.db.get_audio_file("af_test").unwrap().unwrap();
        assert_eq!(file.duration_seconds, None);
    }

    #[tokio::test]
    async fn test_store_failure_before_any_save_fails_run() {
        let f = fixture();
        let p = pipeline(
            &f,
            Arc::new(FakeTranscriber { groups: two_sentence_groups() }),
            Arc::new(FakeClassifier { labels: vec![] }),
            Arc::new(FakeExtractor { source_duration: 30.0 }),
            Arc::new(GroupChannelNotifier::new()),
        );

        // The storage backend is gone before the first segment lands
        make_db_read_only(&f.db);

        let err = p
            .run("af_test", "user_42", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::StorageUnreachable(_)));
        assert!(f.db.list_segments_for_file("af_test").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_after_first_success_is_soft() {
        let f = fixture();
        let classifier = Arc::new(StoreOutageClassifier {
            db: f.db.clone(),
            after_calls: 1,
            calls: std::sync::atomic::AtomicUsize::new(0),
        });
        let p = pipeline(
            &f,
            Arc::new(FakeTranscriber { groups: two_sentence_groups() }),
            classifier,
            Arc::new(FakeExtractor { source_duration: 30.0 }),
            Arc::new(GroupChannelNotifier::new()),
        );

        // The outage starts while classifying segment 2, after segment 1
        // was already persisted; later segments are dropped, not fatal
        let result = p
            .run("af_test", "user_42", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.state, RunState::CompletedWithErrors);
        assert_eq!(result.segments.len(), 3);
        assert!(result.segments[0].stored);
        for outcome in &result.segments[1..] {
            assert!(!outcome.stored);
            assert!(outcome
                .errors
                .iter()
                .any(|e| matches!(e, StageError::Store(_))));
        }
        assert_eq!(f.db.list_segments_for_file("af_test").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_audio_file_errors() {
        let f = fixture();
        let p = pipeline(
            &f,
            Arc::new(FakeTranscriber { groups: Vec::new() }),
            Arc::new(FakeClassifier { labels: vec![] }),
            Arc::new(FakeExtractor { source_duration: 30.0 }),
            Arc::new(GroupChannelNotifier::new()),
        );

        let err = p
            .run("af_missing", "user_42", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::AudioFileNotFound(_)));
    }

    #[tokio::test]
    async fn test_cancellation_between_segments() {
        let f = fixture();
        let p = pipeline(
            &f,
            Arc::new(FakeTranscriber { groups: two_sentence_groups() }),
            Arc::new(FakeClassifier { labels: vec![] }),
            Arc::new(FakeExtractor { source_duration: 30.0 }),
            Arc::new(GroupChannelNotifier::new()),
        );

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = p.run("af_test", "user_42", &cancel).await.unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled(_)));
        assert!(f.db.list_segments_for_file("af_test").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reclip_updates_bounds_and_duration() {
        let f = fixture();
        let p = pipeline(
            &f,
            Arc::new(FakeTranscriber { groups: two_sentence_groups() }),
            Arc::new(FakeClassifier { labels: vec!["Hello".into()] }),
            Arc::new(FakeExtractor { source_duration: 30.0 }),
            Arc::new(GroupChannelNotifier::new()),
        );

        let result = p
            .run("af_test", "user_42", &CancellationToken::new())
            .await
            .unwrap();
        let segment_id = &result.segments[0].segment_id;

        let payload = p.reclip_segment(segment_id, 0.5, 3.0).await.unwrap();
        assert_eq!(payload.start_seconds, 0.5);
        assert_eq!(payload.end_seconds, 3.0);
        assert_eq!(payload.duration_seconds, 2.5);
        assert_eq!(payload.categories, vec!["Hello".to_string()]);
        assert!(payload.clip_uri.is_some());
    }
}
