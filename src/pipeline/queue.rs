// Pipeline queue
// Fire-and-forget dispatch: enqueue validates the audio file synchronously,
// then hands the job to a dispatcher task that spawns one tokio task per run
// so independent sources process concurrently. Failed runs leave their
// diagnostic trail in the logs and are never retried automatically; retry is
// an explicit re-enqueue.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::orchestrator::AudioPipeline;
use crate::config::TranscriptionBackend;

#[derive(Debug)]
struct PipelineJob {
    audio_file_id: String,
    backend: Option<TranscriptionBackend>,
    notify_group: String,
}

pub struct PipelineQueue {
    pipeline: Arc<AudioPipeline>,
    tx: mpsc::UnboundedSender<PipelineJob>,
    active: Arc<DashMap<String, CancellationToken>>,
}

impl PipelineQueue {
    /// Start the dispatcher. The queue lives as long as this handle; dropping
    /// it closes the channel and the dispatcher drains what is left.
    pub fn new(pipeline: Arc<AudioPipeline>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PipelineJob>();
        let active: Arc<DashMap<String, CancellationToken>> = Arc::new(DashMap::new());

        let dispatch_pipeline = pipeline.clone();
        let dispatch_active = active.clone();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let pipeline = dispatch_pipeline.clone();
                let active = dispatch_active.clone();
                tokio::spawn(async move {
                    let cancel = active
                        .get(&job.audio_file_id)
                        .map(|entry| entry.value().clone())
                        .unwrap_or_default();

                    match pipeline
                        .run_with_backend(
                            &job.audio_file_id,
                            job.backend,
                            &job.notify_group,
                            &cancel,
                        )
                        .await
                    {
                        Ok(result) => log::info!(
                            "Run for {} finished {} ({} segments)",
                            result.audio_file_id,
                            result.state,
                            result.segments.len()
                        ),
                        Err(e) => log::error!("Run for {} failed: {}", job.audio_file_id, e),
                    }

                    active.remove(&job.audio_file_id);
                });
            }
        });

        Self { pipeline, tx, active }
    }

    /// Queue a run for an uploaded source. Returns immediately after the
    /// existence check; processing happens in the background.
    pub fn enqueue(
        &self,
        audio_file_id: &str,
        backend: Option<TranscriptionBackend>,
        notify_group: &str,
    ) -> Result<()> {
        // Unknown ids surface to the caller now, not as a background failure
        self.pipeline
            .db()
            .get_audio_file(audio_file_id)?
            .ok_or_else(|| anyhow!("Cannot enqueue unknown audio file: {}", audio_file_id))?;

        // One live job per source; overwriting the token of a running job
        // would orphan it from cancel()
        match self.active.entry(audio_file_id.to_string()) {
            Entry::Occupied(_) => {
                return Err(anyhow!(
                    "Audio file {} is already queued or running",
                    audio_file_id
                ));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CancellationToken::new());
            }
        }

        if self
            .tx
            .send(PipelineJob {
                audio_file_id: audio_file_id.to_string(),
                backend,
                notify_group: notify_group.to_string(),
            })
            .is_err()
        {
            self.active.remove(audio_file_id);
            return Err(anyhow!("Pipeline dispatcher is gone"));
        }

        log::info!("Enqueued pipeline run for {}", audio_file_id);
        Ok(())
    }

    /// Cooperatively cancel a queued or running job, e.g. when the source
    /// was deleted mid-run. Segments already stored stay.
    pub fn cancel(&self, audio_file_id: &str) -> bool {
        match self.active.get(audio_file_id) {
            // The entry stays until the run observes the token and exits
            Some(entry) => {
                entry.cancel();
                log::info!("Cancelled pipeline run for {}", audio_file_id);
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, audio_file_id: &str) -> bool {
        self.active.contains_key(audio_file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{CategoryClassifier, ClassificationError};
    use crate::clip::{ClipExtractionError, ClipExtractor, ExtractedClip};
    use crate::config::EngineConfig;
    use crate::database::models::AudioFile;
    use crate::database::DatabaseManager;
    use crate::notify::GroupChannelNotifier;
    use crate::transcription::{
        RawTranscriptSegment, SentenceGroup, TranscriptionError, TranscriptionProvider,
    };
    use async_trait::async_trait;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    struct OneLineTranscriber;

    #[async_trait]
    impl TranscriptionProvider for OneLineTranscriber {
        async fn transcribe(&self, _audio: &Path) -> Result<Vec<SentenceGroup>, TranscriptionError> {
            Ok(vec![vec![RawTranscriptSegment::new("hello.", 0.0, 1.0, 0.9)]])
        }

        fn name(&self) -> &'static str {
            "one-line"
        }
    }

    struct NoopClassifier;

    #[async_trait]
    impl CategoryClassifier for NoopClassifier {
        async fn classify(&self, _text: &str) -> Result<Vec<String>, ClassificationError> {
            Ok(vec!["Hello".to_string()])
        }

        fn name(&self) -> &'static str {
            "noop"
        }
    }

    struct NoopExtractor;

    #[async_trait]
    impl ClipExtractor for NoopExtractor {
        async fn extract(
            &self,
            _source: &Path,
            _start: f64,
            _end: f64,
        ) -> Result<ExtractedClip, ClipExtractionError> {
            Ok(ExtractedClip {
                bytes: vec![0u8; 16],
                source_duration_seconds: 12.0,
            })
        }
    }

    fn queue_fixture() -> (TempDir, Arc<DatabaseManager>, Arc<GroupChannelNotifier>, PipelineQueue) {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(DatabaseManager::new(dir.path().join("engine.db")).unwrap());

        let source_path = dir.path().join("track.mp3");
        std::fs::write(&source_path, b"bytes").unwrap();
        let file = AudioFile::new(
            "af_q".to_string(),
            "7".to_string(),
            "Queued Track".to_string(),
            source_path.to_string_lossy().into_owned(),
        );
        db.create_audio_file(&file).unwrap();

        let mut config = EngineConfig::default();
        config.media_root = dir.path().join("media");

        let notifier = Arc::new(GroupChannelNotifier::new());
        let pipeline = Arc::new(AudioPipeline::new(
            db.clone(),
            Arc::new(OneLineTranscriber),
            Arc::new(NoopClassifier),
            Arc::new(NoopExtractor),
            notifier.clone(),
            config,
        ));

        let queue = PipelineQueue::new(pipeline);
        (dir, db, notifier, queue)
    }

    #[tokio::test]
    async fn test_enqueue_unknown_file_errors_synchronously() {
        let (_dir, _db, _notifier, queue) = queue_fixture();
        assert!(queue.enqueue("af_nope", None, "user_7").is_err());
    }

    #[tokio::test]
    async fn test_enqueued_run_completes_in_background() {
        let (_dir, db, notifier, queue) = queue_fixture();
        let mut rx = notifier.subscribe("user_7");

        queue.enqueue("af_q", None, "user_7").unwrap();

        let payload = rx.recv().await.unwrap();
        assert_eq!(payload.transcription, "hello.");
        assert_eq!(db.list_segments_for_file("af_q").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_enqueue_rejected_while_active() {
        let (_dir, db, notifier, queue) = queue_fixture();
        let mut rx = notifier.subscribe("user_7");

        queue.enqueue("af_q", None, "user_7").unwrap();
        // The first job still owns the cancellation slot
        assert!(queue.enqueue("af_q", None, "user_7").is_err());

        rx.recv().await.unwrap();
        for _ in 0..100 {
            if !queue.is_active("af_q") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!queue.is_active("af_q"));
        assert_eq!(db.list_segments_for_file("af_q").unwrap().len(), 1);

        // Once the run finished, re-enqueueing the same source is fine
        queue.enqueue("af_q", None, "user_7").unwrap();
    }

    #[tokio::test]
    async fn test_cancel_before_dispatch_stores_nothing() {
        let (_dir, db, _notifier, queue) = queue_fixture();

        queue.enqueue("af_q", None, "user_7").unwrap();
        assert!(queue.cancel("af_q"));

        // let the dispatcher observe the cancelled token
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(db.list_segments_for_file("af_q").unwrap().is_empty());
        assert!(!queue.is_active("af_q"));
        assert!(!queue.cancel("af_q"));
    }
}
