// Audoji engine - audio segmentation pipeline
//
// Turns an uploaded music track into short, categorized, individually
// playable clips:
// - transcription (hosted Whisper API or local whisper.cpp)
// - confidence-based segment boundary refinement
// - category classification against a controlled vocabulary
// - ffmpeg clip extraction and filesystem media storage
// - SQLite persistence and per-user live notification

pub mod classification;
pub mod clip;
pub mod config;
pub mod database;
pub mod notify;
pub mod pipeline;
pub mod transcription;

pub use config::EngineConfig;
pub use database::DatabaseManager;
pub use notify::{GroupChannelNotifier, SegmentNotifier};
pub use pipeline::{AudioPipeline, PipelineQueue, PipelineResult, RunState};
