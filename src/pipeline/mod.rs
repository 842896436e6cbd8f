// Pipeline module
// The run state machine: transcribe a source track, refine segment windows,
// classify, extract clips, persist and notify. Runs are dispatched through
// the queue and execute independently of each other.

pub mod orchestrator;
pub mod queue;
pub mod refiner;
pub mod types;

pub use orchestrator::AudioPipeline;
pub use queue::PipelineQueue;
pub use refiner::{refine_group, RefinedSegment};
pub use types::{PipelineError, PipelineResult, RunState, SegmentOutcome, StageError};
