//! File transcription pipeline.

pub mod orchestrator;

pub use orchestrator::{FilePipeline, FilePipelineConfig, NullProgress, ProgressSink};
