//! Wiring of data sources, engine and caches into the served pipeline.

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineError, PipelineSettings};
