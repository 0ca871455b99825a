//! Core pipeline orchestration and domain logic for featuredoc.
//!
//! This crate ties together PR fact aggregation, metadata inference, prompt
//! compilation, narrative generation, block conversion, and page creation
//! into the end-to-end `generate` workflow.

pub mod collaborators;
pub mod metadata;
pub mod narrative;
pub mod pipeline;
pub mod prompt;

pub use collaborators::{KnowledgeStore, NarrativeGenerator, SourceHost};
pub use pipeline::{
    FeatureDocResult, LiveCollaborators, PipelineOptions, ProgressReporter, SilentProgress,
    generate_feature_doc,
};
pub use prompt::{CompiledPrompt, compile_prompt};
