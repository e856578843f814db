// Contentd - Filesystem-backed content store
// Articles live as folders of JSON documents with sidecar mirrors; pipelines
// move them through an externally configured lifecycle graph.

pub mod cli;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod validator;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use models::{Article, CostEntry, PipelineDefinition, PipelinesConfig, PlanStatus, Project};
pub use pipeline::TransitionGraph;
pub use store::{DocumentStore, StoreError, StoreResult};
pub use validator::{ConsistencyChecker, ConsistencyReport};
