pub mod article;
pub mod pipeline;
pub mod project;

pub use article::{Article, CostEntry, PlanStatus};
pub use pipeline::{
    last_pipeline_for_legacy_status, ArticleFilter, PipelineDefinition, PipelinesConfig,
};
pub use project::Project;
