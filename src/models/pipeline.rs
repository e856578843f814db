//! Pipeline definitions and the configuration file they arrive in.
//!
//! Definitions are externally supplied; nothing about the transition table is
//! hard-coded. Each pipeline declares the `last_pipeline` state an article
//! must be in before the pipeline may run, plus the actions a completed run
//! is expected to have recorded.

use crate::pipeline::TransitionGraph;
use crate::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Entry condition for a pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleFilter {
    /// Required `last_pipeline` state; `None` selects seed articles
    #[serde(default)]
    pub last_pipeline: Option<String>,
}

/// One externally supplied pipeline definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineDefinition {
    pub name: String,

    #[serde(default)]
    pub article_filter: ArticleFilter,

    /// Actions a completed run of this pipeline records in `applied_actions`
    #[serde(default)]
    pub actions: Vec<String>,
}

impl PipelineDefinition {
    pub fn new(name: impl Into<String>, prerequisite: Option<&str>) -> Self {
        Self {
            name: name.into(),
            article_filter: ArticleFilter {
                last_pipeline: prerequisite.map(String::from),
            },
            actions: Vec::new(),
        }
    }

    pub fn with_actions(mut self, actions: &[&str]) -> Self {
        self.actions = actions.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Required prerequisite state (`None` = seed)
    pub fn prerequisite(&self) -> Option<&str> {
        self.article_filter.last_pipeline.as_deref()
    }
}

/// The `pipelines.yaml` configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelinesConfig {
    #[serde(default)]
    pub pipelines: Vec<PipelineDefinition>,

    /// Override for the publishable-state regex (default: starts with `enhance`)
    #[serde(default)]
    pub publishable_pattern: Option<String>,
}

impl PipelinesConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse pipeline config {}", path.display()))
    }

    /// Build the transition graph this configuration describes.
    pub fn build_graph(&self) -> Result<TransitionGraph> {
        let graph = TransitionGraph::from_definitions(&self.pipelines);
        match &self.publishable_pattern {
            Some(pattern) => graph.with_publishable_pattern(pattern),
            None => Ok(graph),
        }
    }
}

/// Mapping from deprecated status values to `last_pipeline` states.
///
/// Pre-migration documents carried a coarse `status` field instead of
/// `last_pipeline`; these are the equivalences the migration era settled on.
const LEGACY_STATUS_STATES: &[(&str, Option<&str>)] = &[
    ("idea", None),
    ("draft", None),
    ("generated", Some("generate")),
    ("enhanced", Some("enhance")),
    ("published", Some("enhance")),
];

/// Translate a deprecated status value into a `last_pipeline` state.
///
/// Outer `None` means the status is unknown and cannot be translated.
pub fn last_pipeline_for_legacy_status(status: &str) -> Option<Option<&'static str>> {
    LEGACY_STATUS_STATES
        .iter()
        .find(|(legacy, _)| *legacy == status)
        .map(|(_, state)| *state)
}
