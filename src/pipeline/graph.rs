use crate::models::PipelineDefinition;
use crate::{Context, Result};
use regex::Regex;
use std::collections::HashMap;

/// States matching this pattern may be published
pub const DEFAULT_PUBLISHABLE_PATTERN: &str = "^enhance";

/// State machine over the `last_pipeline` field.
///
/// States are `None` (seed, never processed) plus every pipeline name the
/// supplied definitions declare. For every pipeline `P` requiring prerequisite
/// state `S`, the graph has the edge `S -> P`; a pipeline nothing depends on
/// is a terminal state with no outgoing edges. The graph is built once at
/// startup and passed by reference to everything that consults it.
#[derive(Debug, Clone)]
pub struct TransitionGraph {
    /// Pipelines runnable from the seed state
    seed_next: Vec<String>,
    /// Pipelines runnable from each named state
    next: HashMap<String, Vec<String>>,
    /// Declared prerequisite per pipeline, for inverse lookups
    prerequisites: HashMap<String, Option<String>>,
    publishable: Regex,
}

impl TransitionGraph {
    pub fn from_definitions(definitions: &[PipelineDefinition]) -> Self {
        let mut seed_next = Vec::new();
        let mut next: HashMap<String, Vec<String>> = HashMap::new();
        let mut prerequisites = HashMap::new();

        for definition in definitions {
            // Every declared pipeline is a known state, terminal until some
            // other definition names it as a prerequisite.
            next.entry(definition.name.clone()).or_default();
            prerequisites
                .entry(definition.name.clone())
                .or_insert_with(|| definition.prerequisite().map(String::from));

            match definition.prerequisite() {
                None => seed_next.push(definition.name.clone()),
                Some(state) => next
                    .entry(state.to_string())
                    .or_default()
                    .push(definition.name.clone()),
            }
        }

        let publishable = Regex::new(DEFAULT_PUBLISHABLE_PATTERN)
            .expect("default publishable pattern is valid");

        Self {
            seed_next,
            next,
            prerequisites,
            publishable,
        }
    }

    /// Replace the publishable-state pattern.
    pub fn with_publishable_pattern(mut self, pattern: &str) -> Result<Self> {
        self.publishable = Regex::new(pattern)
            .with_context(|| format!("Invalid publishable pattern '{}'", pattern))?;
        Ok(self)
    }

    /// Pipelines that may run from `state`. Empty for unknown states.
    pub fn next_states(&self, state: Option<&str>) -> &[String] {
        match state {
            None => &self.seed_next,
            Some(name) => self.next.get(name).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    pub fn is_valid_transition(&self, from: Option<&str>, to: &str) -> bool {
        self.next_states(from).iter().any(|name| name == to)
    }

    /// Declared prerequisite state of `pipeline`; outer `None` when the
    /// pipeline is unknown.
    pub fn prerequisite_of(&self, pipeline: &str) -> Option<Option<&str>> {
        self.prerequisites
            .get(pipeline)
            .map(|state| state.as_deref())
    }

    /// Whether an article in `state` may be published. The seed state never is.
    pub fn is_publishable(&self, state: Option<&str>) -> bool {
        state.map_or(false, |name| self.publishable.is_match(name))
    }

    /// Every declared pipeline name, sorted
    pub fn pipelines(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.prerequisites.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every state of the machine: the seed state plus every pipeline name
    pub fn states(&self) -> Vec<Option<&str>> {
        let mut states = vec![None];
        states.extend(self.pipelines().into_iter().map(Some));
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions() -> Vec<PipelineDefinition> {
        vec![
            PipelineDefinition::new("generate", None),
            PipelineDefinition::new("enhance_seo", Some("generate")),
            PipelineDefinition::new("enhance_readability", Some("generate")),
            PipelineDefinition::new("enhance_final", Some("enhance_seo")),
        ]
    }

    #[test]
    fn test_seed_transition_is_valid() {
        let graph = TransitionGraph::from_definitions(&definitions());
        assert!(graph.is_valid_transition(None, "generate"));
        assert!(!graph.is_valid_transition(Some("generate"), "generate"));
    }

    #[test]
    fn test_branching_prerequisites() {
        let graph = TransitionGraph::from_definitions(&definitions());
        let next = graph.next_states(Some("generate"));
        assert_eq!(next, &["enhance_seo", "enhance_readability"]);
    }

    #[test]
    fn test_terminal_pipeline_is_a_known_state() {
        let graph = TransitionGraph::from_definitions(&definitions());
        assert!(graph.next_states(Some("enhance_final")).is_empty());
        assert_eq!(
            graph.prerequisite_of("enhance_final"),
            Some(Some("enhance_seo"))
        );
    }

    #[test]
    fn test_unknown_state_has_no_transitions() {
        let graph = TransitionGraph::from_definitions(&definitions());
        assert!(graph.next_states(Some("bogus")).is_empty());
        assert_eq!(graph.prerequisite_of("bogus"), None);
    }

    #[test]
    fn test_prerequisite_inversion() {
        let graph = TransitionGraph::from_definitions(&definitions());
        assert_eq!(graph.prerequisite_of("generate"), Some(None));
        assert_eq!(
            graph.prerequisite_of("enhance_seo"),
            Some(Some("generate"))
        );
    }

    #[test]
    fn test_default_publishable_pattern() {
        let graph = TransitionGraph::from_definitions(&definitions());
        assert!(graph.is_publishable(Some("enhance_seo")));
        assert!(graph.is_publishable(Some("enhance_final")));
        assert!(!graph.is_publishable(Some("generate")));
        assert!(!graph.is_publishable(None));
    }

    #[test]
    fn test_custom_publishable_pattern() {
        let graph = TransitionGraph::from_definitions(&definitions())
            .with_publishable_pattern("_final$")
            .unwrap();
        assert!(graph.is_publishable(Some("enhance_final")));
        assert!(!graph.is_publishable(Some("enhance_seo")));
    }

    #[test]
    fn test_invalid_publishable_pattern_is_rejected() {
        let result =
            TransitionGraph::from_definitions(&definitions()).with_publishable_pattern("(");
        assert!(result.is_err());
    }

    #[test]
    fn test_pipelines_listing() {
        let graph = TransitionGraph::from_definitions(&definitions());
        assert_eq!(
            graph.pipelines(),
            vec![
                "enhance_final",
                "enhance_readability",
                "enhance_seo",
                "generate"
            ]
        );
    }

    #[test]
    fn test_states_include_seed() {
        let graph = TransitionGraph::from_definitions(&definitions());
        let states = graph.states();
        assert_eq!(states[0], None);
        assert_eq!(states.len(), 5);
    }
}
