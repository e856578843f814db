//! Pipeline/action consistency validator.
//!
//! An article that claims `last_pipeline = P` should have every action `P`
//! declares recorded in `applied_actions`. Anything missing is drift: the
//! pipeline was interrupted, or the document was edited by hand. Repair
//! reverts `last_pipeline` to `P`'s prerequisite so the pipeline becomes
//! runnable again; `applied_actions` is left alone, because a re-run skips
//! actions already recorded and therefore only fills the gaps.

use crate::models::PipelineDefinition;
use crate::pipeline::TransitionGraph;
use crate::store::{articles, ScanError, StoreResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One article whose applied actions fall short of its pipeline's declaration
#[derive(Debug, Clone)]
pub struct Mismatch {
    pub path: PathBuf,
    pub pipeline: String,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
    pub missing: Vec<String>,
}

/// Outcome of a consistency check over an article root
#[derive(Debug, Clone, Default)]
pub struct ConsistencyReport {
    /// Articles with a non-null `last_pipeline` that were checked
    pub checked: usize,
    pub passed: usize,
    pub mismatches: Vec<Mismatch>,
    /// Articles referencing a pipeline the definitions no longer declare.
    /// Warnings only; definitions evolve independently of on-disk data.
    pub unknown_pipelines: Vec<(PathBuf, String)>,
    /// Per-entity scan failures that did not abort the batch
    pub errors: Vec<ScanError>,
}

impl ConsistencyReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty() && self.errors.is_empty()
    }
}

/// One article reverted by [`ConsistencyChecker::repair`]
#[derive(Debug, Clone)]
pub struct RepairedEntry {
    pub path: PathBuf,
    pub pipeline: String,
    /// Prerequisite state the article was reverted to (`None` = seed)
    pub reverted_to: Option<String>,
}

/// Outcome of a repair pass
#[derive(Debug, Clone, Default)]
pub struct RepairOutcome {
    pub repaired: Vec<RepairedEntry>,
    pub failures: Vec<ScanError>,
    pub report: ConsistencyReport,
}

/// Batch validator over an article root
pub struct ConsistencyChecker<'a> {
    expected_actions: HashMap<&'a str, &'a [String]>,
    graph: &'a TransitionGraph,
}

impl<'a> ConsistencyChecker<'a> {
    pub fn new(definitions: &'a [PipelineDefinition], graph: &'a TransitionGraph) -> Self {
        let expected_actions = definitions
            .iter()
            .map(|definition| (definition.name.as_str(), definition.actions.as_slice()))
            .collect();
        Self {
            expected_actions,
            graph,
        }
    }

    /// Check every article under `root`. Seed articles have nothing to be
    /// inconsistent with and are skipped.
    pub fn check(&self, root: &Path) -> StoreResult<ConsistencyReport> {
        let outcome = articles::scan(root)?;

        let mut report = ConsistencyReport {
            errors: outcome.errors,
            ..ConsistencyReport::default()
        };

        for folder in &outcome.folders {
            let Some(pipeline) = folder.article.pipeline_state() else {
                continue;
            };

            let Some(expected) = self.expected_actions.get(pipeline) else {
                report
                    .unknown_pipelines
                    .push((folder.path.clone(), pipeline.to_string()));
                continue;
            };

            report.checked += 1;
            let missing: Vec<String> = expected
                .iter()
                .filter(|action| !folder.article.applied_actions.contains(action))
                .cloned()
                .collect();

            if missing.is_empty() {
                report.passed += 1;
            } else {
                report.mismatches.push(Mismatch {
                    path: folder.path.clone(),
                    pipeline: pipeline.to_string(),
                    expected: expected.to_vec(),
                    actual: folder.article.applied_actions.clone(),
                    missing,
                });
            }
        }

        Ok(report)
    }

    /// Revert every drifted article to its pipeline's prerequisite state.
    ///
    /// `applied_actions` is deliberately untouched. Per-entity failures are
    /// collected, not propagated.
    pub fn repair(&self, root: &Path) -> StoreResult<RepairOutcome> {
        let report = self.check(root)?;
        let mut outcome = RepairOutcome::default();

        for mismatch in &report.mismatches {
            let Some(prerequisite) = self.graph.prerequisite_of(&mismatch.pipeline) else {
                outcome.failures.push(ScanError {
                    path: mismatch.path.clone(),
                    message: format!(
                        "Cannot repair: pipeline '{}' has no known prerequisite",
                        mismatch.pipeline
                    ),
                });
                continue;
            };

            let mut updates = Map::new();
            updates.insert(
                "last_pipeline".to_string(),
                match prerequisite {
                    Some(state) => Value::String(state.to_string()),
                    None => Value::Null,
                },
            );

            match articles::update_meta(&mismatch.path, updates) {
                Ok(_) => outcome.repaired.push(RepairedEntry {
                    path: mismatch.path.clone(),
                    pipeline: mismatch.pipeline.clone(),
                    reverted_to: prerequisite.map(String::from),
                }),
                Err(err) => outcome.failures.push(ScanError {
                    path: mismatch.path.clone(),
                    message: err.to_string(),
                }),
            }
        }

        outcome.report = report;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;
    use crate::store::articles::create;
    use serde_json::json;
    use tempfile::TempDir;

    fn definitions() -> Vec<PipelineDefinition> {
        vec![
            PipelineDefinition::new("generate", None).with_actions(&["write_content", "write_faq"]),
            PipelineDefinition::new("enhance", Some("generate")).with_actions(&["rewrite_title"]),
        ]
    }

    fn article_with(root: &Path, rel: &str, pipeline: &str, applied: &[&str]) -> PathBuf {
        let folder = create(root, rel, Article::new(rel, "test"), None).unwrap();
        let mut updates = Map::new();
        updates.insert("last_pipeline".to_string(), json!(pipeline));
        updates.insert("applied_actions".to_string(), json!(applied));
        articles::update_meta(&folder.path, updates).unwrap();
        folder.path
    }

    #[test]
    fn test_complete_article_passes() {
        let temp_dir = TempDir::new().unwrap();
        let definitions = definitions();
        let graph = TransitionGraph::from_definitions(&definitions);
        article_with(
            temp_dir.path(),
            "a",
            "generate",
            &["write_content", "write_faq"],
        );

        let checker = ConsistencyChecker::new(&definitions, &graph);
        let report = checker.check(temp_dir.path()).unwrap();

        assert_eq!(report.checked, 1);
        assert_eq!(report.passed, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_missing_actions_are_reported() {
        let temp_dir = TempDir::new().unwrap();
        let definitions = definitions();
        let graph = TransitionGraph::from_definitions(&definitions);
        article_with(temp_dir.path(), "a", "generate", &["write_content"]);

        let checker = ConsistencyChecker::new(&definitions, &graph);
        let report = checker.check(temp_dir.path()).unwrap();

        assert_eq!(report.mismatches.len(), 1);
        let mismatch = &report.mismatches[0];
        assert_eq!(mismatch.pipeline, "generate");
        assert_eq!(mismatch.missing, vec!["write_faq"]);
        assert_eq!(mismatch.actual, vec!["write_content"]);
    }

    #[test]
    fn test_seed_articles_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let definitions = definitions();
        let graph = TransitionGraph::from_definitions(&definitions);
        create(temp_dir.path(), "seed", Article::new("seed", "x"), None).unwrap();

        let checker = ConsistencyChecker::new(&definitions, &graph);
        let report = checker.check(temp_dir.path()).unwrap();

        assert_eq!(report.checked, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_unknown_pipeline_is_a_warning_not_a_failure() {
        let temp_dir = TempDir::new().unwrap();
        let definitions = definitions();
        let graph = TransitionGraph::from_definitions(&definitions);
        article_with(temp_dir.path(), "a", "retired_pipeline", &[]);

        let checker = ConsistencyChecker::new(&definitions, &graph);
        let report = checker.check(temp_dir.path()).unwrap();

        assert_eq!(report.checked, 0);
        assert_eq!(report.unknown_pipelines.len(), 1);
        assert_eq!(report.unknown_pipelines[0].1, "retired_pipeline");
        assert!(report.is_clean());
    }

    #[test]
    fn test_repair_reverts_pipeline_and_keeps_applied_actions() {
        let temp_dir = TempDir::new().unwrap();
        let definitions = definitions();
        let graph = TransitionGraph::from_definitions(&definitions);
        let drifted = article_with(temp_dir.path(), "a", "enhance", &["write_content"]);

        let checker = ConsistencyChecker::new(&definitions, &graph);
        let outcome = checker.repair(temp_dir.path()).unwrap();

        assert_eq!(outcome.repaired.len(), 1);
        assert_eq!(outcome.repaired[0].reverted_to.as_deref(), Some("generate"));
        assert!(outcome.failures.is_empty());

        let repaired = articles::read_meta(&drifted).unwrap().unwrap();
        assert_eq!(repaired.last_pipeline.as_deref(), Some("generate"));
        assert_eq!(repaired.applied_actions, vec!["write_content"]);
    }

    #[test]
    fn test_repair_to_seed_state() {
        let temp_dir = TempDir::new().unwrap();
        let definitions = definitions();
        let graph = TransitionGraph::from_definitions(&definitions);
        let drifted = article_with(temp_dir.path(), "a", "generate", &[]);

        let checker = ConsistencyChecker::new(&definitions, &graph);
        let outcome = checker.repair(temp_dir.path()).unwrap();

        assert_eq!(outcome.repaired[0].reverted_to, None);
        let repaired = articles::read_meta(&drifted).unwrap().unwrap();
        assert!(repaired.last_pipeline.is_none());
    }

    #[test]
    fn test_repair_converges_once_the_reverted_state_is_complete() {
        let temp_dir = TempDir::new().unwrap();
        let definitions = definitions();
        let graph = TransitionGraph::from_definitions(&definitions);
        // enhance was interrupted after generate fully completed
        article_with(
            temp_dir.path(),
            "a",
            "enhance",
            &["write_content", "write_faq"],
        );

        let checker = ConsistencyChecker::new(&definitions, &graph);
        let first = checker.repair(temp_dir.path()).unwrap();
        assert_eq!(first.repaired.len(), 1);

        // The reverted article satisfies generate's action set; a second
        // pass finds nothing to do.
        let second = checker.repair(temp_dir.path()).unwrap();
        assert!(second.repaired.is_empty());
        assert!(second.report.is_clean());
    }
}
