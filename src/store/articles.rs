//! Article folder operations: discovery, creation, versioned mutation,
//! archival, and aggregate queries.
//!
//! A directory containing `index.json` is an article folder and is never
//! recursed into. A directory containing the pre-migration `meta.json` (and
//! no `index.json`) is legacy data; every operation refuses to touch it until
//! the migration tool has run.

use crate::models::{Article, CostEntry, PlanStatus};
use crate::pipeline::TransitionGraph;
use crate::store::history::{self, ArchiveExtras, HISTORY_DIR};
use crate::store::{DocumentStore, StoreError, StoreResult, INDEX_FILE};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Marker file of the pre-migration schema
pub const LEGACY_META_FILE: &str = "meta.json";

/// One discovered article folder
#[derive(Debug, Clone)]
pub struct ArticleFolder {
    pub path: PathBuf,
    pub article: Article,
}

/// A per-entity failure recorded during a batch operation
#[derive(Debug, Clone)]
pub struct ScanError {
    pub path: PathBuf,
    pub message: String,
}

/// Result of a batch scan: discovered folders plus per-entity failures that
/// did not abort the batch
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub folders: Vec<ArticleFolder>,
    pub errors: Vec<ScanError>,
}

/// Inputs for [`save_with_pipeline_transition`]
#[derive(Debug, Clone, Default)]
pub struct TransitionUpdate<'a> {
    /// New article content (the unified write carries content and metadata
    /// together)
    pub content: &'a str,
    /// Pipeline to record in `last_pipeline`; `None` keeps the current value
    pub pipeline: Option<&'a str>,
    /// Action label for the pre-mutation archive folder
    pub archive_label: &'a str,
    /// Extra metadata merged in before the lifecycle fields are set
    pub meta_updates: Option<Map<String, Value>>,
    pub prompt: Option<&'a str>,
    pub response: Option<&'a str>,
}

/// Counts for the plan overview, grouped by [`PlanStatus`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub total: usize,
    pub seed: usize,
    pub in_progress: usize,
    pub ready: usize,
    pub published: usize,
    pub errors: usize,
}

/// True iff `dir` holds pre-migration data
pub fn is_legacy_folder(dir: &Path) -> bool {
    dir.join(LEGACY_META_FILE).exists() && !dir.join(INDEX_FILE).exists()
}

/// Hard stop on legacy folders; continuing would silently operate on or
/// alongside stale data.
pub fn ensure_not_legacy(dir: &Path) -> StoreResult<()> {
    if is_legacy_folder(dir) {
        return Err(StoreError::LegacyFormat {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Recursively discover article folders under `root`.
///
/// Parse failures on individual documents are collected in the outcome and do
/// not abort the scan; a legacy-format folder anywhere in the tree does.
pub fn scan(root: &Path) -> StoreResult<ScanOutcome> {
    let mut outcome = ScanOutcome::default();
    if root.exists() {
        scan_dir(root, &mut outcome)?;
    }
    Ok(outcome)
}

fn scan_dir(dir: &Path, outcome: &mut ScanOutcome) -> StoreResult<()> {
    ensure_not_legacy(dir)?;

    if dir.join(INDEX_FILE).exists() {
        // A leaf entity folder; whatever directories it contains are its own
        // business, not further articles.
        match DocumentStore::<Article>::new(dir).read() {
            Ok(Some(article)) => outcome.folders.push(ArticleFolder {
                path: dir.to_path_buf(),
                article,
            }),
            Ok(None) => {}
            Err(err) => outcome.errors.push(ScanError {
                path: dir.to_path_buf(),
                message: err.to_string(),
            }),
        }
        return Ok(());
    }

    let mut subdirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();

    for subdir in subdirs {
        let Some(name) = subdir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || name == HISTORY_DIR {
            continue;
        }
        scan_dir(&subdir, outcome)?;
    }

    Ok(())
}

/// Create a brand-new article folder and perform its first write.
pub fn create(
    root: &Path,
    relative_path: &str,
    mut article: Article,
    content: Option<&str>,
) -> StoreResult<ArticleFolder> {
    let dir = root.join(relative_path);
    ensure_not_legacy(&dir)?;

    let store = DocumentStore::<Article>::new(&dir);
    if store.exists() {
        return Err(StoreError::AlreadyExists {
            path: store.index_path(),
        });
    }

    fs::create_dir_all(&dir)?;
    if let Some(text) = content {
        article.content = Some(text.to_string());
    }

    let article = store.write(article)?;
    Ok(ArticleFolder { path: dir, article })
}

/// Read an article's document, `None` if absent.
pub fn read_meta(dir: &Path) -> StoreResult<Option<Article>> {
    ensure_not_legacy(dir)?;
    DocumentStore::<Article>::new(dir).read()
}

/// Read an article's content field, `None` if the document or field is absent.
pub fn read_content(dir: &Path) -> StoreResult<Option<String>> {
    Ok(read_meta(dir)?.and_then(|article| article.content))
}

/// Delete an article folder recursively. No soft-delete, no tombstones.
pub fn delete(dir: &Path) -> StoreResult<()> {
    ensure_not_legacy(dir)?;
    fs::remove_dir_all(dir)?;
    Ok(())
}

/// Merge metadata updates into an existing article, preserving content.
///
/// Fails with `NotFound` rather than silently creating a document.
pub fn update_meta(dir: &Path, updates: Map<String, Value>) -> StoreResult<Article> {
    ensure_not_legacy(dir)?;

    let store = DocumentStore::<Article>::new(dir);
    if !store.exists() {
        return Err(StoreError::NotFound {
            path: store.index_path(),
        });
    }
    store.update(updates)
}

/// Record a pipeline result: archive the pre-mutation snapshot, then write
/// content, metadata and the lifecycle move as one document.
///
/// A `pipeline` different from the current state must be a valid edge in the
/// transition graph; `None` keeps the current value (a deliberate merge
/// signal), and re-recording the current pipeline is a re-run, not a
/// transition.
pub fn save_with_pipeline_transition(
    dir: &Path,
    update: TransitionUpdate<'_>,
    graph: &TransitionGraph,
) -> StoreResult<Article> {
    ensure_not_legacy(dir)?;

    let store = DocumentStore::<Article>::new(dir);
    let mut doc = store.read_value()?.ok_or_else(|| StoreError::NotFound {
        path: store.index_path(),
    })?;

    let current = doc
        .get("last_pipeline")
        .and_then(Value::as_str)
        .map(str::to_string);

    if let Some(next) = update.pipeline {
        if current.as_deref() != Some(next) && !graph.is_valid_transition(current.as_deref(), next)
        {
            return Err(StoreError::InvalidTransition {
                from: current.unwrap_or_else(|| "seed".to_string()),
                to: next.to_string(),
            });
        }
    }

    // Archive strictly before the new document is written, so the snapshot
    // reflects the state immediately prior to this mutation.
    if let Some(existing) = doc.get("content").and_then(Value::as_str) {
        if !existing.is_empty() {
            let raw = serde_json::to_string_pretty(&doc)? + "\n";
            history::archive_version(
                dir,
                existing,
                &raw,
                update.archive_label,
                ArchiveExtras {
                    prompt: update.prompt,
                    response: update.response,
                },
            )?;
        }
    }

    if let Some(meta) = update.meta_updates {
        for (key, value) in meta {
            doc.insert(key, value);
        }
    }
    if let Some(next) = update.pipeline {
        doc.insert(
            "last_pipeline".to_string(),
            Value::String(next.to_string()),
        );
    }
    doc.insert(
        "content".to_string(),
        Value::String(update.content.to_string()),
    );

    let written = store.write_value(doc)?;
    serde_json::from_value(Value::Object(written)).map_err(StoreError::Json)
}

/// Record an action as applied. Idempotent: a second call with the same
/// action performs no write at all.
pub fn add_applied_action(dir: &Path, action: &str) -> StoreResult<()> {
    ensure_not_legacy(dir)?;

    let store = DocumentStore::<Article>::new(dir);
    let mut doc = store.read_value()?.ok_or_else(|| StoreError::NotFound {
        path: store.index_path(),
    })?;

    let applied = doc
        .get("applied_actions")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if applied.iter().any(|entry| entry.as_str() == Some(action)) {
        return Ok(());
    }

    let mut applied = applied;
    applied.push(Value::String(action.to_string()));
    doc.insert("applied_actions".to_string(), Value::Array(applied));
    store.write_value(doc)?;
    Ok(())
}

/// Append a line to the cost ledger. Never deduplicates.
pub fn add_cost_entry(
    dir: &Path,
    action: &str,
    cost_usd: f64,
    stats: Option<Map<String, Value>>,
) -> StoreResult<()> {
    ensure_not_legacy(dir)?;

    let store = DocumentStore::<Article>::new(dir);
    let mut doc = store.read_value()?.ok_or_else(|| StoreError::NotFound {
        path: store.index_path(),
    })?;

    let mut entry = CostEntry::new(action, cost_usd);
    if let Some(stats) = stats {
        entry.stats = stats;
    }

    let mut costs = doc
        .get("costs")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    costs.push(serde_json::to_value(entry)?);
    doc.insert("costs".to_string(), Value::Array(costs));
    store.write_value(doc)?;
    Ok(())
}

/// Articles whose `last_pipeline` is one of `allowed` (`None` selects seeds).
pub fn by_pipeline(root: &Path, allowed: &[Option<String>]) -> StoreResult<ScanOutcome> {
    let mut outcome = scan(root)?;
    outcome
        .folders
        .retain(|folder| allowed.contains(&folder.article.last_pipeline));
    Ok(outcome)
}

/// Status counts over every article under `root`.
pub fn plan_summary(root: &Path, graph: &TransitionGraph) -> StoreResult<PlanSummary> {
    let outcome = scan(root)?;

    let mut summary = PlanSummary {
        total: outcome.folders.len(),
        errors: outcome.errors.len(),
        ..PlanSummary::default()
    };
    for folder in &outcome.folders {
        match folder.article.plan_status(graph) {
            PlanStatus::Seed => summary.seed += 1,
            PlanStatus::InProgress => summary.in_progress += 1,
            PlanStatus::Ready => summary.ready += 1,
            PlanStatus::Published => summary.published += 1,
        }
    }
    Ok(summary)
}
