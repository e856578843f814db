//! End-to-end lifecycle test: create, write, update, lock conflict,
//! transition with archival, verify and repair.

use contentd::models::{Article, PipelineDefinition};
use contentd::pipeline::TransitionGraph;
use contentd::store::articles::{self, TransitionUpdate};
use contentd::store::{history, DocumentStore, StoreError, LOCK_FILE};
use contentd::validator::ConsistencyChecker;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

fn definitions() -> Vec<PipelineDefinition> {
    vec![
        PipelineDefinition::new("generate", None).with_actions(&["write_content", "write_faq"]),
        PipelineDefinition::new("enhance_seo", Some("generate")).with_actions(&["rewrite_title"]),
    ]
}

fn json_map(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

#[test]
fn test_full_article_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let defs = definitions();
    let graph = TransitionGraph::from_definitions(&defs);

    // Create: first write of a brand-new document lands at version 1
    let folder = articles::create(root, "guides/rust", Article::new("Rust", "intro"), None).unwrap();
    assert_eq!(folder.article.version, 1);
    assert!(folder.article.last_pipeline.is_none());

    // Metadata update bumps the version by exactly one and leaves the rest
    let updated = articles::update_meta(&folder.path, json_map(json!({"title": "x"}))).unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.title, "x");
    assert_eq!(updated.description, "intro");

    // A concurrent writer holding the lock fails immediately
    std::fs::write(folder.path.join(LOCK_FILE), "held\n").unwrap();
    let err = articles::update_meta(&folder.path, json_map(json!({"title": "y"}))).unwrap_err();
    assert!(matches!(err, StoreError::WriteConflict { .. }));
    let unchanged = articles::read_meta(&folder.path).unwrap().unwrap();
    assert_eq!(unchanged.title, "x");
    assert_eq!(unchanged.version, 2);
    std::fs::remove_file(folder.path.join(LOCK_FILE)).unwrap();

    // First pipeline run: seed -> generate is a valid edge
    let saved = articles::save_with_pipeline_transition(
        &folder.path,
        TransitionUpdate {
            content: "# Rust, v1",
            pipeline: Some("generate"),
            archive_label: "generate",
            ..TransitionUpdate::default()
        },
        &graph,
    )
    .unwrap();
    assert_eq!(saved.last_pipeline.as_deref(), Some("generate"));
    assert_eq!(saved.version, 3);
    // No prior content, so nothing was archived
    assert!(history::list_history(&folder.path).unwrap().is_empty());

    articles::add_applied_action(&folder.path, "write_content").unwrap();
    articles::add_applied_action(&folder.path, "write_faq").unwrap();
    articles::add_cost_entry(&folder.path, "write_content", 0.25, None).unwrap();

    // Second pipeline run archives the pre-mutation content
    let saved = articles::save_with_pipeline_transition(
        &folder.path,
        TransitionUpdate {
            content: "# Rust, v2",
            pipeline: Some("enhance_seo"),
            archive_label: "enhance_seo",
            prompt: Some("improve the title"),
            ..TransitionUpdate::default()
        },
        &graph,
    )
    .unwrap();
    assert_eq!(saved.last_pipeline.as_deref(), Some("enhance_seo"));

    let entries = history::list_history(&folder.path).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "enhance_seo");
    assert_eq!(
        std::fs::read_to_string(entries[0].path.join("content.md")).unwrap(),
        "# Rust, v1"
    );
    assert_eq!(
        std::fs::read_to_string(entries[0].path.join("prompt.md")).unwrap(),
        "improve the title"
    );
    // Folder name is filesystem safe; listing re-derives the colon form
    assert!(!entries[0]
        .path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .contains(':'));
    assert!(entries[0].timestamp.contains(':'));

    // enhance_seo never recorded its action: verify flags it, repair reverts
    let checker = ConsistencyChecker::new(&defs, &graph);
    let report = checker.check(root).unwrap();
    assert_eq!(report.mismatches.len(), 1);
    assert_eq!(report.mismatches[0].missing, vec!["rewrite_title"]);

    let outcome = checker.repair(root).unwrap();
    assert_eq!(outcome.repaired.len(), 1);
    let repaired = articles::read_meta(&folder.path).unwrap().unwrap();
    assert_eq!(repaired.last_pipeline.as_deref(), Some("generate"));
    // applied_actions untouched by repair
    assert_eq!(repaired.applied_actions, vec!["write_content", "write_faq"]);

    // The repaired state is consistent again
    assert!(checker.check(root).unwrap().is_clean());
}

#[test]
fn test_sidecars_mirror_but_never_override() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    let folder = articles::create(
        root,
        "a",
        Article::new("A", "d"),
        Some("authoritative text"),
    )
    .unwrap();

    let sidecar = folder.path.join("content.md");
    assert_eq!(
        std::fs::read_to_string(&sidecar).unwrap(),
        "authoritative text"
    );

    // Hand-editing the mirror does not change what the store reads
    std::fs::write(&sidecar, "hand edit").unwrap();
    assert_eq!(
        articles::read_content(&folder.path).unwrap().as_deref(),
        Some("authoritative text")
    );

    // The next write resyncs the mirror from the document
    articles::update_meta(&folder.path, Map::new()).unwrap();
    assert_eq!(
        std::fs::read_to_string(&sidecar).unwrap(),
        "authoritative text"
    );
}

#[test]
fn test_scan_treats_entity_folders_as_leaves() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    let outer = articles::create(root, "outer", Article::new("Outer", "d"), None).unwrap();
    let nested = outer.path.join("assets");
    std::fs::create_dir_all(&nested).unwrap();
    let inner_store = DocumentStore::<Article>::new(&nested);
    inner_store.write(Article::new("Inner", "d")).unwrap();

    let outcome = articles::scan(root).unwrap();
    assert_eq!(outcome.folders.len(), 1);
    assert_eq!(outcome.folders[0].article.title, "Outer");
}
