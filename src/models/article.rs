use crate::models::pipeline::last_pipeline_for_legacy_status;
use crate::pipeline::TransitionGraph;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Plan-level classification of an article, derived from its pipeline state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PlanStatus {
    /// Never processed by any pipeline (`last_pipeline` is null)
    Seed,
    /// Mid-pipeline, not yet publishable
    InProgress,
    /// Publishable per the transition graph, not yet published
    Ready,
    /// `published_at` is set
    Published,
}

impl PlanStatus {
    pub fn name(&self) -> &'static str {
        match self {
            PlanStatus::Seed => "Seed",
            PlanStatus::InProgress => "InProgress",
            PlanStatus::Ready => "Ready",
            PlanStatus::Published => "Published",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            PlanStatus::Seed => "🌱",
            PlanStatus::InProgress => "🔨",
            PlanStatus::Ready => "🚀",
            PlanStatus::Published => "✅",
        }
    }
}

/// One line of the append-only cost ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostEntry {
    /// When the spend happened (RFC 3339 UTC)
    pub timestamp: String,

    /// Action the spend is attributed to
    pub action: String,

    /// Cost in USD
    pub cost: f64,

    /// Optional provider stats (token counts, model name, ...)
    #[serde(flatten)]
    pub stats: Map<String, Value>,
}

impl CostEntry {
    pub fn new(action: impl Into<String>, cost: f64) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            action: action.into(),
            cost,
            stats: Map::new(),
        }
    }
}

/// A stored article document.
///
/// The struct covers the fields the engine itself cares about; anything else
/// found in `index.json` survives read/write round trips through the
/// flattened tail and participates in sidecar sync like a declared field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    /// Last pipeline that processed this article; `None` means "seed",
    /// never processed. Serialized as an explicit null.
    #[serde(default)]
    pub last_pipeline: Option<String>,

    /// Monotonically increasing, bumped by exactly one on every write
    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,

    /// Actions already performed, set semantics over an ordered list
    #[serde(default)]
    pub applied_actions: Vec<String>,

    /// Append-only spend ledger
    #[serde(default)]
    pub costs: Vec<CostEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faq: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_jsonld: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faq_jsonld: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_hero: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_og: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,

    /// Open-ended application fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Article {
    /// Create a seed article (no pipeline has run yet)
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            title: title.into(),
            description: description.into(),
            keywords: Vec::new(),
            last_pipeline: None,
            version: 0,
            created_at: now.clone(),
            updated_at: now,
            applied_actions: Vec::new(),
            costs: Vec::new(),
            content: None,
            faq: None,
            content_jsonld: None,
            faq_jsonld: None,
            image_hero: None,
            image_og: None,
            published_at: None,
            extra: Map::new(),
        }
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Effective graph state of this article.
    ///
    /// Documents from before the migration era may carry a deprecated
    /// `status` field instead of `last_pipeline`; those values go through
    /// the fixed translation table before reaching the graph.
    pub fn pipeline_state(&self) -> Option<&str> {
        if self.last_pipeline.is_some() {
            return self.last_pipeline.as_deref();
        }
        self.extra
            .get("status")
            .and_then(Value::as_str)
            .and_then(last_pipeline_for_legacy_status)
            .flatten()
    }

    /// Classify for the plan summary. Published wins over Ready, which wins
    /// over the pipeline-derived states.
    pub fn plan_status(&self, graph: &TransitionGraph) -> PlanStatus {
        if self.published_at.is_some() {
            return PlanStatus::Published;
        }
        let state = self.pipeline_state();
        if graph.is_publishable(state) {
            return PlanStatus::Ready;
        }
        match state {
            None => PlanStatus::Seed,
            Some(_) => PlanStatus::InProgress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pipeline::PipelineDefinition;
    use serde_json::json;

    fn graph() -> TransitionGraph {
        TransitionGraph::from_definitions(&[
            PipelineDefinition::new("generate", None),
            PipelineDefinition::new("enhance_seo", Some("generate")),
        ])
    }

    #[test]
    fn test_new_article_is_seed() {
        let article = Article::new("Title", "Desc");
        assert_eq!(article.version, 0);
        assert!(article.last_pipeline.is_none());
        assert_eq!(article.plan_status(&graph()), PlanStatus::Seed);
    }

    #[test]
    fn test_plan_status_precedence() {
        let mut article = Article::new("Title", "Desc");

        article.last_pipeline = Some("generate".to_string());
        assert_eq!(article.plan_status(&graph()), PlanStatus::InProgress);

        article.last_pipeline = Some("enhance_seo".to_string());
        assert_eq!(article.plan_status(&graph()), PlanStatus::Ready);

        article.published_at = Some("2026-01-01T00:00:00Z".to_string());
        assert_eq!(article.plan_status(&graph()), PlanStatus::Published);
    }

    #[test]
    fn test_legacy_status_feeds_the_graph_state() {
        let mut article = Article::new("Old", "pre-migration");
        article
            .extra
            .insert("status".to_string(), json!("generated"));

        assert_eq!(article.pipeline_state(), Some("generate"));
        assert_eq!(article.plan_status(&graph()), PlanStatus::InProgress);

        // A recorded last_pipeline always wins over the deprecated field
        article.last_pipeline = Some("enhance_seo".to_string());
        assert_eq!(article.pipeline_state(), Some("enhance_seo"));
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let raw = json!({
            "title": "a",
            "last_pipeline": null,
            "version": 3,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z",
            "tone_of_voice": "direct",
            "outline": {"sections": 4}
        });

        let article: Article = serde_json::from_value(raw).unwrap();
        assert_eq!(article.extra["tone_of_voice"], json!("direct"));

        let back = serde_json::to_value(&article).unwrap();
        assert_eq!(back["outline"], json!({"sections": 4}));
        // Seed state stays an explicit null
        assert!(back.as_object().unwrap().contains_key("last_pipeline"));
        assert_eq!(back["last_pipeline"], json!(null));
    }

    #[test]
    fn test_absent_long_text_fields_are_omitted() {
        let article = Article::new("a", "b");
        let value = serde_json::to_value(&article).unwrap();
        assert!(!value.as_object().unwrap().contains_key("content"));
        assert!(!value.as_object().unwrap().contains_key("published_at"));
    }

    #[test]
    fn test_cost_entry_flattens_stats() {
        let mut entry = CostEntry::new("write_content", 0.42);
        entry.stats.insert("model".to_string(), json!("gpt"));

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["cost"], json!(0.42));
        assert_eq!(value["model"], json!("gpt"));
    }
}
