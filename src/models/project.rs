use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored project document.
///
/// Projects share the folder layout and serializer with articles but carry no
/// pipeline state; they exist as grouping records for the site around them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            title: title.into(),
            description: description.into(),
            version: 0,
            created_at: now.clone(),
            updated_at: now,
            extra: Map::new(),
        }
    }
}
