//! Generic folder-backed document serializer.
//!
//! A [`DocumentStore`] binds a record type `T` to one folder. The folder's
//! `index.json` is the sole source of truth for every field; long-text fields
//! are additionally mirrored to `{field}.md` / `{field}.json` sidecar files
//! for human inspection, but those mirrors are never read back.

use crate::store::lock::WriteLock;
use crate::store::{StoreError, StoreResult};
use chrono::Utc;
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt::Display;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Base document file, always authoritative
pub const INDEX_FILE: &str = "index.json";

/// Long-text fields mirrored to `{field}.md` on every write
pub const SERIALIZED_FIELDS: &[&str] = &["content", "faq", "content_jsonld", "faq_jsonld"];

/// Sidecar output format for [`DocumentStore::create_override`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideFormat {
    /// Verbatim text in a `.md` file (string fields only)
    Markdown,
    /// Pretty-printed JSON in a `.json` file
    Json,
}

impl OverrideFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OverrideFormat::Markdown => "md",
            OverrideFormat::Json => "json",
        }
    }
}

/// Generic store for one typed document in one folder
pub struct DocumentStore<T> {
    dir: PathBuf,
    _record: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> DocumentStore<T> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            _record: PhantomData,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// True iff the base document file is present
    pub fn exists(&self) -> bool {
        self.index_path().exists()
    }

    /// Read the base document. Sidecar files are never merged in.
    pub fn read(&self) -> StoreResult<Option<T>> {
        match self.read_value()? {
            Some(doc) => {
                let record = serde_json::from_value(Value::Object(doc)).map_err(|source| {
                    StoreError::Format {
                        path: self.index_path(),
                        source,
                    }
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Read the base document as a raw field map
    pub fn read_value(&self) -> StoreResult<Option<Map<String, Value>>> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let doc =
            serde_json::from_str(&content).map_err(|source| StoreError::Format { path, source })?;
        Ok(Some(doc))
    }

    /// Write the document, stamping `version` and `updated_at`, mirroring
    /// sidecar files, and holding the folder's write lock throughout.
    pub fn write(&self, data: T) -> StoreResult<T> {
        let doc = match serde_json::to_value(&data)? {
            Value::Object(map) => map,
            _ => {
                return Err(StoreError::Json(serde_json::Error::custom(
                    "document must serialize to a JSON object",
                )))
            }
        };

        let written = self.write_value(doc)?;
        serde_json::from_value(Value::Object(written)).map_err(StoreError::Json)
    }

    /// Field-map variant of [`write`](Self::write); the merge primitive the
    /// entity store builds on.
    pub fn write_value(&self, mut doc: Map<String, Value>) -> StoreResult<Map<String, Value>> {
        // A declared version always moves forward by exactly one; anything
        // non-numeric counts as zero. An updated_at field is stamped with the
        // write time. Neither can be opted out of.
        if let Some(version) = doc.get("version") {
            let current = version.as_u64().unwrap_or(0);
            doc.insert("version".to_string(), Value::from(current + 1));
        }
        if doc.contains_key("updated_at") {
            doc.insert(
                "updated_at".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }

        let _lock = WriteLock::acquire(&self.dir)?;

        // Phase 1: the authoritative write. Failure here fails the operation.
        let json = serde_json::to_string_pretty(&doc)?;
        fs::write(self.index_path(), json + "\n")?;

        // Phase 2: best-effort sidecar mirroring. A cosmetic failure never
        // blocks the write that already succeeded.
        self.sync_serialized_fields(&doc);
        self.sync_existing_sidecars(&doc);

        Ok(doc)
    }

    /// Shallow-merge `partial` over the current document (empty if absent)
    /// and write the result.
    pub fn update(&self, partial: Map<String, Value>) -> StoreResult<T> {
        let mut doc = self.read_value()?.unwrap_or_default();
        for (key, value) in partial {
            doc.insert(key, value);
        }

        let written = self.write_value(doc)?;
        serde_json::from_value(Value::Object(written)).map_err(StoreError::Json)
    }

    /// Export one field's current value into a new sidecar file.
    ///
    /// Returns `None` if the field is absent from the document. Requesting
    /// markdown for a non-string field is an error, as is targeting a
    /// `_`-prefixed field.
    pub fn create_override(
        &self,
        field: &str,
        format: OverrideFormat,
    ) -> StoreResult<Option<PathBuf>> {
        if field.starts_with('_') {
            return Err(StoreError::ReservedField {
                field: field.to_string(),
            });
        }

        let doc = self.read_value()?.ok_or_else(|| StoreError::NotFound {
            path: self.index_path(),
        })?;

        let Some(value) = doc.get(field) else {
            return Ok(None);
        };

        let path = self.dir.join(format!("{}.{}", field, format.extension()));
        match format {
            OverrideFormat::Markdown => {
                let text = value.as_str().ok_or_else(|| StoreError::NotAString {
                    field: field.to_string(),
                })?;
                fs::write(&path, text)?;
            }
            OverrideFormat::Json => {
                fs::write(&path, serde_json::to_string_pretty(value)? + "\n")?;
            }
        }

        Ok(Some(path))
    }

    /// Delete an existing sidecar file for a field, if present.
    pub fn remove_override(&self, field: &str) -> StoreResult<bool> {
        for extension in ["md", "json"] {
            let path = self.dir.join(format!("{}.{}", field, extension));
            if path.exists() {
                fs::remove_file(&path)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Mirror non-empty long-text fields to their `.md` sidecars.
    fn sync_serialized_fields(&self, doc: &Map<String, Value>) {
        for field in SERIALIZED_FIELDS {
            if let Some(Value::String(text)) = doc.get(*field) {
                if text.is_empty() {
                    continue;
                }
                let path = self.dir.join(format!("{}.md", field));
                if let Err(err) = fs::write(&path, text) {
                    self.warn_sidecar(field, &err);
                }
            }
        }
    }

    /// Re-serialize pre-existing sidecar files whose field is still present.
    ///
    /// A sidecar whose field was removed from the document is left untouched;
    /// it is treated as intentional user content.
    fn sync_existing_sidecars(&self, doc: &Map<String, Value>) {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                self.warn_sidecar("*", &err);
                return;
            }
        };

        let mut synced: HashSet<String> = HashSet::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_sidecar = path
                .extension()
                .map_or(false, |ext| ext == "md" || ext == "json");
            if !is_sidecar {
                continue;
            }

            let Some(field) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            // Never a sidecar target: the base document itself, reserved
            // `_`-prefixed names, hidden files, and the fixed mirror set
            // already handled above.
            if field == "index"
                || field.starts_with('_')
                || field.starts_with('.')
                || SERIALIZED_FIELDS.contains(&field)
            {
                continue;
            }
            if !synced.insert(field.to_string()) {
                continue;
            }

            let Some(value) = doc.get(field) else {
                continue;
            };
            let result = match value {
                Value::String(text) => fs::write(self.dir.join(format!("{}.md", field)), text),
                other => match serde_json::to_string_pretty(other) {
                    Ok(json) => fs::write(self.dir.join(format!("{}.json", field)), json + "\n"),
                    Err(err) => {
                        self.warn_sidecar(field, &err);
                        continue;
                    }
                },
            };
            if let Err(err) = result {
                self.warn_sidecar(field, &err);
            }
        }
    }

    fn warn_sidecar(&self, field: &str, err: &dyn Display) {
        eprintln!(
            "{}",
            format!(
                "⚠️  Failed to sync sidecar '{}' in {}: {}",
                field,
                self.dir.display(),
                err
            )
            .yellow()
        );
    }
}
