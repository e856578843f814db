//! Pre-mutation snapshot archival under `_history/`.
//!
//! Every content-changing mutation that is not the initial creation archives
//! the document as it stood immediately before the mutation. Archives are
//! append-only; the live folder never reads from them except for listing.

use crate::store::{StoreResult, INDEX_FILE};
use chrono::{DateTime, NaiveDateTime, Utc};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Reserved history directory inside an entity folder
pub const HISTORY_DIR: &str = "_history";

/// Folder-name timestamp format: colons replaced, milliseconds stripped
const FOLDER_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%SZ";

/// Optional extra files captured alongside a snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveExtras<'a> {
    /// Prompt that produced the paired mutation
    pub prompt: Option<&'a str>,
    /// Raw model response behind the paired mutation
    pub response: Option<&'a str>,
}

/// One archived snapshot, as listed for display
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Snapshot time, re-derived to the colon form (ISO-8601 UTC)
    pub timestamp: String,
    /// Action label the snapshot was archived under
    pub action: String,
    pub path: PathBuf,
}

/// Filesystem-safe timestamp for a history folder name
pub fn folder_timestamp(at: DateTime<Utc>) -> String {
    at.format(FOLDER_TIMESTAMP_FORMAT).to_string()
}

/// Re-derive the colon form from a folder-name timestamp
pub fn display_timestamp(folder_form: &str) -> String {
    match folder_form.split_once('T') {
        Some((date, time)) => format!("{}T{}", date, time.replace('-', ":")),
        None => folder_form.to_string(),
    }
}

/// Archive the pre-mutation state of an entity.
///
/// `raw_document` is the document JSON exactly as it stood before the
/// mutation; it is written verbatim so the snapshot is byte-faithful. Must
/// complete before the paired mutation writes the new document.
pub fn archive_version(
    dir: &Path,
    content: &str,
    raw_document: &str,
    action: &str,
    extras: ArchiveExtras<'_>,
) -> StoreResult<PathBuf> {
    let folder = dir
        .join(HISTORY_DIR)
        .join(format!("{}-{}", folder_timestamp(Utc::now()), action));
    fs::create_dir_all(&folder)?;

    fs::write(folder.join(INDEX_FILE), raw_document)?;
    fs::write(folder.join("content.md"), content)?;
    if let Some(prompt) = extras.prompt {
        fs::write(folder.join("prompt.md"), prompt)?;
    }
    if let Some(response) = extras.response {
        fs::write(folder.join("response.md"), response)?;
    }

    Ok(folder)
}

/// List archived snapshots, oldest first. Malformed folder names are skipped
/// with a warning.
pub fn list_history(dir: &Path) -> StoreResult<Vec<HistoryEntry>> {
    let history_dir = dir.join(HISTORY_DIR);
    if !history_dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(&history_dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();

        match parse_folder_name(&name) {
            Some((timestamp, action)) => entries.push(HistoryEntry {
                timestamp: display_timestamp(timestamp),
                action: action.to_string(),
                path: entry.path(),
            }),
            None => {
                eprintln!(
                    "{}",
                    format!("⚠️  Skipping malformed history folder: {}", name).yellow()
                );
            }
        }
    }

    // Folder-name order is chronological order
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

/// Split `{timestamp}-{action}`, validating the timestamp part
fn parse_folder_name(name: &str) -> Option<(&str, &str)> {
    // "%Y-%m-%dT%H-%M-%SZ" is fixed-width
    let timestamp_len = "0000-00-00T00-00-00Z".len();
    if name.len() < timestamp_len + 2 || !name.is_char_boundary(timestamp_len) {
        return None;
    }
    let (timestamp, rest) = name.split_at(timestamp_len);
    NaiveDateTime::parse_from_str(timestamp, FOLDER_TIMESTAMP_FORMAT).ok()?;

    rest.strip_prefix('-').map(|action| (timestamp, action))
}
