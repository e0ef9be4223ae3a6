//! Document record and the block data the editor hands back on save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const UNTITLED: &str = "Untitled document";
pub const MAX_TITLE_CHARS: usize = 100;

/// Block editor output, as produced by `save()` and accepted by `render()`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OutputData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl OutputData {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            time: None,
            blocks,
            version: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// One block. `data` stays opaque apart from the handful of fields the
/// exporters read.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl Block {
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            data,
        }
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn text(&self) -> &str {
        self.str_field("text").unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub document_id: String,
    pub title: String,
    pub content: OutputData,
    pub last_modified: DateTime<Utc>,
    pub owner: String,
    #[serde(default)]
    pub collaborators: Vec<String>,
}

impl Default for DocumentRecord {
    fn default() -> Self {
        Self {
            document_id: "new".to_string(),
            title: UNTITLED.to_string(),
            content: OutputData::default(),
            last_modified: Utc::now(),
            owner: "current-user".to_string(),
            collaborators: Vec::new(),
        }
    }
}

/// Status line shown next to the title.
pub fn format_last_saved(last_saved: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(saved) = last_saved else {
        return "Not saved".to_string();
    };
    let minutes = (now - saved).num_minutes();
    if minutes < 1 {
        return "Saved just now".to_string();
    }
    if minutes < 60 {
        return format!("Saved {minutes} min ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("Saved {hours} h ago");
    }
    saved.format("%Y-%m-%d").to_string()
}

/// Avatar initials for the first `limit` collaborators plus the overflow count.
pub fn avatar_initials(collaborators: &[String], limit: usize) -> (Vec<String>, usize) {
    let shown = collaborators
        .iter()
        .take(limit)
        .map(|name| name.chars().next().map(String::from).unwrap_or_default())
        .collect();
    (shown, collaborators.len().saturating_sub(limit))
}

/// Committed form of an edited title: trimmed, capped, never empty.
pub fn normalize_title(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return UNTITLED.to_string();
    }
    trimmed.chars().take(MAX_TITLE_CHARS).collect()
}
