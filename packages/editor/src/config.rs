use crate::errors::EditorResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Seed for component ids
    #[serde(default = "default_document_name")]
    pub document_name: String,

    /// Undo levels kept (0 = unlimited)
    #[serde(default = "default_max_undo_levels")]
    pub max_undo_levels: usize,

    /// Shown by a view when the article is empty
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_document_name() -> String {
    "untitled".to_string()
}

fn default_max_undo_levels() -> usize {
    100
}

fn default_placeholder() -> String {
    "Start your story ...".to_string()
}

impl EditorConfig {
    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> EditorResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            document_name: default_document_name(),
            max_undo_levels: default_max_undo_levels(),
            placeholder: default_placeholder(),
        }
    }
}
