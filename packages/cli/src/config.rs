use crate::html::HtmlOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use zebra_editor::EditorConfig;

pub const DEFAULT_CONFIG_NAME: &str = "zebra.config.json";

/// Zebra configuration file format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Settings handed to every opened editor
    #[serde(default)]
    pub editor: EditorConfig,

    /// HTML output options
    #[serde(default)]
    pub html: HtmlOptions,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "editor": { "documentName": "essay", "maxUndoLevels": 20 },
            "html": { "pretty": false }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.editor.document_name, "essay");
        assert_eq!(config.editor.max_undo_levels, 20);
        assert_eq!(config.editor.placeholder, "Start your story ...");
        assert!(!config.html.pretty);
        assert_eq!(config.html.indent, "  ");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor.document_name, "untitled");
        assert!(config.html.pretty);
        assert!(!config.html.full_document);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = Config::load("/nonexistent/zebra").unwrap();
        assert_eq!(config, Config::default());
    }
}
