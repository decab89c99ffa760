pub mod apply;
pub mod init;
pub mod normalize;
pub mod render;
pub mod stats;

pub use apply::{apply, ApplyArgs};
pub use init::{init, InitArgs};
pub use normalize::{normalize, NormalizeArgs};
pub use render::{render, RenderArgs};
pub use stats::{stats, StatsArgs};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use zebra_editor::{Editor, EditorConfig};

/// Resolve `path` against the working directory
pub(crate) fn resolve(cwd: &str, path: &str) -> PathBuf {
    PathBuf::from(cwd).join(path)
}

/// Load a serialized article from disk
pub(crate) fn open_document(path: &Path, config: &EditorConfig) -> Result<Editor> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let editor = Editor::from_json(config.clone(), &source)
        .with_context(|| format!("Cannot load article from {}", path.display()))?;
    Ok(editor)
}

/// Write to `out` (relative to `cwd`) or print to stdout
pub(crate) fn emit(cwd: &str, out: Option<&str>, output: &str) -> Result<String> {
    match out {
        Some(out) => {
            let path = resolve(cwd, out);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, output)?;
            Ok(path.display().to_string())
        }
        None => {
            println!("{}", output);
            Ok("stdout".to_string())
        }
    }
}
