//! Assistant knowledge base.
//!
//! Plain-text snippets (menu, prices, policies) the assistant prepends to
//! its system prompt. Loaded once at startup from a directory of `.txt`
//! files; a missing directory just means an empty knowledge base.

use std::path::Path;

/// Load every `.txt` file under `dir`, sorted by file name for a stable
/// prompt. Unreadable entries are skipped with a warning.
#[must_use]
pub fn load_knowledge(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), "no knowledge base loaded: {e}");
            return Vec::new();
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    paths.sort();

    let mut snippets = Vec::with_capacity(paths.len());
    for path in paths {
        match std::fs::read_to_string(&path) {
            Ok(contents) => snippets.push(contents),
            Err(e) => {
                tracing::warn!(file = %path.display(), "skipping unreadable knowledge file: {e}");
            }
        }
    }

    tracing::info!(count = snippets.len(), "knowledge base loaded");
    snippets
}
