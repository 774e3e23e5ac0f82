//! Declaration file discovery.

use std::path::Path;

use anyhow::{Context, Result};
use tsinterop_core::config::InputPath;
use walkdir::WalkDir;

const DECLARATION_SUFFIX: &str = ".d.ts";

/// Read every declaration module under the configured inputs.
///
/// Returns `(module path, source)` pairs. Module paths are relative to their
/// input root and use `/` separators; files are visited in name order so the
/// result is stable across runs.
pub fn collect_sources(inputs: &[InputPath], base_dir: &Path) -> Result<Vec<(String, String)>> {
    let mut sources = Vec::new();

    for input in inputs {
        let root = base_dir.join(&input.include);

        if root.is_file() {
            let path = match &input.module_path {
                Some(module_path) => module_path.clone(),
                None => root
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| input.include.clone()),
            };
            let content = std::fs::read_to_string(&root)
                .with_context(|| format!("Failed to read {}", root.display()))?;
            sources.push((path, content));
            continue;
        }

        if !root.exists() {
            tracing::warn!(path = %root.display(), "Input path does not exist");
            continue;
        }

        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| match entry.path().strip_prefix(&root) {
                Ok(relative) => !input.is_excluded(&relative.to_string_lossy()),
                Err(_) => true,
            });

        for entry in walker.filter_map(|e| e.ok()) {
            let is_declaration = entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_string_lossy()
                    .ends_with(DECLARATION_SUFFIX);
            if !is_declaration {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            let content = std::fs::read_to_string(entry.path())
                .with_context(|| format!("Failed to read {}", entry.path().display()))?;

            tracing::debug!(path = %relative, "Found declaration module");
            sources.push((relative, content));
        }
    }

    Ok(sources)
}
