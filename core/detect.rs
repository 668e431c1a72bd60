use crate::error::Result;
use crate::presets::PresetStore;
use log;
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// Names of the presets that match `file_name`: by prefix (case
/// insensitive), by extension, or by an exact entry in the include list.
/// Every matching preset is reported, so a user preset sharing an extension
/// with a built-in is detected alongside it.
pub fn matching_presets<'a>(store: &'a PresetStore, file_name: &str) -> Vec<&'a str> {
    let lower = file_name.to_lowercase();
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e));

    let mut matches = Vec::new();
    for (name, preset) in store.effective_presets() {
        let by_prefix = preset.prefixes.as_ref().is_some_and(|prefixes| {
            prefixes
                .iter()
                .any(|prefix| lower.starts_with(&prefix.to_lowercase()))
        });
        let by_suffix = extension
            .as_ref()
            .is_some_and(|ext| preset.suffixes.iter().any(|s| s == ext));
        let by_name = preset.include.iter().any(|p| p == file_name);

        if by_prefix || by_suffix || by_name {
            matches.push(name.as_str());
        }
    }
    matches
}

pub fn detect_project_types(project_root: &Path, store: &PresetStore) -> Result<BTreeSet<String>> {
    let mut detected = BTreeSet::new();
    log::debug!("Detecting project types in: {}", project_root.display());

    let walker = WalkDir::new(project_root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != ".git");

    for entry_result in walker {
        match entry_result {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                let Some(file_name) = entry.file_name().to_str() else {
                    continue;
                };
                for name in matching_presets(store, file_name) {
                    if detected.insert(name.to_string()) {
                        log::trace!("Detected project type '{}' from {}", name, file_name);
                    }
                }
            }
            Err(e) => {
                if e.depth() == 0 {
                    return Err(e.into());
                }
                log::warn!(
                    "Error accessing path during project type detection: {} (at {})",
                    e,
                    e.path()
                        .map_or_else(|| "unknown path".into(), |p| p.display().to_string())
                );
            }
        }
    }
    log::debug!("Detected project types: {:?}", detected);
    Ok(detected)
}
