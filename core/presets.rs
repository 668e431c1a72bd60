use crate::error::{AppError, Result};
use indexmap::IndexMap;
use log;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub type PresetMap = IndexMap<String, Preset>;

/// Filter rules describing one project type. `prefixes` is only present for
/// presets that recognise files by name prefix (e.g. `Dockerfile.dev`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preset {
    #[serde(default)]
    pub suffixes: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefixes: Option<Vec<String>>,
}

static BUILTIN_PRESETS: Lazy<PresetMap> = Lazy::new(|| {
    let yaml_content = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../data/presets.yaml"));
    serde_yml::from_str(yaml_content).expect("Failed to parse embedded data/presets.yaml")
});

pub fn builtin_presets() -> &'static PresetMap {
    &BUILTIN_PRESETS
}

/// Reads the user preset sidecar. A missing file yields an empty map; a file
/// that exists but does not parse is an error.
pub fn load_user_presets(preset_file: &Path) -> Result<PresetMap> {
    let content = match fs::read_to_string(preset_file) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("No user preset file at {}", preset_file.display());
            return Ok(PresetMap::new());
        }
        Err(e) => {
            return Err(AppError::FileRead {
                path: preset_file.to_path_buf(),
                source: e,
            });
        }
    };

    if content.trim().is_empty() {
        log::debug!("User preset file {} is empty", preset_file.display());
        return Ok(PresetMap::new());
    }

    let presets: PresetMap =
        serde_yml::from_str(&content).map_err(|e| AppError::PresetParse {
            path: preset_file.to_path_buf(),
            source: e,
        })?;
    log::info!(
        "Loaded {} user presets from {}",
        presets.len(),
        preset_file.display()
    );
    Ok(presets)
}

pub fn persist_presets(presets: &PresetMap, preset_file: &Path) -> Result<()> {
    if let Some(parent) = preset_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AppError::DirCreation {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let yaml = serde_yml::to_string(presets)?;
    fs::write(preset_file, yaml).map_err(|e| AppError::FileWrite {
        path: preset_file.to_path_buf(),
        source: e,
    })?;
    log::info!(
        "Saved {} presets to {}",
        presets.len(),
        preset_file.display()
    );
    Ok(())
}

pub fn persist_builtins(preset_file: &Path) -> Result<()> {
    persist_presets(builtin_presets(), preset_file)
}

/// The effective preset table for one invocation: built-ins overlaid with
/// user entries. A user entry replaces the built-in of the same name whole.
#[derive(Debug, Clone)]
pub struct PresetStore {
    presets: PresetMap,
}

impl PresetStore {
    pub fn builtin() -> Self {
        Self {
            presets: builtin_presets().clone(),
        }
    }

    pub fn with_overrides(overrides: PresetMap) -> Self {
        let mut presets = builtin_presets().clone();
        for (name, preset) in overrides {
            if presets.contains_key(&name) {
                log::debug!("User preset '{}' replaces the built-in definition", name);
            } else {
                log::debug!("Adding user preset '{}'", name);
            }
            presets.insert(name, preset);
        }
        Self { presets }
    }

    pub fn load(preset_file: &Path) -> Result<Self> {
        let overrides = load_user_presets(preset_file)?;
        Ok(Self::with_overrides(overrides))
    }

    pub fn effective_presets(&self) -> &PresetMap {
        &self.presets
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yml::to_string(&self.presets)?)
    }
}
