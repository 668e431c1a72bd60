use crate::error::{AppError, Result};
use log;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_DIR: &str = ".ctxl";
pub const DEFAULT_CONFIG_FILENAME: &str = "ctxl.toml";
pub const DEFAULT_PRESET_FILE: &str = ".ctxl/presets.yaml";
pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default)]
    pub presets: Vec<String>,
    #[serde(default = "default_true")]
    pub auto_detect: bool,
    #[serde(default)]
    pub include_dotfiles: bool,
    #[serde(default = "default_ignore_file")]
    pub ignore_file: PathBuf,
    #[serde(default = "default_preset_file")]
    pub preset_file: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct FiltersConfig {
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub pretty: bool,
    #[serde(default)]
    pub task: String,
}

fn default_true() -> bool {
    true
}
fn default_format() -> String {
    "xml".to_string()
}
fn default_ignore_file() -> PathBuf {
    PathBuf::from(DEFAULT_IGNORE_FILE)
}
fn default_preset_file() -> PathBuf {
    PathBuf::from(DEFAULT_PRESET_FILE)
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            presets: Vec::new(),
            auto_detect: default_true(),
            include_dotfiles: false,
            ignore_file: default_ignore_file(),
            preset_file: default_preset_file(),
        }
    }
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            pretty: default_true(),
            task: String::new(),
        }
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}

fn resolve_against(project_root: &Path, path: &Path) -> PathBuf {
    let expanded = expand_tilde(path);
    if expanded.is_absolute() {
        expanded
    } else {
        project_root.join(expanded)
    }
}

impl Config {
    /// `--project-root`, then `$PROJECT_ROOT`, then the working directory.
    pub fn determine_project_root(cli_project_root: Option<&Path>) -> Result<PathBuf> {
        let candidate = match cli_project_root {
            Some(path) => expand_tilde(path),
            None => match env::var_os("PROJECT_ROOT").filter(|value| !value.is_empty()) {
                Some(value) => expand_tilde(Path::new(&value)),
                None => env::current_dir()?,
            },
        };

        let root = candidate.canonicalize().map_err(|e| {
            AppError::InvalidArgument(format!(
                "Project root '{}' cannot be resolved: {}",
                candidate.display(),
                e
            ))
        })?;
        if !root.is_dir() {
            return Err(AppError::InvalidArgument(format!(
                "Project root '{}' is not a directory",
                root.display()
            )));
        }
        log::debug!("Resolved project root: {}", root.display());
        Ok(root)
    }

    /// An explicit config file must exist. Otherwise `.ctxl/ctxl.toml` under
    /// the project root is used when present.
    pub fn resolve_config_path(
        project_root: &Path,
        explicit: Option<&Path>,
        disabled: bool,
    ) -> Result<Option<PathBuf>> {
        if disabled {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        if let Some(path) = explicit {
            let path = expand_tilde(path);
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Some(path));
        }

        let default_path = project_root
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILENAME);
        if default_path.is_file() {
            log::debug!("Using default config file: {}", default_path.display());
            Ok(Some(default_path))
        } else {
            log::debug!("No config file at {}", default_path.display());
            Ok(None)
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let content = fs::read_to_string(config_path).map_err(|source| AppError::FileRead {
            path: config_path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            AppError::TomlParse(format!("{}: {}", config_path.display(), e))
        })?;
        log::trace!("Loaded config: {:?}", config);
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn effective_ignore_file(&self, project_root: &Path) -> PathBuf {
        resolve_against(project_root, &self.general.ignore_file)
    }

    pub fn effective_preset_file(&self, project_root: &Path) -> PathBuf {
        resolve_against(project_root, &self.general.preset_file)
    }

    /// The ad-hoc filter string with the configured include/exclude lists
    /// folded in as extra tokens.
    pub fn effective_filter(&self) -> String {
        let mut tokens: Vec<String> = self
            .filters
            .filter
            .split_whitespace()
            .map(String::from)
            .collect();
        tokens.extend(self.filters.include.iter().cloned());
        tokens.extend(self.filters.exclude.iter().map(|p| format!("!{}", p)));
        tokens.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.general.auto_detect);
        assert_eq!(config.output.format, "xml");
        assert_eq!(config.general.ignore_file, PathBuf::from(".gitignore"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ctxl.toml");
        fs::write(&path, "[general]\npresetz = [\"rust\"]\n").unwrap();
        assert!(matches!(
            Config::load_from_path(&path),
            Err(AppError::TomlParse(_))
        ));
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("review.toml");
        fs::write(&path, "[output]\npretty = false\n").unwrap();

        let resolved = Config::resolve_config_path(dir.path(), Some(path.as_path()), false).unwrap();
        assert_eq!(resolved.as_deref(), Some(path.as_path()));
        assert!(!Config::load_from_path(&path).unwrap().output.pretty);

        let missing = dir.path().join("other.toml");
        assert!(matches!(
            Config::resolve_config_path(dir.path(), Some(missing.as_path()), false),
            Err(AppError::Config(_))
        ));
        assert_eq!(
            Config::resolve_config_path(dir.path(), Some(path.as_path()), true).unwrap(),
            None
        );
    }

    #[test]
    fn default_config_is_optional() {
        let dir = tempdir().unwrap();
        assert_eq!(Config::resolve_config_path(dir.path(), None, false).unwrap(), None);

        let config_dir = dir.path().join(DEFAULT_CONFIG_DIR);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(DEFAULT_CONFIG_FILENAME), "").unwrap();
        assert_eq!(
            Config::resolve_config_path(dir.path(), None, false).unwrap(),
            Some(config_dir.join(DEFAULT_CONFIG_FILENAME))
        );
    }

    #[test]
    fn project_root_must_be_an_existing_directory() {
        let dir = tempdir().unwrap();
        let root = Config::determine_project_root(Some(dir.path())).unwrap();
        assert_eq!(root, dir.path().canonicalize().unwrap());

        let file = dir.path().join("plain.txt");
        fs::write(&file, "").unwrap();
        assert!(matches!(
            Config::determine_project_root(Some(file.as_path())),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            Config::determine_project_root(Some(dir.path().join("absent").as_path())),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn filter_lists_fold_into_tokens() {
        let mut config = Config::default();
        config.filters.filter = "*.rs  !target".into();
        config.filters.include = vec!["*.toml".into()];
        config.filters.exclude = vec!["*.lock".into()];
        assert_eq!(config.effective_filter(), "*.rs !target *.toml !*.lock");
    }

    #[test]
    fn relative_paths_resolve_against_project_root() {
        let config = Config::default();
        let root = Path::new("/work/project");
        assert_eq!(config.effective_ignore_file(root), root.join(".gitignore"));
        assert_eq!(
            config.effective_preset_file(root),
            root.join(".ctxl").join("presets.yaml")
        );
    }
}
