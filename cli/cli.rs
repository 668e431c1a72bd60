mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use ctxl_core::{self as core, AppError, Config, FilterRuleSet, PresetStore};
use log;
use std::path::{Path, PathBuf};
use std::process;

use cli_args::{Cli, Commands, ProjectConfigOpts, SelectionOpts};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let core_err = e.downcast_ref::<AppError>();
            let exit_code = match core_err {
                Some(AppError::Config(_)) => 1,
                Some(AppError::TomlParse(_)) => 1,
                Some(AppError::TomlSerialize(_)) => 1,
                Some(AppError::PresetParse { .. }) => 1,
                Some(AppError::Io(_)) => 2,
                Some(AppError::FileRead { .. }) => 2,
                Some(AppError::FileWrite { .. }) => 2,
                Some(AppError::DirCreation { .. }) => 2,
                Some(AppError::WalkDir(_)) => 2,
                Some(AppError::Pattern(_)) => 2,
                Some(AppError::InvalidArgument(_)) => 5,
                Some(AppError::JsonSerialize(_)) => 6,
                Some(AppError::YamlError(_)) => 6,
                Some(AppError::XmlSerialize(_)) => 6,
                Some(_) => 1,
                None => 1,
            };

            // Config and argument problems are always shown, even with -q.
            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(command) => match command {
            Commands::Generate(args) => {
                log::debug!("Executing 'generate' command...");
                commands::generate::handle_generate_command(args, quiet)?;
            }
            Commands::Tree(args) => {
                log::debug!("Executing 'tree' command...");
                commands::tree::handle_tree_command(args)?;
            }
            Commands::Detect(args) => {
                log::debug!("Executing 'detect' command...");
                commands::detect::handle_detect_command(args)?;
            }
            Commands::Presets(args) => {
                log::debug!("Executing 'presets' command...");
                commands::presets::handle_presets_command(args, quiet)?;
            }
            Commands::Debug(args) => {
                log::debug!("Executing 'debug' command...");
                commands::debug::handle_debug_command(args)?;
            }
            Commands::Completion(args) => {
                log::debug!("Executing 'completion' command...");
                commands::completion::handle_completion_command(&args)?;
            }
        },
    }
    Ok(())
}

/// Paths given on the command line are taken relative to the working
/// directory, not the project root.
fn absolute_cli_path(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("Failed to resolve path {}", path.display()))
}

fn merge_config_with_cli_overrides(mut config: Config, selection: &SelectionOpts) -> Result<Config> {
    log::trace!("Applying selection CLI overrides to config...");

    if !selection.presets.is_empty() {
        config.general.presets = selection
            .presets
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
    }
    if let Some(filter) = &selection.filter {
        config.filters.filter = filter.clone();
    }
    if selection.include_dotfiles {
        config.general.include_dotfiles = true;
    }
    if let Some(ignore_file) = &selection.ignore_file {
        config.general.ignore_file = absolute_cli_path(ignore_file)?;
    }
    if selection.no_auto_detect {
        config.general.auto_detect = false;
    }

    log::trace!("Config after CLI overrides: {:?}", config);
    Ok(config)
}

pub fn load_config_for_command(
    project_root: &Path,
    project_opts: &ProjectConfigOpts,
) -> Result<Config> {
    let config_path = Config::resolve_config_path(
        project_root,
        project_opts.config_file.as_deref(),
        project_opts.disable_config_file,
    )
    .context("Failed to resolve configuration path")?;

    let mut config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(preset_file) = &project_opts.preset_file {
        config.general.preset_file = absolute_cli_path(preset_file)?;
    }
    Ok(config)
}

pub fn load_preset_store(project_root: &Path, config: &Config) -> Result<PresetStore> {
    let preset_file = config.effective_preset_file(project_root);
    PresetStore::load(&preset_file)
        .with_context(|| format!("Failed to load presets from {}", preset_file.display()))
}

/// Everything a scanning command needs once config, presets and CLI flags
/// have been reconciled.
#[derive(Debug)]
pub struct ScanSetup {
    pub project_root: PathBuf,
    pub config: Config,
    pub applied_presets: Vec<String>,
    pub auto_detected: bool,
    pub rules: FilterRuleSet,
    pub ignore_file: PathBuf,
    pub include_dotfiles: bool,
}

pub fn prepare_scan(selection: &SelectionOpts) -> Result<ScanSetup> {
    let project_root =
        Config::determine_project_root(selection.project_config.project_root.as_deref())
            .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(&project_root, &selection.project_config)?;
    let config = merge_config_with_cli_overrides(config, selection)?;
    let store = load_preset_store(&project_root, &config)?;

    let mut auto_detected = false;
    let applied_presets: Vec<String> = if !config.general.presets.is_empty() {
        config.general.presets.clone()
    } else if config.general.auto_detect {
        auto_detected = true;
        core::detect_project_types(&project_root, &store)
            .context("Failed to detect project types")?
            .into_iter()
            .collect()
    } else {
        Vec::new()
    };
    log::info!("Applying presets: {:?}", applied_presets);

    let include_dotfiles = config.general.include_dotfiles;
    let mut rules = core::combine(&store, &applied_presets, &config.effective_filter());
    if include_dotfiles {
        rules = rules.allow_hidden();
    }

    Ok(ScanSetup {
        ignore_file: config.effective_ignore_file(&project_root),
        project_root,
        config,
        applied_presets,
        auto_detected,
        rules,
        include_dotfiles,
    })
}
