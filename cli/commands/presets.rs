use crate::cli_args::{PresetsAction, PresetsArgs};
use crate::load_config_for_command;
use crate::output::{print_presets_table, write_to_stdout};
use anyhow::{Context, Result};
use colored::*;
use ctxl_core::presets::{self, PresetStore};
use ctxl_core::{AppError, Config};

pub fn handle_presets_command(args: PresetsArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_deref())
        .context("Failed to determine project root")?;
    let config = load_config_for_command(&project_root, &args.project_config)?;
    let preset_file = config.effective_preset_file(&project_root);

    match args.action {
        PresetsAction::Show => {
            let store = PresetStore::load(&preset_file)
                .with_context(|| format!("Failed to load presets from {}", preset_file.display()))?;
            write_to_stdout(&store.to_yaml()?)?;
        }
        PresetsAction::List => {
            let user = presets::load_user_presets(&preset_file)
                .with_context(|| format!("Failed to load presets from {}", preset_file.display()))?;
            let store = PresetStore::with_overrides(user.clone());
            print_presets_table(store.effective_presets(), &user);
        }
        PresetsAction::Save { force } => {
            if preset_file.exists() && !force {
                anyhow::bail!(AppError::InvalidArgument(format!(
                    "Preset file '{}' already exists. Use --force to overwrite it.",
                    preset_file.display()
                )));
            }
            presets::persist_builtins(&preset_file).context("Failed to save presets")?;
            if !quiet {
                println!(
                    "{} Built-in presets saved to: {}",
                    "✅".green(),
                    preset_file.display().to_string().blue()
                );
            }
        }
    }
    Ok(())
}
