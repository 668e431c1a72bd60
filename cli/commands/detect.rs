use crate::cli_args::DetectArgs;
use crate::{load_config_for_command, load_preset_store};
use anyhow::{Context, Result};
use ctxl_core::{self as core, Config};
use log;

pub fn handle_detect_command(args: DetectArgs) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_deref())
        .context("Failed to determine project root")?;
    let config = load_config_for_command(&project_root, &args.project_config)?;
    let store = load_preset_store(&project_root, &config)?;

    let detected = core::detect_project_types(&project_root, &store)
        .context("Failed to detect project types")?;
    if detected.is_empty() {
        log::warn!("No known project types detected in {}", project_root.display());
    }
    for name in detected {
        println!("{}", name);
    }
    Ok(())
}
