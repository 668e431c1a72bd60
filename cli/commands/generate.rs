use crate::cli_args::GenerateArgs;
use crate::output;
use crate::prepare_scan;
use anyhow::{Context, Result};
use colored::Colorize;
use ctxl_core::{self as core, Config, output_formats};
use log;
use std::fs;

pub fn handle_generate_command(args: GenerateArgs, quiet: bool) -> Result<()> {
    let setup = prepare_scan(&args.selection)?;
    let task = resolve_task(&args, &setup.config)?;

    let format = args
        .format
        .clone()
        .unwrap_or_else(|| setup.config.output.format.clone());
    let pretty = setup.config.output.pretty && !args.compact;

    log::info!(
        "Starting context generation for: {}",
        setup.project_root.display()
    );
    let document = core::generate_context(
        &setup.project_root,
        &setup.rules,
        &setup.ignore_file,
        setup.include_dotfiles,
        &task,
    )
    .context("Failed to generate project context")?;

    let error_count = document.errors().count();
    if error_count > 0 && !quiet {
        eprintln!(
            "{} {} of {} entries could not be read and were recorded as errors.",
            "Warning:".yellow().bold(),
            error_count,
            document.project_context.files.len()
        );
    }

    let content = output_formats::serialize_document(&document, &format, pretty)
        .with_context(|| format!("Failed to serialize context as {}", format))?;
    output::print_or_save(&content, args.output.as_deref(), quiet)
}

/// `--task-file` wins over `--task`, which wins over the configured default.
fn resolve_task(args: &GenerateArgs, config: &Config) -> Result<String> {
    if let Some(path) = &args.task_file {
        log::debug!("Reading task from {}", path.display());
        return fs::read_to_string(path)
            .map_err(|e| core::AppError::FileRead {
                path: path.clone(),
                source: e,
            })
            .context("Failed to read task file");
    }
    Ok(args
        .task
        .clone()
        .unwrap_or_else(|| config.output.task.clone()))
}
