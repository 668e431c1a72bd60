use crate::cli_args::DebugArgs;
use crate::output::write_to_stdout;
use crate::{ScanSetup, prepare_scan};
use anyhow::{Context, Result};
use colored::*;
use ctxl_core::{self as core, Config, ErrorRecord, FilterRuleSet, Record, output_formats};
use log;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct DebugInfo<'a> {
    effective_config: &'a Config,
    applied_presets: &'a [String],
    auto_detected: bool,
    rules: &'a FilterRuleSet,
    ignore_file: String,
    files_to_include: Vec<&'a str>,
    errors: Vec<&'a ErrorRecord>,
}

pub fn handle_debug_command(args: DebugArgs) -> Result<()> {
    let setup = prepare_scan(&args.selection)?;

    log::debug!("Debug: Scanning files...");
    let report = core::scan(
        &setup.project_root,
        &setup.rules,
        &setup.ignore_file,
        setup.include_dotfiles,
    )
    .context("Failed to scan files for debug")?;

    let debug_data = DebugInfo {
        effective_config: &setup.config,
        applied_presets: &setup.applied_presets,
        auto_detected: setup.auto_detected,
        rules: &setup.rules,
        ignore_file: setup.ignore_file.display().to_string(),
        files_to_include: report
            .records
            .iter()
            .filter(|r| matches!(r, Record::File(_)))
            .map(Record::path)
            .collect(),
        errors: report
            .records
            .iter()
            .filter_map(|r| match r {
                Record::Error(e) => Some(e),
                Record::File(_) => None,
            })
            .collect(),
    };

    match args.format.as_deref() {
        Some("json") => write_to_stdout(&output_formats::serialize_context_to_json(&debug_data, true)?),
        Some(_) => write_to_stdout(&output_formats::serialize_context_to_yaml(&debug_data)?),
        None => print_debug_info_pretty(&debug_data, &setup),
    }
}

fn heading(title: &str) {
    println!(
        "{}",
        format!("\n--- {} ---", title).green().bold().underline()
    );
}

fn print_list<S: AsRef<str>>(items: &[S]) {
    if items.is_empty() {
        println!("{}", "(None)".dimmed());
    } else {
        items.iter().for_each(|p| println!("- {}", p.as_ref().cyan()));
    }
}

fn print_debug_info_pretty(debug_info: &DebugInfo, setup: &ScanSetup) -> Result<()> {
    heading("Effective Configuration");
    println!("{}", debug_info.effective_config.to_toml()?);
    println!("{:<16} {}", "Project root:".green(), setup.project_root.display());

    heading(if debug_info.auto_detected {
        "Presets (auto-detected)"
    } else {
        "Presets"
    });
    print_list(debug_info.applied_presets);

    heading("Include Patterns");
    print_list(&debug_info.rules.include.iter().collect::<Vec<_>>());
    heading("Exclude Patterns");
    print_list(&debug_info.rules.exclude.iter().collect::<Vec<_>>());

    heading("Ignore File");
    let state = if setup.ignore_file.exists() {
        "found".green()
    } else {
        "not found".yellow()
    };
    println!("{} ({})", debug_info.ignore_file.cyan(), state);

    heading("Files Included");
    print_list(&debug_info.files_to_include);

    heading("Errors");
    if debug_info.errors.is_empty() {
        println!("{}", "(None)".dimmed());
    } else {
        for error in &debug_info.errors {
            println!("- {}: {}", error.path.red(), error.message);
        }
    }

    println!("{}", "\n--- End Debug Info ---".green().bold());
    Ok(())
}
