use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use ctxl_core::PresetMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

pub fn print_or_save(content: &str, output_path: Option<&Path>, quiet: bool) -> Result<()> {
    match output_path {
        Some(path) => {
            write_to_file(path, content)?;
            if !quiet {
                println!(
                    "{} Context saved to: {}",
                    "✅".green(),
                    path.display().to_string().blue()
                );
            }
        }
        None => write_to_stdout(content)?,
    }
    Ok(())
}

pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to file {}", path.display()))?;
    Ok(())
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.is_empty() && !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

/// `user` holds the names that came from the preset file, so the table can
/// show where each effective entry was defined.
pub fn print_presets_table(presets: &PresetMap, user: &PresetMap) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Preset").fg(Color::Green),
        Cell::new("Suffixes").fg(Color::Green),
        Cell::new("Include").fg(Color::Green),
        Cell::new("Exclude").fg(Color::Green),
        Cell::new("Source").fg(Color::Green),
    ]);
    for (name, preset) in presets {
        let source = if user.contains_key(name) {
            Cell::new("user").fg(Color::Yellow)
        } else {
            Cell::new("built-in").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(name).fg(Color::Cyan),
            Cell::new(preset.suffixes.join(" ")),
            Cell::new(preset.include.join(" ")),
            Cell::new(preset.exclude.join(" ")),
            source,
        ]);
    }
    println!("{table}");
}
