use crate::error::Result;
use crate::filter::PathFilter;
use crate::output_formats;
use crate::rules::FilterRuleSet;
use crate::walk::{self, Visitor, WalkEntry};
use log;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub path: String,
    pub message: String,
}

/// Outcome for one scanned file, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Record {
    File(FileRecord),
    Error(ErrorRecord),
}

impl Record {
    pub fn path(&self) -> &str {
        match self {
            Record::File(f) => &f.path,
            Record::Error(e) => &e.path,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub records: Vec<Record>,
    pub file_count: usize,
    pub error_count: usize,
}

#[derive(Default)]
struct RecordCollector {
    report: ScanReport,
}

impl RecordCollector {
    fn push_error(&mut self, path: String, message: String) {
        log::warn!("Error processing file {}: {}", path, message);
        self.report.error_count += 1;
        self.report
            .records
            .push(Record::Error(ErrorRecord { path, message }));
    }
}

impl Visitor for RecordCollector {
    fn visit(&mut self, entry: &WalkEntry) {
        if entry.is_dir {
            return;
        }
        let path = entry.relative_path.to_string_lossy().into_owned();
        match read_text(&entry.absolute_path) {
            Ok(content) => {
                log::trace!("Including file: {}", path);
                self.report.file_count += 1;
                self.report
                    .records
                    .push(Record::File(FileRecord { path, content }));
            }
            Err(message) => self.push_error(path, message),
        }
    }

    fn walk_error(&mut self, relative_path: Option<&Path>, error: &walkdir::Error) {
        let path = relative_path.map_or_else(String::new, |p| p.to_string_lossy().into_owned());
        self.push_error(path, error.to_string());
    }
}

/// Content must be UTF-8 that XML can carry; anything else is reported
/// instead of read, so every output format sees the same records.
fn read_text(path: &Path) -> std::result::Result<String, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let text = String::from_utf8(bytes).map_err(|e| format!("File is not valid UTF-8: {}", e))?;
    match output_formats::find_illegal_xml_char(&text) {
        Some((offset, c)) => Err(output_formats::illegal_xml_char_message(offset, c)),
        None => Ok(text),
    }
}

pub fn scan(
    root: &Path,
    rules: &FilterRuleSet,
    ignore_file: &Path,
    include_dotfiles: bool,
) -> Result<ScanReport> {
    let filter = PathFilter::new(root, rules, ignore_file, include_dotfiles)?;
    scan_with_filter(root, &filter)
}

/// Reads every admitted file under `root`. Read failures become
/// [`ErrorRecord`]s; only failures on the root itself abort the scan.
pub fn scan_with_filter(root: &Path, filter: &PathFilter) -> Result<ScanReport> {
    log::info!("Scanning project directory: {}", root.display());
    let mut collector = RecordCollector::default();
    walk::walk(root, filter, &mut collector)?;
    let report = collector.report;
    log::info!(
        "Processed {} files with {} errors",
        report.file_count,
        report.error_count
    );
    Ok(report)
}
