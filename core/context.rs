use crate::error::Result;
use crate::filter::PathFilter;
use crate::gather::{self, Record};
use crate::rules::FilterRuleSet;
use crate::tree;
use log;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    pub files: Vec<Record>,
    pub directory_structure: String,
}

/// The assembled payload: scanned files, the rendered tree and the task.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDocument {
    pub project_context: ProjectContext,
    pub task: String,
}

impl OutputDocument {
    pub fn errors(&self) -> impl Iterator<Item = &gather::ErrorRecord> {
        self.project_context.files.iter().filter_map(|r| match r {
            Record::Error(e) => Some(e),
            Record::File(_) => None,
        })
    }
}

/// Records are kept exactly as given: no reordering, deduplication or
/// content checks.
pub fn assemble(records: Vec<Record>, tree_text: String, task: String) -> OutputDocument {
    OutputDocument {
        project_context: ProjectContext {
            files: records,
            directory_structure: tree_text,
        },
        task,
    }
}

/// Scans `root` and renders its tree through one shared [`PathFilter`], so
/// the file list and the tree always agree on what is in scope.
pub fn generate_context(
    root: &Path,
    rules: &FilterRuleSet,
    ignore_file: &Path,
    include_dotfiles: bool,
    task: &str,
) -> Result<OutputDocument> {
    let filter = PathFilter::new(root, rules, ignore_file, include_dotfiles)?;
    let report = gather::scan_with_filter(root, &filter)?;
    let tree_text = tree::render_tree_with_filter(root, &filter)?;
    log::debug!(
        "Assembling document: {} records, {} bytes of tree",
        report.records.len(),
        tree_text.len()
    );
    Ok(assemble(report.records, tree_text, task.to_string()))
}
