pub mod config;
pub mod context;
pub mod detect;
pub mod error;
pub mod filter;
pub mod gather;
pub mod output_formats;
pub mod presets;
pub mod rules;
pub mod tree;
pub mod walk;

pub use config::Config;
pub use context::{OutputDocument, ProjectContext, assemble, generate_context};
pub use detect::{detect_project_types, matching_presets};
pub use error::{AppError, Result};
pub use filter::PathFilter;
pub use gather::{ErrorRecord, FileRecord, Record, ScanReport, scan};
pub use presets::{Preset, PresetMap, PresetStore};
pub use rules::{FilterPatterns, FilterRuleSet, combine, parse_filter_patterns};
pub use tree::render_tree;
