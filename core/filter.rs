use crate::error::{AppError, Result};
use crate::rules::FilterRuleSet;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Why an entry was kept out of the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Dotfile,
    Excluded,
    NotIncluded,
}

/// Per-entry admission decisions shared by the file scan and the tree
/// renderer. Patterns use gitignore glob semantics relative to the scan root.
#[derive(Debug)]
pub struct PathFilter {
    exclude: Gitignore,
    include: Option<Gitignore>,
    include_dotfiles: bool,
    ignore_file_patterns: usize,
}

impl PathFilter {
    pub fn new(
        root: &Path,
        rules: &FilterRuleSet,
        ignore_file: &Path,
        include_dotfiles: bool,
    ) -> Result<Self> {
        let ignore_lines = read_ignore_file(ignore_file)?;

        let mut exclude_builder = GitignoreBuilder::new(root);
        for pattern in &rules.exclude {
            exclude_builder.add_line(None, pattern)?;
        }
        for line in &ignore_lines {
            exclude_builder.add_line(Some(ignore_file.to_path_buf()), line)?;
        }
        let exclude = exclude_builder.build()?;

        let include = if rules.has_includes() {
            let mut include_builder = GitignoreBuilder::new(root);
            for pattern in &rules.include {
                include_builder.add_line(None, pattern)?;
            }
            Some(include_builder.build()?)
        } else {
            None
        };

        log::debug!(
            "Filter built: {} exclude patterns ({} from ignore file), {} include patterns, dotfiles {}",
            exclude.num_ignores(),
            ignore_lines.len(),
            include.as_ref().map_or(0, |i| i.num_ignores()),
            if include_dotfiles { "allowed" } else { "hidden" }
        );

        Ok(Self {
            exclude,
            include,
            include_dotfiles,
            ignore_file_patterns: ignore_lines.len(),
        })
    }

    pub fn ignore_file_patterns(&self) -> usize {
        self.ignore_file_patterns
    }

    /// Decides whether an entry takes part in the walk. Rules apply in
    /// order: dotfile, exclude, include. Directories are never rejected by
    /// include patterns.
    pub fn check(&self, relative_path: &Path, is_dir: bool) -> std::result::Result<(), Rejection> {
        let is_dotfile = relative_path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if !self.include_dotfiles && is_dotfile {
            return Err(Rejection::Dotfile);
        }

        if self
            .exclude
            .matched_path_or_any_parents(relative_path, is_dir)
            .is_ignore()
        {
            return Err(Rejection::Excluded);
        }

        if is_dir {
            return Ok(());
        }

        match &self.include {
            Some(include) => {
                if include
                    .matched_path_or_any_parents(relative_path, false)
                    .is_ignore()
                {
                    Ok(())
                } else {
                    Err(Rejection::NotIncluded)
                }
            }
            None => Ok(()),
        }
    }

    pub fn admits(&self, relative_path: &Path, is_dir: bool) -> bool {
        match self.check(relative_path, is_dir) {
            Ok(()) => true,
            Err(reason) => {
                log::trace!("Skipping {} ({:?})", relative_path.display(), reason);
                false
            }
        }
    }
}

/// One pattern per non-empty line. A missing file contributes no patterns.
pub fn read_ignore_file(ignore_file: &Path) -> Result<Vec<String>> {
    let content = match fs::read_to_string(ignore_file) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("No ignore file at {}", ignore_file.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(AppError::FileRead {
                path: ignore_file.to_path_buf(),
                source: e,
            });
        }
    };
    let patterns: Vec<String> = content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(String::from)
        .collect();
    log::debug!(
        "Read {} patterns from {}",
        patterns.len(),
        ignore_file.display()
    );
    Ok(patterns)
}
