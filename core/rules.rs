use crate::presets::PresetStore;
use log;
use serde::Serialize;
use std::collections::BTreeSet;

/// Rule that hides every dotfile and dot-directory.
pub const HIDDEN_RULE: &str = ".*";
/// Exclusions applied to every combination, whatever presets are selected.
pub const DEFAULT_EXCLUDES: [&str; 2] = ["node_modules", HIDDEN_RULE];

/// Effective include/exclude globs for one invocation. Both sets are sorted
/// and duplicate-free; an empty `include` set admits every file that is not
/// excluded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterRuleSet {
    pub include: BTreeSet<String>,
    pub exclude: BTreeSet<String>,
}

impl FilterRuleSet {
    pub fn has_includes(&self) -> bool {
        !self.include.is_empty()
    }

    /// Drops the default hidden-entry exclusion so dotfiles can reach the
    /// walker. Other excludes are untouched.
    pub fn allow_hidden(mut self) -> Self {
        self.exclude.remove(HIDDEN_RULE);
        self
    }

    pub fn extend_include<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(patterns.into_iter().map(Into::into));
    }

    pub fn extend_exclude<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterPatterns {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Splits an ad-hoc filter string on whitespace. `!pattern` tokens are
/// excludes with the `!` removed, everything else is an include.
pub fn parse_filter_patterns(filter: &str) -> FilterPatterns {
    let mut patterns = FilterPatterns::default();
    for token in filter.split_whitespace() {
        match token.strip_prefix('!') {
            Some("") => log::warn!("Ignoring empty exclude token '!' in filter"),
            Some(pattern) => patterns.exclude.push(pattern.to_string()),
            None => patterns.include.push(token.to_string()),
        }
    }
    log::debug!(
        "Parsed filter patterns - Include: {:?}, Exclude: {:?}",
        patterns.include,
        patterns.exclude
    );
    patterns
}

pub fn combine<S: AsRef<str>>(store: &PresetStore, preset_names: &[S], filter: &str) -> FilterRuleSet {
    let mut rules = FilterRuleSet::default();
    rules.extend_exclude(DEFAULT_EXCLUDES);

    for name in preset_names {
        let name = name.as_ref();
        match store.get(name) {
            Some(preset) => {
                log::trace!("Applying preset '{}'", name);
                rules.extend_include(preset.include.iter().cloned());
                rules.extend_exclude(preset.exclude.iter().cloned());
            }
            None => log::warn!("Preset '{}' not found. Skipping.", name),
        }
    }

    let parsed = parse_filter_patterns(filter);
    rules.extend_include(parsed.include);
    rules.extend_exclude(parsed.exclude);

    log::debug!(
        "Combined rules - Include: {:?}, Exclude: {:?}",
        rules.include,
        rules.exclude
    );
    rules
}
