//! Ignore rules: case-insensitive regexes tested against the full candidate path.

use regex::{Regex, RegexBuilder};
use std::path::Path;

/// One compiled ignore pattern.
#[derive(Clone, Debug)]
pub struct IgnoreRule {
    pub pattern: String,
    regex: Regex,
}

/// The active rule set for a run. Patterns that fail to compile are dropped with a warning.
#[derive(Clone, Debug, Default)]
pub struct IgnoreFilter {
    rules: Vec<IgnoreRule>,
}

impl IgnoreFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let rules = patterns
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .filter_map(|p| {
                match RegexBuilder::new(p).case_insensitive(true).build() {
                    Ok(regex) => Some(IgnoreRule {
                        pattern: p.to_string(),
                        regex,
                    }),
                    Err(e) => {
                        log::warn!("Dropping invalid ignore pattern '{}': {}", p, e);
                        None
                    }
                }
            })
            .collect();
        Self { rules }
    }

    /// Build from a pipe-delimited string. Alternation is not available in this form.
    pub fn from_delimited(s: &str) -> Self {
        Self::new(&split_patterns(s))
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule matching `path`, if any.
    pub fn matching_rule(&self, path: &Path) -> Option<&IgnoreRule> {
        if self.rules.is_empty() {
            return None;
        }
        let s = path.to_string_lossy();
        self.rules.iter().find(|r| r.regex.is_match(&s))
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        self.matching_rule(path).is_some()
    }
}

/// Split a pipe-delimited pattern list. Only `|` separates; `;` may appear inside a pattern.
pub fn split_patterns(s: &str) -> Vec<String> {
    s.split('|')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
