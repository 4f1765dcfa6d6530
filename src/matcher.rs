//! Wildcard matching for case names.
//!
//! The filter grammar is deliberately small: `*` matches any run of
//! characters (including dots, so `dEQP-GLES2.info.*` selects a whole
//! subtree), `?` matches exactly one character, and `,` separates
//! alternatives. Everything else matches literally. Patterns are compiled
//! once into anchored regular expressions and reused for the whole run.

use regex::Regex;

use crate::errors::HarnessError;

/// A compiled case-name filter.
#[derive(Debug)]
pub struct CaseMatcher {
    alternatives: Vec<Regex>,
}

impl CaseMatcher {
    /// A matcher that accepts every case name.
    pub fn match_all() -> Self {
        Self {
            alternatives: Vec::new(),
        }
    }

    /// Compiles a wildcard pattern, `,`-separated alternatives included.
    pub fn compile(pattern: &str) -> Result<Self, HarnessError> {
        let mut alternatives = Vec::new();
        for alt in pattern.split(',') {
            let alt = alt.trim();
            if alt.is_empty() {
                return Err(HarnessError::Pattern {
                    pattern: pattern.to_string(),
                    reason: "empty alternative".to_string(),
                });
            }
            let regex = Regex::new(&format!("^{}$", wildcard_to_regex(alt))).map_err(|e| {
                HarnessError::Pattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                }
            })?;
            alternatives.push(regex);
        }
        Ok(Self { alternatives })
    }

    /// Builds a matcher from an optional configured filter.
    pub fn from_filter(filter: Option<&str>) -> Result<Self, HarnessError> {
        match filter {
            Some(pattern) => Self::compile(pattern),
            None => Ok(Self::match_all()),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.alternatives.is_empty() || self.alternatives.iter().any(|r| r.is_match(name))
    }
}

fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out
}
