//! Accumulate-don't-throw validation.
//!
//! Model parsers record every field-level problem as a `"path: reason"`
//! string and keep validating sibling fields, so one pass over an untrusted
//! document reports everything wrong with it. A value is only produced when
//! no issue was recorded.

use std::fmt;
use thiserror::Error;

/// Reason used when a required field is missing.
pub const NOT_DEFINED: &str = "Not defined";

/// Reason used when a field is missing or fails its format check.
pub const INVALID_OR_NOT_DEFINED: &str = "Invalid or not defined";

/// Collected `"path: reason"` validation issues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", .0.join("; "))]
pub struct ValidationIssues(Vec<String>);

impl ValidationIssues {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Record `"path: reason"`.
    pub fn add(&mut self, path: impl fmt::Display, reason: impl fmt::Display) {
        self.0.push(format!("{}: {}", path, reason));
    }

    /// Pass a parsed field through, recording `reason` when it is missing.
    pub fn require<T>(
        &mut self,
        path: impl fmt::Display,
        value: Option<T>,
        reason: impl fmt::Display,
    ) -> Option<T> {
        if value.is_none() {
            self.add(path, reason);
        }
        value
    }

    /// Pass a fallible field through, recording the error when it failed.
    pub fn check<T, E: fmt::Display>(
        &mut self,
        path: impl fmt::Display,
        value: Result<T, E>,
    ) -> Option<T> {
        match value {
            Ok(value) => Some(value),
            Err(err) => {
                self.add(path, err);
                None
            }
        }
    }

    /// Merge a nested collector, prefixing each of its issues with `path`.
    pub fn extend_scoped(&mut self, path: impl fmt::Display, nested: ValidationIssues) {
        for issue in nested.0 {
            self.add(&path, issue);
        }
    }

    /// True when nothing was recorded.
    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    /// The recorded issues, defined only when invalid.
    pub fn issues(&self) -> Option<&[String]> {
        if self.is_valid() {
            None
        } else {
            Some(&self.0)
        }
    }

    /// All issues, one per line.
    pub fn to_lines(&self) -> String {
        self.0.join("\n")
    }

    /// Yield `value` only if nothing was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, ValidationIssues> {
        if self.is_valid() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
