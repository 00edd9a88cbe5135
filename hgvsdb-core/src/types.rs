//! Core types for hgvsdb

use serde::Serialize;
use std::fmt;

/// A key/value pair ready to be committed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEntry {
    /// Trimmed HGVS expression, never empty
    pub key: String,
    /// Trimmed CA ID, or [`crate::config::NULL_CA_ID`]
    pub value: String,
}

impl NormalizedEntry {
    /// Create a new entry
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Why a line produced no entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Not parseable as JSON (includes empty lines and invalid UTF-8)
    MalformedJson,
    /// Valid JSON, but not an object
    NotAnObject,
    /// `hgvs` absent or null
    MissingKey,
    /// `hgvs` empty after trimming
    EmptyKey,
    /// A recognized field holds a non-string value
    InvalidField(&'static str),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MalformedJson => f.write_str("malformed JSON"),
            SkipReason::NotAnObject => f.write_str("not a JSON object"),
            SkipReason::MissingKey => f.write_str("missing hgvs"),
            SkipReason::EmptyKey => f.write_str("empty hgvs"),
            SkipReason::InvalidField(field) => write!(f, "non-string {}", field),
        }
    }
}

/// Outcome of normalizing one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Accepted(NormalizedEntry),
    Skipped(SkipReason),
}

/// Per-reason counters for skipped lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub malformed_json: u64,
    pub not_an_object: u64,
    pub missing_key: u64,
    pub empty_key: u64,
    pub invalid_field: u64,
}

impl SkipCounts {
    /// Count one skipped line
    pub fn record(&mut self, reason: SkipReason) {
        let counter = match reason {
            SkipReason::MalformedJson => &mut self.malformed_json,
            SkipReason::NotAnObject => &mut self.not_an_object,
            SkipReason::MissingKey => &mut self.missing_key,
            SkipReason::EmptyKey => &mut self.empty_key,
            SkipReason::InvalidField(_) => &mut self.invalid_field,
        };
        *counter += 1;
    }

    /// Total skipped lines across all reasons
    pub fn total(&self) -> u64 {
        self.malformed_json
            + self.not_an_object
            + self.missing_key
            + self.empty_key
            + self.invalid_field
    }
}
