//! Record normalizer
//!
//! Turns one raw input line into either a [`NormalizedEntry`] or a
//! [`SkipReason`]. The input feed is large and externally produced, so a
//! bad line is classified and counted, never raised as an error.

use crate::config::NULL_CA_ID;
use crate::{Classification, NormalizedEntry, SkipReason};
use serde_json::{Map, Value};

/// Field holding the HGVS expression (the store key)
pub const HGVS_FIELD: &str = "hgvs";

/// Field holding the canonical allele identifier (the store value)
pub const CA_ID_FIELD: &str = "ca_id";

/// Classify a single line of input.
///
/// The line must not include its terminator, though trailing whitespace is
/// tolerated by the JSON parser.
pub fn classify_line(line: &[u8]) -> Classification {
    let value: Value = match serde_json::from_slice(line) {
        Ok(value) => value,
        Err(_) => return Classification::Skipped(SkipReason::MalformedJson),
    };

    match value {
        Value::Object(record) => classify_record(&record),
        _ => Classification::Skipped(SkipReason::NotAnObject),
    }
}

/// Classify an already-parsed JSON object
pub fn classify_record(record: &Map<String, Value>) -> Classification {
    let key = match record.get(HGVS_FIELD) {
        None | Some(Value::Null) => return Classification::Skipped(SkipReason::MissingKey),
        Some(Value::String(hgvs)) => hgvs.trim(),
        Some(_) => return Classification::Skipped(SkipReason::InvalidField(HGVS_FIELD)),
    };
    if key.is_empty() {
        return Classification::Skipped(SkipReason::EmptyKey);
    }

    let value = match record.get(CA_ID_FIELD) {
        None | Some(Value::Null) => NULL_CA_ID,
        Some(Value::String(ca_id)) => match ca_id.trim() {
            "" => NULL_CA_ID,
            trimmed => trimmed,
        },
        // Falsy JSON values carry no identifier
        Some(Value::Bool(false)) => NULL_CA_ID,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => NULL_CA_ID,
        Some(Value::Array(items)) if items.is_empty() => NULL_CA_ID,
        Some(Value::Object(fields)) if fields.is_empty() => NULL_CA_ID,
        Some(_) => return Classification::Skipped(SkipReason::InvalidField(CA_ID_FIELD)),
    };

    Classification::Accepted(NormalizedEntry::new(key, value))
}
