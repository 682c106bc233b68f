//! Error types for schedule tag decoding and configuration.

use std::num::ParseIntError;

use thiserror::Error;

use crate::types::SCHEDULE_TAG_KEY;

/// Reasons a schedule tag cannot be turned back into a `CapacityState`.
///
/// A partially valid tag is never accepted; every variant aborts decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("tag {key} not found", key = SCHEDULE_TAG_KEY)]
    TagMissing,

    #[error("invalid {key} tag value {value:?}: entry {entry:?} is not a key:value pair", key = SCHEDULE_TAG_KEY)]
    MalformedEntry { value: String, entry: String },

    #[error("invalid {key} tag value {value:?} - {field}:{raw}: {source}", key = SCHEDULE_TAG_KEY)]
    InvalidNumber {
        value: String,
        field: String,
        raw: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid {key} tag value {value:?}: unknown field {field:?}", key = SCHEDULE_TAG_KEY)]
    UnknownField { value: String, field: String },

    #[error("invalid {key} tag value {value:?}: field {field} appears more than once", key = SCHEDULE_TAG_KEY)]
    DuplicateField { value: String, field: &'static str },

    #[error("invalid {key} tag value {value:?}: field {field} is missing", key = SCHEDULE_TAG_KEY)]
    MissingField { value: String, field: &'static str },
}

/// Fatal startup configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ASG_PREFIX env. var not set, these are comma separated prefixes of autoscaling groups")]
    MissingPrefixes,

    #[error("invalid provider call timeout: {0}s (must be at least 1s)")]
    InvalidTimeout(u64),

    #[error("invalid log format: {0} (expected: text|json)")]
    InvalidLogFormat(String),
}
