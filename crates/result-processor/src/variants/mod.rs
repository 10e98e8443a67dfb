//! Processor variants shipped with the crate.
//!
//! `base` is the default variant. The others are ready-made policies an
//! application can select from configuration, or copy as a starting point
//! for its own variants.

pub mod base;
pub mod course_card;
pub mod enrollment_gate;
pub mod match_excerpt;

// Re-export for convenience
pub use base::{CourseDiscoveryResultProcessor, COURSE_DISCOVERY_RESULT_PROCESSOR};
pub use course_card::{CourseCardProcessor, COURSE_CARD_PROCESSOR};
pub use enrollment_gate::{EnrollmentGateProcessor, ENROLLMENT_GATE_PROCESSOR};
pub use match_excerpt::{MatchExcerptProcessor, MATCH_EXCERPT_PROCESSOR};

use crate::error::{ProcessorError, Result};
use search_types::ResultRecord;
use serde_json::Value;

/// Module path the base variant is registered under.
pub const BASE_MODULE: &str = "course_discovery.result_processor";

/// Module path the bundled variants are registered under.
pub const VARIANTS_MODULE: &str = "course_discovery.variants";

/// Read an optional string field. Absent and `null` are `None`; any other
/// non-string value is an error.
pub(crate) fn optional_str<'r>(record: &'r ResultRecord, field: &str) -> Result<Option<&'r str>> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(ProcessorError::invalid(field, "expected a string")),
    }
}

/// Read a string field that must be present.
pub(crate) fn required_str<'r>(record: &'r ResultRecord, field: &str) -> Result<&'r str> {
    optional_str(record, field)?.ok_or_else(|| ProcessorError::missing(field))
}

/// The nested `content` object most course documents carry.
pub(crate) fn content(record: &ResultRecord) -> Option<&ResultRecord> {
    record.get("content").and_then(Value::as_object)
}
