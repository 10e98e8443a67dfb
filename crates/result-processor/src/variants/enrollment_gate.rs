//! Visibility policy based on catalog settings and enrollments.
//!
//! Hides courses that are not meant to appear in the catalog, and
//! invitation-only courses from requesters who are not enrolled.

use super::{optional_str, required_str};
use crate::error::{ProcessorError, Result};
use crate::traits::{ProcessorType, ResultProcessor};
use search_types::{QueryContext, Requester, ResultRecord};
use serde_json::Value;

/// Removes results the requester is not entitled to see.
///
/// ## Algorithm
/// 1. Staff see everything
/// 2. `catalog_visibility == "none"` is hidden from everyone else
/// 3. `invitation_only == true` is hidden unless the requester is enrolled
///    in the course `id`
pub struct EnrollmentGateProcessor<'a> {
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
}

impl<'a> EnrollmentGateProcessor<'a> {
    pub fn new(record: &'a mut ResultRecord, query: &'a QueryContext) -> Self {
        Self { record, query }
    }

    fn invitation_only(&self) -> Result<bool> {
        match self.record.get("invitation_only") {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(_) => Err(ProcessorError::Visibility(
                "invitation_only must be a boolean".to_string(),
            )),
        }
    }
}

impl ResultProcessor for EnrollmentGateProcessor<'_> {
    fn name(&self) -> &'static str {
        "EnrollmentGateProcessor"
    }

    fn record(&self) -> &ResultRecord {
        &*self.record
    }

    fn record_mut(&mut self) -> &mut ResultRecord {
        &mut *self.record
    }

    fn query(&self) -> &QueryContext {
        self.query
    }

    fn should_remove(&self, requester: &Requester) -> Result<bool> {
        if requester.is_staff {
            return Ok(false);
        }

        if optional_str(self.record(), "catalog_visibility")? == Some("none") {
            return Ok(true);
        }

        if self.invitation_only()? {
            let course_id = required_str(self.record(), "id")?;
            return Ok(!requester.is_enrolled_in(course_id));
        }

        Ok(false)
    }
}

fn construct<'a>(
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
) -> Box<dyn ResultProcessor + 'a> {
    Box::new(EnrollmentGateProcessor::new(record, query))
}

pub const ENROLLMENT_GATE_PROCESSOR: ProcessorType =
    ProcessorType::new("EnrollmentGateProcessor", construct);
