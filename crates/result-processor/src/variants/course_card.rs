//! Derived fields for rendering a course card.

use super::{content, optional_str, required_str};
use crate::error::{ProcessorError, Result};
use crate::traits::{ProcessorType, ResultProcessor};
use search_types::{QueryContext, ResultRecord};
use serde_json::{json, Value};

const PROPERTIES: &[&str] = &["course_url", "display_org", "start_date"];

/// Adds `course_url`, `display_org` and `start_date` to every result.
///
/// A result without an `id` or an organization cannot be rendered as a card
/// and fails enrichment, which drops it from the results.
pub struct CourseCardProcessor<'a> {
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
}

impl<'a> CourseCardProcessor<'a> {
    pub fn new(record: &'a mut ResultRecord, query: &'a QueryContext) -> Self {
        Self { record, query }
    }

    /// `/courses/<id>/about`
    fn course_url(&self) -> Result<Value> {
        let course_id = required_str(self.record(), "id")?;
        Ok(json!(format!("/courses/{course_id}/about")))
    }

    /// Upper-cased organization, from `org` or `content.org`.
    fn display_org(&self) -> Result<Value> {
        let org = match optional_str(self.record(), "org")? {
            Some(org) => org,
            None => content(self.record())
                .map(|content| optional_str(content, "org"))
                .transpose()?
                .flatten()
                .ok_or_else(|| ProcessorError::missing("org"))?,
        };
        Ok(json!(org.to_uppercase()))
    }

    /// Date portion of the ISO-8601 `start` timestamp. The date and time may
    /// be separated by `T` or by a space, as RFC 3339 allows.
    fn start_date(&self) -> Result<Value> {
        let start = match optional_str(self.record(), "start")? {
            Some(start) => start,
            None => return Ok(Value::Null),
        };

        let date = start.split(['T', 't', ' ']).next().unwrap_or(start);
        if date.len() != 10 || date.as_bytes()[4] != b'-' || date.as_bytes()[7] != b'-' {
            return Err(ProcessorError::invalid("start", format!("not an ISO-8601 date: {start}")));
        }
        Ok(json!(date))
    }
}

impl ResultProcessor for CourseCardProcessor<'_> {
    fn name(&self) -> &'static str {
        "CourseCardProcessor"
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

    fn property_names(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn compute_property(&self, name: &str) -> Result<Value> {
        match name {
            "course_url" => self.course_url(),
            "display_org" => self.display_org(),
            "start_date" => self.start_date(),
            other => Err(ProcessorError::UnknownProperty {
                name: other.to_string(),
            }),
        }
    }
}

fn construct<'a>(
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
) -> Box<dyn ResultProcessor + 'a> {
    Box::new(CourseCardProcessor::new(record, query))
}

pub const COURSE_CARD_PROCESSOR: ProcessorType =
    ProcessorType::new("CourseCardProcessor", construct);
