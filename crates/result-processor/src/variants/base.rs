//! The base result processor.
//!
//! Used whenever no variant is configured. It never hides a result and adds
//! no properties, so results come back exactly as the search engine
//! produced them.

use crate::traits::{ProcessorType, ResultProcessor};
use search_types::{QueryContext, ResultRecord};

/// Keeps every result and leaves it unchanged.
pub struct CourseDiscoveryResultProcessor<'a> {
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
}

impl<'a> CourseDiscoveryResultProcessor<'a> {
    pub fn new(record: &'a mut ResultRecord, query: &'a QueryContext) -> Self {
        Self { record, query }
    }
}

impl ResultProcessor for CourseDiscoveryResultProcessor<'_> {
    fn name(&self) -> &'static str {
        "CourseDiscoveryResultProcessor"
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
}

fn construct<'a>(
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
) -> Box<dyn ResultProcessor + 'a> {
    Box::new(CourseDiscoveryResultProcessor::new(record, query))
}

/// Default variant type.
pub const COURSE_DISCOVERY_RESULT_PROCESSOR: ProcessorType =
    ProcessorType::new("CourseDiscoveryResultProcessor", construct);
