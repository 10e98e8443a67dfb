//! Core traits for result processing.
//!
//! This module defines the `ResultProcessor` contract every variant
//! implements, and `ProcessorType`, the descriptor the registry hands out
//! so a variant can be constructed for each record.

use crate::error::{ProcessorError, Result};
use search_types::{QueryContext, Requester, ResultRecord};
use serde_json::Value;
use std::fmt;

/// Post-processing of a single search result.
///
/// A processor is built for one record, holds a mutable borrow of that very
/// record together with the query context, and goes through two steps:
/// 1. `should_remove` decides whether the requester may see the record
/// 2. `add_properties` writes the variant's computed properties into it
///
/// ## Design Note
/// Computed properties are declared up front by `property_names` and
/// produced one at a time by `compute_property`. Each property must be
/// computable on its own: the default `add_properties` gives no ordering
/// guarantee.
pub trait ResultProcessor {
    /// Returns the name of this processor (for logging/debugging)
    fn name(&self) -> &'static str;

    /// The record being processed
    fn record(&self) -> &ResultRecord;

    /// Mutable access to the record being processed
    fn record_mut(&mut self) -> &mut ResultRecord;

    /// The query that produced the record
    fn query(&self) -> &QueryContext;

    /// Last-chance access check. Must not mutate the record.
    ///
    /// # Returns
    /// * `Ok(true)` - The record is hidden from this requester
    /// * `Ok(false)` - The record may be returned
    /// * `Err` - No decision could be made; the record is suppressed
    fn should_remove(&self, _requester: &Requester) -> Result<bool> {
        Ok(false)
    }

    /// Names of the computed properties this variant exposes.
    fn property_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Compute a single declared property from the record and query.
    fn compute_property(&self, name: &str) -> Result<Value> {
        Err(ProcessorError::UnknownProperty {
            name: name.to_string(),
        })
    }

    /// Write every declared property into the record.
    ///
    /// ## Algorithm
    /// 1. Compute all properties into a staging list, stopping at the first error
    /// 2. Only if every property succeeded, insert them into the record,
    ///    overwriting existing keys of the same name
    ///
    /// The record is left untouched when any property fails.
    fn add_properties(&mut self) -> Result<()> {
        let staged = self
            .property_names()
            .iter()
            .map(|name| self.compute_property(name).map(|value| (*name, value)))
            .collect::<Result<Vec<_>>>()?;

        let record = self.record_mut();
        for (name, value) in staged {
            record.insert(name.to_string(), value);
        }
        Ok(())
    }
}

/// Builds a processor around one record.
pub type ProcessorConstructor =
    for<'a> fn(&'a mut ResultRecord, &'a QueryContext) -> Box<dyn ResultProcessor + 'a>;

/// A processor variant that can be selected by configuration.
///
/// Cheap to copy and shareable across threads; resolve it once and hand it
/// to every worker.
#[derive(Clone, Copy)]
pub struct ProcessorType {
    name: &'static str,
    construct: ProcessorConstructor,
}

impl ProcessorType {
    pub const fn new(name: &'static str, construct: ProcessorConstructor) -> Self {
        Self { name, construct }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Construct the variant for one record.
    pub fn construct<'a>(
        &self,
        record: &'a mut ResultRecord,
        query: &'a QueryContext,
    ) -> Box<dyn ResultProcessor + 'a> {
        (self.construct)(record, query)
    }
}

impl fmt::Debug for ProcessorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorType")
            .field("name", &self.name)
            .finish()
    }
}
