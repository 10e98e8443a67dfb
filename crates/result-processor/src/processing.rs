//! The per-result entry point.
//!
//! For every raw result the search handler calls `process_result`, which:
//! 1. Constructs the configured variant around the record
//! 2. Asks it whether the requester may see the record
//! 3. If so, lets it add its computed properties
//! 4. Returns the decorated record, or `None` when the record is suppressed
//!
//! Failures inside a variant are contained here. They are logged together
//! with the serialized record and the record is dropped, so one broken
//! result can never take the rest of the result set down with it.

use crate::error::{ProcessorError, ResolutionError};
use crate::resolver::ProcessorRegistry;
use crate::traits::ProcessorType;
use crate::variants::COURSE_DISCOVERY_RESULT_PROCESSOR;
use search_types::{QueryContext, Requester, ResultRecord, Settings};

/// Why a record was left out of the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressionReason {
    /// The visibility check hid the record from the requester
    Removed,
    /// The visibility check itself failed
    VisibilityFailed(ProcessorError),
    /// Computing a property failed
    EnrichmentFailed(ProcessorError),
}

/// Outcome of processing one record.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Record passed the visibility check and carries its computed properties
    Enriched(ResultRecord),
    /// Record was dropped
    Suppressed(SuppressionReason),
}

impl ProcessOutcome {
    /// The record to hand back to the caller, if any.
    pub fn into_record(self) -> Option<ResultRecord> {
        match self {
            ProcessOutcome::Enriched(record) => Some(record),
            ProcessOutcome::Suppressed(_) => None,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, ProcessOutcome::Suppressed(_))
    }

    /// Suppressed because a variant failed, rather than by policy.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ProcessOutcome::Suppressed(
                SuppressionReason::VisibilityFailed(_) | SuppressionReason::EnrichmentFailed(_)
            )
        )
    }
}

/// Applies the configured processor variant to search results.
///
/// The variant is resolved once, when the post-processor is built, and the
/// handle is then shared by every caller.
#[derive(Debug, Clone, Copy)]
pub struct ResultPostProcessor {
    processor_type: ProcessorType,
}

impl ResultPostProcessor {
    /// Create a post-processor for an already resolved variant.
    pub fn new(processor_type: ProcessorType) -> Self {
        Self { processor_type }
    }

    /// A post-processor using the base variant.
    pub fn base() -> Self {
        Self::new(COURSE_DISCOVERY_RESULT_PROCESSOR)
    }

    /// Resolve the variant named in `settings`, falling back to the base
    /// variant when none is configured.
    ///
    /// # Returns
    /// * `Ok(ResultPostProcessor)` - Ready to process results
    /// * `Err(ResolutionError)` - The configured reference does not resolve
    pub fn from_settings(
        registry: &ProcessorRegistry,
        settings: &Settings,
    ) -> Result<Self, ResolutionError> {
        let processor_type =
            registry.resolve(settings.result_processor(), COURSE_DISCOVERY_RESULT_PROCESSOR)?;
        tracing::info!("Using result processor: {}", processor_type.name());
        Ok(Self::new(processor_type))
    }

    pub fn processor_type(&self) -> ProcessorType {
        self.processor_type
    }

    /// Process one record and report exactly what happened to it.
    pub fn process(
        &self,
        mut record: ResultRecord,
        query: &QueryContext,
        requester: &Requester,
    ) -> ProcessOutcome {
        let suppression = {
            let mut processor = self.processor_type.construct(&mut record, query);
            match processor.should_remove(requester) {
                Ok(true) => Some(SuppressionReason::Removed),
                Ok(false) => processor
                    .add_properties()
                    .err()
                    .map(SuppressionReason::EnrichmentFailed),
                Err(err) => Some(SuppressionReason::VisibilityFailed(err)),
            }
        };

        match suppression {
            None => ProcessOutcome::Enriched(record),
            Some(reason) => {
                self.report(&record, &reason);
                ProcessOutcome::Suppressed(reason)
            }
        }
    }

    /// Process one record; `None` means the record must not be returned.
    pub fn process_result(
        &self,
        record: ResultRecord,
        query: &QueryContext,
        requester: &Requester,
    ) -> Option<ResultRecord> {
        self.process(record, query, requester).into_record()
    }

    fn report(&self, record: &ResultRecord, reason: &SuppressionReason) {
        let processor = self.processor_type.name();
        match reason {
            SuppressionReason::Removed => {
                tracing::debug!(processor, "Result removed by visibility check");
            }
            SuppressionReason::VisibilityFailed(err) => {
                tracing::error!(
                    processor,
                    "error checking visibility for {} - {}: will remove from results",
                    serialize_record(record),
                    err
                );
            }
            SuppressionReason::EnrichmentFailed(err) => {
                tracing::error!(
                    processor,
                    "error processing properties for {} - {}: will remove from results",
                    serialize_record(record),
                    err
                );
            }
        }
    }
}

impl Default for ResultPostProcessor {
    fn default() -> Self {
        Self::base()
    }
}

/// Resolve `reference` and process one record with it.
///
/// For callers that do not keep a `ResultPostProcessor` around; resolution
/// happens on every call, before the record is touched.
pub fn process_result(
    registry: &ProcessorRegistry,
    reference: Option<&str>,
    record: ResultRecord,
    query: &QueryContext,
    requester: &Requester,
) -> Result<Option<ResultRecord>, ResolutionError> {
    let processor_type = registry.resolve(reference, COURSE_DISCOVERY_RESULT_PROCESSOR)?;
    Ok(ResultPostProcessor::new(processor_type).process_result(record, query, requester))
}

fn serialize_record(record: &ResultRecord) -> String {
    serde_json::to_string(record).unwrap_or_else(|_| format!("{record:?}"))
}
