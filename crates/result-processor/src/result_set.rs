//! Processing a whole result set.
//!
//! Every record goes through the entry point on its own, so a record that
//! fails cannot affect its neighbours. Records are processed in parallel
//! with Rayon; the order of the surviving records matches the input.

use crate::processing::{ProcessOutcome, ResultPostProcessor, SuppressionReason};
use rayon::prelude::*;
use search_types::{QueryContext, Requester, ResultRecord};

/// Records that survived processing, plus what happened to the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedResults {
    pub results: Vec<ResultRecord>,
    /// Hidden by the visibility check
    pub removed_count: usize,
    /// Dropped because the variant failed on them
    pub failed_count: usize,
}

impl ProcessedResults {
    /// Everything that was left out, whatever the reason.
    pub fn suppressed_count(&self) -> usize {
        self.removed_count + self.failed_count
    }
}

/// Runs a `ResultPostProcessor` over many records.
///
/// ## Usage
/// ```ignore
/// let processor = ResultSetProcessor::new(ResultPostProcessor::from_settings(&registry, &settings)?);
/// let processed = processor.process_all(records, &query, &requester);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultSetProcessor {
    post_processor: ResultPostProcessor,
}

impl ResultSetProcessor {
    pub fn new(post_processor: ResultPostProcessor) -> Self {
        Self { post_processor }
    }

    pub fn post_processor(&self) -> ResultPostProcessor {
        self.post_processor
    }

    /// Process every record, returning one outcome per input, in order.
    pub fn process_outcomes(
        &self,
        records: Vec<ResultRecord>,
        query: &QueryContext,
        requester: &Requester,
    ) -> Vec<ProcessOutcome> {
        records
            .into_par_iter()
            .map(|record| self.post_processor.process(record, query, requester))
            .collect()
    }

    /// Process every record and keep the survivors.
    ///
    /// ## Algorithm
    /// 1. Process all records in parallel
    /// 2. Walk the outcomes in input order
    /// 3. Keep enriched records, count removals and failures
    pub fn process_all(
        &self,
        records: Vec<ResultRecord>,
        query: &QueryContext,
        requester: &Requester,
    ) -> ProcessedResults {
        let input_count = records.len();
        let mut processed = ProcessedResults::default();

        for outcome in self.process_outcomes(records, query, requester) {
            match outcome {
                ProcessOutcome::Enriched(record) => processed.results.push(record),
                ProcessOutcome::Suppressed(SuppressionReason::Removed) => {
                    processed.removed_count += 1
                }
                ProcessOutcome::Suppressed(_) => processed.failed_count += 1,
            }
        }

        tracing::debug!(
            "Processed {} records with {}: kept={}, removed={}, failed={}",
            input_count,
            self.post_processor.processor_type().name(),
            processed.results.len(),
            processed.removed_count,
            processed.failed_count
        );
        processed
    }
}
