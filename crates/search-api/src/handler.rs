//! # Course Discovery Search Handler
//!
//! This module coordinates one course discovery request:
//! 1. Run the query against the search backend
//! 2. Post-process every hit with the configured result processor
//! 3. Drop suppressed hits and count them as access denied
//! 4. Assemble the response
//!
//! Both the backend call and the post-processing are CPU-bound or
//! blocking, so they run on the blocking pool.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use result_processor::{ProcessorRegistry, ResultPostProcessor, ResultSetProcessor};
use search_types::{QueryContext, Requester, ResultRecord, Settings};

use crate::backend::{RawSearchResults, SearchBackend, SearchHit, SearchRequest};

/// Final response returned to the requester
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching documents the requester may see
    pub total: usize,
    pub max_score: Option<f64>,
    pub results: Vec<SearchHit>,
    /// Hits on this page that were suppressed by the result processor
    pub access_denied_count: usize,
}

/// Runs course discovery searches
#[derive(Clone)]
pub struct CourseDiscoverySearch {
    backend: Arc<dyn SearchBackend>,
    result_set: ResultSetProcessor,
}

impl CourseDiscoverySearch {
    /// Create a handler with an already resolved post-processor.
    pub fn new(backend: Arc<dyn SearchBackend>, post_processor: ResultPostProcessor) -> Self {
        Self {
            backend,
            result_set: ResultSetProcessor::new(post_processor),
        }
    }

    /// Create a handler, resolving the processor named in `settings`.
    ///
    /// A reference that does not resolve is reported here, before any
    /// request is served.
    pub fn from_settings(
        backend: Arc<dyn SearchBackend>,
        registry: &ProcessorRegistry,
        settings: &Settings,
    ) -> Result<Self> {
        let post_processor = ResultPostProcessor::from_settings(registry, settings)
            .context("Failed to resolve the configured result processor")?;
        Ok(Self::new(backend, post_processor))
    }

    pub fn post_processor(&self) -> ResultPostProcessor {
        self.result_set.post_processor()
    }

    /// Main entry point: run a search on behalf of `requester`
    ///
    /// # Returns
    /// The visible hits, in backend order, with their computed properties
    pub async fn search(
        &self,
        request: SearchRequest,
        requester: Requester,
    ) -> Result<SearchResponse> {
        let start_time = Instant::now();
        let query = request.query_context();

        let raw = self.run_backend(request).await?;
        info!(
            "Backend {} returned {} hits (total: {})",
            self.backend.name(),
            raw.results.len(),
            raw.total
        );

        let response = self.post_process(raw, query, requester).await?;
        info!(
            "Returning {} results, {} access denied, in {:.2?}",
            response.results.len(),
            response.access_denied_count,
            start_time.elapsed()
        );
        Ok(response)
    }

    /// Run the backend query on the blocking pool
    async fn run_backend(&self, request: SearchRequest) -> Result<RawSearchResults> {
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || backend.search(&request))
            .await
            .context("Search backend task panicked")?
            .context("Search backend failed")
    }

    /// Post-process every hit on the blocking pool
    async fn post_process(
        &self,
        raw: RawSearchResults,
        query: QueryContext,
        requester: Requester,
    ) -> Result<SearchResponse> {
        let result_set = self.result_set;
        tokio::task::spawn_blocking(move || assemble_response(&result_set, raw, &query, &requester))
            .await
            .context("Result processing task panicked")
    }
}

/// Apply the processor to every hit and build the response.
///
/// Hit ids and scores are kept alongside the processed data; suppressed
/// hits are dropped and counted.
fn assemble_response(
    result_set: &ResultSetProcessor,
    raw: RawSearchResults,
    query: &QueryContext,
    requester: &Requester,
) -> SearchResponse {
    let (hit_meta, records): (Vec<(String, f64)>, Vec<ResultRecord>) = raw
        .results
        .into_iter()
        .map(|hit| ((hit.id, hit.score), hit.data))
        .unzip();

    let outcomes = result_set.process_outcomes(records, query, requester);

    let mut results = Vec::with_capacity(outcomes.len());
    let mut access_denied_count = 0;
    for ((id, score), outcome) in hit_meta.into_iter().zip(outcomes) {
        match outcome.into_record() {
            Some(data) => results.push(SearchHit { id, score, data }),
            None => access_denied_count += 1,
        }
    }

    SearchResponse {
        total: raw.total.saturating_sub(access_denied_count),
        max_score: raw.max_score,
        results,
        access_denied_count,
    }
}
