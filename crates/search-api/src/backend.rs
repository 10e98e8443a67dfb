//! The search engine collaborator.
//!
//! The handler only needs something that turns a request into raw hits.
//! `InMemoryBackend` serves a fixed result set and is what the CLI and the
//! tests use; a real deployment plugs its index client in behind the same
//! trait.

use anyhow::{Context, Result};
use search_types::{load_result_set, QueryContext, ResultRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Default page size when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// A course discovery query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub search_phrase: Option<String>,
    pub size: usize,
    pub from: usize,
}

impl SearchRequest {
    /// Search for a phrase, first page.
    pub fn new(search_phrase: impl Into<String>) -> Self {
        Self {
            search_phrase: Some(search_phrase.into()),
            ..Self::browse()
        }
    }

    /// No phrase: every course, first page.
    pub fn browse() -> Self {
        Self {
            search_phrase: None,
            size: DEFAULT_PAGE_SIZE,
            from: 0,
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_from(mut self, from: usize) -> Self {
        self.from = from;
        self
    }

    /// The context handed to the result processor for every hit.
    pub fn query_context(&self) -> QueryContext {
        QueryContext {
            match_phrase: self.search_phrase.clone(),
        }
    }
}

/// One hit as returned by the search engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    pub score: f64,
    pub data: ResultRecord,
}

/// A page of raw hits before post-processing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSearchResults {
    /// Number of matching documents, across all pages
    pub total: usize,
    pub max_score: Option<f64>,
    pub results: Vec<SearchHit>,
}

/// Interface to the external search engine.
///
/// Synchronous; the handler runs it on the blocking pool.
pub trait SearchBackend: Send + Sync {
    /// Returns the name of this backend (for logging/debugging)
    fn name(&self) -> &str;

    fn search(&self, request: &SearchRequest) -> Result<RawSearchResults>;
}

/// Serves a fixed result set.
///
/// A record matches when its JSON text contains the search phrase,
/// case-insensitively. Every match scores 1.0 and keeps its position in the
/// result set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    records: Arc<Vec<ResultRecord>>,
}

impl InMemoryBackend {
    pub fn new(records: Vec<ResultRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    /// Load the result set from a JSON or JSON-lines file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let records = load_result_set(path)
            .with_context(|| format!("Failed to load result set from {}", path.display()))?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn matches(record: &ResultRecord, phrase: Option<&str>) -> Result<bool> {
        let phrase = match phrase {
            Some(phrase) => phrase.to_lowercase(),
            None => return Ok(true),
        };
        let text = serde_json::to_string(record).context("Failed to serialize record")?;
        Ok(text.to_lowercase().contains(&phrase))
    }
}

impl SearchBackend for InMemoryBackend {
    fn name(&self) -> &str {
        "InMemoryBackend"
    }

    fn search(&self, request: &SearchRequest) -> Result<RawSearchResults> {
        let query = request.query_context();
        let phrase = query.match_phrase();

        let mut matching = Vec::new();
        for (position, record) in self.records.iter().enumerate() {
            if Self::matches(record, phrase)? {
                matching.push((position, record));
            }
        }

        let total = matching.len();
        let results: Vec<SearchHit> = matching
            .into_iter()
            .skip(request.from)
            .take(request.size)
            .map(|(position, record)| SearchHit {
                id: document_id(record, position),
                score: 1.0,
                data: record.clone(),
            })
            .collect();

        let max_score = if results.is_empty() { None } else { Some(1.0) };
        Ok(RawSearchResults {
            total,
            max_score,
            results,
        })
    }
}

/// The record's `id`, or its position when it has none.
fn document_id(record: &ResultRecord, position: usize) -> String {
    match record.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => position.to_string(),
    }
}
