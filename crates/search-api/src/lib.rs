//! Search API crate for course discovery.
//!
//! This crate contains the handler that runs a query against the search
//! backend and post-processes the hits before they are returned.

pub mod backend;
pub mod handler;

pub use backend::{InMemoryBackend, RawSearchResults, SearchBackend, SearchHit, SearchRequest};
pub use handler::{CourseDiscoverySearch, SearchResponse};
