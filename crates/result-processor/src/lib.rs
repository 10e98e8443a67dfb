//! Post-processing of course discovery search results.
//!
//! This crate provides:
//! - The `ResultProcessor` trait every processor variant implements
//! - `ProcessorRegistry` for resolving a configured variant by dotted path
//! - `ResultPostProcessor`, the per-result entry point
//! - `ResultSetProcessor` for running the entry point over a result set
//! - A base variant and a few ready-made application variants
//!
//! ## Architecture
//! Each search result is processed on its own:
//! 1. The configured variant is constructed around the record
//! 2. Its visibility check decides whether the requester may see it
//! 3. Its computed properties are added to the record
//! 4. Any failure suppresses that one record and is logged
//!
//! ## Example Usage
//! ```ignore
//! use result_processor::{ProcessorRegistry, ResultPostProcessor};
//! use search_types::{QueryContext, Requester, Settings};
//!
//! // Resolve the configured variant once
//! let registry = ProcessorRegistry::with_builtin();
//! let post_processor = ResultPostProcessor::from_settings(&registry, &settings)?;
//!
//! // Then process every raw result
//! if let Some(record) = post_processor.process_result(record, &query, &requester) {
//!     results.push(record);
//! }
//! ```

pub mod error;
pub mod processing;
pub mod resolver;
pub mod result_set;
pub mod traits;
pub mod variants;

// Re-export main types
pub use error::{ProcessorError, ResolutionError};
pub use processing::{process_result, ProcessOutcome, ResultPostProcessor, SuppressionReason};
pub use resolver::{split_reference, ProcessorRegistry};
pub use result_set::{ProcessedResults, ResultSetProcessor};
pub use traits::{ProcessorConstructor, ProcessorType, ResultProcessor};
