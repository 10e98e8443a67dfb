//! # Search Types Crate
//!
//! Shared vocabulary for course discovery result processing.
//!
//! ## Main Components
//!
//! - **types**: Result Record, Query Context and Requester
//! - **loader**: Read result sets from JSON / JSON-lines files
//! - **settings**: Processor selection and feature flags
//! - **error**: Error types for loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use search_types::{load_result_set, QueryContext, Requester, Settings};
//! use std::path::Path;
//!
//! let settings = Settings::load_from_file(Path::new("settings.json"))?.with_env_overrides();
//! let records = load_result_set(Path::new("demos/courses.jsonl"))?;
//! let query = QueryContext::new("python");
//! let requester = Requester::user("learner");
//! ```

pub mod error;
pub mod loader;
pub mod settings;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{LoadError, Result};
pub use loader::{load_result_set, parse_result_set};
pub use settings::{Settings, ENABLE_TAXOMAN, RESULT_PROCESSOR_ENV};
pub use types::{CourseId, QueryContext, Requester, ResultRecord};
