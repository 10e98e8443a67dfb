//! Core domain types for course discovery results.
//!
//! A search hit travels through the processor as a plain JSON object so that
//! whatever fields the index stores survive untouched. The query context and
//! the requester are small value types the processor variants consult when
//! deciding what to do with a hit.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

// =============================================================================
// Type Aliases
// =============================================================================

/// One search-result item as a field mapping, pre-serialization.
///
/// Enrichment writes derived fields straight into this map.
pub type ResultRecord = Map<String, Value>;

/// Identifier of a course run, e.g. `"course-v1:edX+DemoX+Demo_2014"`
pub type CourseId = String;

// =============================================================================
// Query Context
// =============================================================================

/// Context of the query that produced a result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    /// The phrase the requester searched for, if any
    pub match_phrase: Option<String>,
}

impl QueryContext {
    /// Context for a query with the given search phrase.
    pub fn new(match_phrase: impl Into<String>) -> Self {
        Self {
            match_phrase: Some(match_phrase.into()),
        }
    }

    /// Context for a query without a search phrase (browse everything).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The search phrase, trimmed; `None` when absent or blank.
    pub fn match_phrase(&self) -> Option<&str> {
        self.match_phrase
            .as_deref()
            .map(str::trim)
            .filter(|phrase| !phrase.is_empty())
    }
}

// =============================================================================
// Requester
// =============================================================================

/// Who is asking for results.
///
/// Only visibility predicates look at this; the core passes it through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    /// `None` for an unauthenticated requester
    pub username: Option<String>,
    /// Staff can see every course regardless of catalog settings
    pub is_staff: bool,
    /// Course ids this requester is enrolled in
    pub enrolled_courses: BTreeSet<CourseId>,
}

impl Requester {
    /// An unauthenticated requester.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated, non-staff requester.
    pub fn user(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    /// An authenticated staff requester.
    pub fn staff(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            is_staff: true,
            ..Self::default()
        }
    }

    /// Add an enrollment (builder pattern).
    pub fn with_enrollment(mut self, course_id: impl Into<CourseId>) -> Self {
        self.enrolled_courses.insert(course_id.into());
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.username.is_none()
    }

    pub fn is_enrolled_in(&self, course_id: &str) -> bool {
        self.enrolled_courses.contains(course_id)
    }
}
