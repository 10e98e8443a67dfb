//! Highlighted excerpt around the searched phrase.
//!
//! Looks through the text of a result for the phrase the requester searched
//! for and exposes a short window of that text as `excerpt`, with every
//! occurrence of the phrase wrapped in a highlight span.

use super::content;
use crate::error::{ProcessorError, Result};
use crate::traits::{ProcessorType, ResultProcessor};
use regex::{Regex, RegexBuilder};
use search_types::{QueryContext, ResultRecord};
use serde_json::{json, Value};

/// Target excerpt length, in bytes of source text.
pub const DESIRED_EXCERPT_LENGTH: usize = 100;

pub const ELLIPSIS: &str = "<span class=\"search-results-ellipsis\"></span>";

const HIGHLIGHT: &str = "<span class=\"search-results-item\">$0</span>";

const PROPERTIES: &[&str] = &["excerpt"];

pub struct MatchExcerptProcessor<'a> {
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
}

impl<'a> MatchExcerptProcessor<'a> {
    pub fn new(record: &'a mut ResultRecord, query: &'a QueryContext) -> Self {
        Self { record, query }
    }

    /// String values of the record: top level first, then `content`.
    fn texts(&self) -> impl Iterator<Item = &str> {
        let top_level = self.record().values();
        let nested = content(self.record()).into_iter().flat_map(|content| content.values());
        top_level.chain(nested).filter_map(Value::as_str)
    }

    fn excerpt(&self) -> Result<Value> {
        let phrase = match self.query().match_phrase() {
            Some(phrase) => phrase,
            None => return Ok(Value::Null),
        };

        let matcher = phrase_matcher(phrase)?;
        for text in self.texts() {
            if let Some(found) = matcher.find(text) {
                return Ok(json!(build_excerpt(&matcher, text, found.start(), found.end())));
            }
        }
        Ok(Value::Null)
    }
}

fn phrase_matcher(phrase: &str) -> Result<Regex> {
    RegexBuilder::new(&regex::escape(phrase))
        .case_insensitive(true)
        .build()
        .map_err(|err| ProcessorError::Property {
            name: "excerpt".to_string(),
            reason: err.to_string(),
        })
}

/// Cut a window of about `DESIRED_EXCERPT_LENGTH` around the first match
/// and highlight every match inside it.
fn build_excerpt(matcher: &Regex, text: &str, match_start: usize, match_end: usize) -> String {
    if text.len() <= DESIRED_EXCERPT_LENGTH {
        return matcher.replace_all(text, HIGHLIGHT).into_owned();
    }

    let padding = DESIRED_EXCERPT_LENGTH.saturating_sub(match_end - match_start) / 2;
    let mut start = floor_char_boundary(text, match_start.saturating_sub(padding));
    let end = floor_char_boundary(text, (start + DESIRED_EXCERPT_LENGTH).min(text.len()));
    if end == text.len() {
        // Match near the tail: pull the window back so it keeps its length
        start = floor_char_boundary(text, end - DESIRED_EXCERPT_LENGTH).min(match_start);
    }
    let end = end.max(match_end.min(text.len()));

    let mut excerpt = String::new();
    if start > 0 {
        excerpt.push_str(ELLIPSIS);
    }
    excerpt.push_str(&matcher.replace_all(&text[start..end], HIGHLIGHT));
    if end < text.len() {
        excerpt.push_str(ELLIPSIS);
    }
    excerpt
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

impl ResultProcessor for MatchExcerptProcessor<'_> {
    fn name(&self) -> &'static str {
        "MatchExcerptProcessor"
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

    fn property_names(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn compute_property(&self, name: &str) -> Result<Value> {
        match name {
            "excerpt" => self.excerpt(),
            other => Err(ProcessorError::UnknownProperty {
                name: other.to_string(),
            }),
        }
    }
}

fn construct<'a>(
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
) -> Box<dyn ResultProcessor + 'a> {
    Box::new(MatchExcerptProcessor::new(record, query))
}

pub const MATCH_EXCERPT_PROCESSOR: ProcessorType =
    ProcessorType::new("MatchExcerptProcessor", construct);
