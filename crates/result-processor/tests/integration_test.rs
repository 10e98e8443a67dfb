//! Integration tests for result processing.
//!
//! These tests play the part of a hosting application: they define their
//! own processor variants, register them, select them through settings and
//! check what the entry point does with each record.

use result_processor::variants::{COURSE_CARD_PROCESSOR, COURSE_DISCOVERY_RESULT_PROCESSOR};
use result_processor::{
    ProcessorError, ProcessorRegistry, ProcessorType, ResolutionError, ResultPostProcessor,
    ResultProcessor,
};
use search_types::{QueryContext, Requester, ResultRecord, Settings};
use serde_json::{json, Value};
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Application-defined variants
// ============================================================================

static GATED_ENRICHMENT_CALLS: AtomicUsize = AtomicUsize::new(0);

/// Hides every result from "anon" and counts enrichment attempts.
struct AnonGate<'a> {
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
}

impl ResultProcessor for AnonGate<'_> {
    fn name(&self) -> &'static str {
        "AnonGate"
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
    fn should_remove(&self, requester: &Requester) -> result_processor::error::Result<bool> {
        Ok(requester.username.as_deref() == Some("anon"))
    }
    fn add_properties(&mut self) -> result_processor::error::Result<()> {
        GATED_ENRICHMENT_CALLS.fetch_add(1, Ordering::SeqCst);
        Err(ProcessorError::Property {
            name: "gate".to_string(),
            reason: "enrichment must not run for removed records".to_string(),
        })
    }
}

fn anon_gate<'a>(
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
) -> Box<dyn ResultProcessor + 'a> {
    Box::new(AnonGate { record, query })
}

const ANON_GATE: ProcessorType = ProcessorType::new("AnonGate", anon_gate);

/// Declares a single `price` property that always fails.
struct BrokenPrice<'a> {
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
}

impl ResultProcessor for BrokenPrice<'_> {
    fn name(&self) -> &'static str {
        "BrokenPrice"
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
        &["price"]
    }
    fn compute_property(&self, name: &str) -> result_processor::error::Result<Value> {
        Err(ProcessorError::Property {
            name: name.to_string(),
            reason: "price service unavailable".to_string(),
        })
    }
}

fn broken_price<'a>(
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
) -> Box<dyn ResultProcessor + 'a> {
    Box::new(BrokenPrice { record, query })
}

const BROKEN_PRICE: ProcessorType = ProcessorType::new("BrokenPrice", broken_price);

/// Cannot reach its entitlement service, so never decides on visibility.
struct OfflineEntitlements<'a> {
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
}

impl ResultProcessor for OfflineEntitlements<'_> {
    fn name(&self) -> &'static str {
        "OfflineEntitlements"
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
    fn should_remove(&self, _requester: &Requester) -> result_processor::error::Result<bool> {
        Err(ProcessorError::Visibility("entitlement service unreachable".to_string()))
    }
}

fn offline_entitlements<'a>(
    record: &'a mut ResultRecord,
    query: &'a QueryContext,
) -> Box<dyn ResultProcessor + 'a> {
    Box::new(OfflineEntitlements { record, query })
}

const OFFLINE_ENTITLEMENTS: ProcessorType =
    ProcessorType::new("OfflineEntitlements", offline_entitlements);

// ============================================================================
// Test Fixtures
// ============================================================================

fn app_registry() -> ProcessorRegistry {
    ProcessorRegistry::with_builtin()
        .register("myapp.search", "AnonGate", ANON_GATE)
        .register("myapp.search", "BrokenPrice", BROKEN_PRICE)
        .register("myapp.search", "OfflineEntitlements", OFFLINE_ENTITLEMENTS)
}

fn post_processor_for(reference: &str) -> ResultPostProcessor {
    let settings = Settings::default().with_result_processor(reference);
    ResultPostProcessor::from_settings(&app_registry(), &settings).unwrap()
}

fn intro_course() -> ResultRecord {
    match json!({"id": "course-1", "title": "Intro"}) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Collects everything the fmt subscriber writes.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::ERROR)
        .finish();

    let output = tracing::subscriber::with_default(subscriber, f);
    (output, logs.contents())
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_configured_variant_is_used() {
    let post_processor = post_processor_for("myapp.search.AnonGate");
    assert_eq!(post_processor.processor_type().name(), "AnonGate");

    let result = post_processor.process_result(
        intro_course(),
        &QueryContext::new("intro"),
        &Requester::user("anon"),
    );
    assert!(result.is_none());
}

#[test]
fn test_absent_reference_behaves_as_base() {
    let post_processor =
        ResultPostProcessor::from_settings(&app_registry(), &Settings::default()).unwrap();
    assert_eq!(
        post_processor.processor_type().name(),
        COURSE_DISCOVERY_RESULT_PROCESSOR.name()
    );

    for requester in [Requester::anonymous(), Requester::user("anon"), Requester::staff("admin")] {
        let result = post_processor
            .process_result(intro_course(), &QueryContext::new("intro"), &requester)
            .unwrap();
        assert_eq!(result, intro_course());
    }
}

#[test]
fn test_removed_record_skips_enrichment() {
    let post_processor = post_processor_for("myapp.search.AnonGate");
    let before = GATED_ENRICHMENT_CALLS.load(Ordering::SeqCst);

    let result = post_processor.process_result(
        intro_course(),
        &QueryContext::empty(),
        &Requester::user("anon"),
    );

    assert!(result.is_none());
    assert_eq!(GATED_ENRICHMENT_CALLS.load(Ordering::SeqCst), before);
}

#[test]
fn test_enrichment_failure_is_logged_once_and_suppressed() {
    let post_processor = post_processor_for("myapp.search.BrokenPrice");

    let (result, logs) = with_captured_logs(|| {
        post_processor.process_result(intro_course(), &QueryContext::empty(), &Requester::anonymous())
    });

    assert!(result.is_none());
    let entries: Vec<&str> = logs
        .lines()
        .filter(|line| line.contains("will remove from results"))
        .collect();
    assert_eq!(entries.len(), 1, "expected exactly one log entry, got: {logs}");
    assert!(entries[0].contains(r#"{"id":"course-1","title":"Intro"}"#));
    assert!(entries[0].contains("price service unavailable"));
}

#[test]
fn test_visibility_failure_is_logged_once_and_suppressed() {
    let post_processor = post_processor_for("myapp.search.OfflineEntitlements");

    let (result, logs) = with_captured_logs(|| {
        post_processor.process_result(intro_course(), &QueryContext::empty(), &Requester::user("learner"))
    });

    assert!(result.is_none());
    let entries: Vec<&str> = logs
        .lines()
        .filter(|line| line.contains("will remove from results"))
        .collect();
    assert_eq!(entries.len(), 1, "expected exactly one log entry, got: {logs}");
    assert!(entries[0].contains("ERROR"));
    assert!(entries[0].contains("error checking visibility"));
    assert!(entries[0].contains(r#"{"id":"course-1","title":"Intro"}"#));
    assert!(entries[0].contains("entitlement service unreachable"));
}

#[test]
fn test_successful_enrichment_matches_independent_computation() {
    let post_processor = ResultPostProcessor::new(COURSE_CARD_PROCESSOR);
    let query = QueryContext::empty();
    let mut input = intro_course();
    input.insert("org".to_string(), json!("edX"));
    input.insert("start".to_string(), json!("2015-09-01T00:00:00Z"));

    let mut reference = input.clone();
    let expected: Vec<(&str, Value)> = {
        let processor = COURSE_CARD_PROCESSOR.construct(&mut reference, &query);
        processor
            .property_names()
            .iter()
            .map(|name| (*name, processor.compute_property(name).unwrap()))
            .collect()
    };

    let output = post_processor
        .process_result(input, &query, &Requester::anonymous())
        .unwrap();

    assert_eq!(expected.len(), 3);
    for (name, value) in expected {
        assert_eq!(output[name], value, "property {name}");
    }
}

#[test]
fn test_processing_is_idempotent() {
    let post_processor = ResultPostProcessor::new(COURSE_CARD_PROCESSOR);
    let query = QueryContext::new("intro");
    let requester = Requester::user("learner");
    let mut input = intro_course();
    input.insert("org".to_string(), json!("edX"));

    let first = post_processor.process_result(input.clone(), &query, &requester);
    let second = post_processor.process_result(input, &query, &requester);
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn test_misconfigured_reference_fails_before_processing() {
    let settings = Settings::default().with_result_processor("nonexistent_module.Processor");

    let err = ResultPostProcessor::from_settings(&app_registry(), &settings).unwrap_err();
    assert!(matches!(err, ResolutionError::ModuleNotFound { ref module, .. } if module == "nonexistent_module"));
}
