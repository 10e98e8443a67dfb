//! Application settings consumed by the result processor.
//!
//! Settings come from a JSON document. Keys may be written either in
//! snake_case or in the upper-case form used by the hosting application's
//! settings module:
//!
//! ```json
//! {
//!   "COURSE_DISCOVERY_SEARCH_RESULT_PROCESSOR": "course_discovery.variants.EnrollmentGateProcessor",
//!   "FEATURES": { "ENABLE_TAXOMAN": true, "PREVIEW_LMS_BASE": "preview.example.com" }
//! }
//! ```
//!
//! A document must use one spelling per key; giving both is rejected.
//! The feature map is shared with the host, so values that are not booleans
//! are kept but read as "off".

use crate::error::{LoadError, Result};
use crate::loader::read_to_string;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable that overrides the configured processor reference.
pub const RESULT_PROCESSOR_ENV: &str = "COURSE_DISCOVERY_SEARCH_RESULT_PROCESSOR";

/// Feature flag enabling taxonomy-managed facets.
pub const ENABLE_TAXOMAN: &str = "ENABLE_TAXOMAN";

/// Upper-case spelling of each settings key, paired with its field name.
const KEY_SPELLINGS: [(&str, &str); 2] = [
    (
        "course_discovery_search_result_processor",
        "COURSE_DISCOVERY_SEARCH_RESULT_PROCESSOR",
    ),
    ("features", "FEATURES"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dotted path of the processor variant, e.g. `"myapp.search.EntitlementProcessor"`
    #[serde(alias = "COURSE_DISCOVERY_SEARCH_RESULT_PROCESSOR")]
    pub course_discovery_search_result_processor: Option<String>,

    /// Host feature map; only boolean entries count as flags
    #[serde(alias = "FEATURES")]
    pub features: BTreeMap<String, Value>,
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = read_to_string(path)?;
        Self::from_json_str(&content, &path.display().to_string())
    }

    /// Parse settings from a JSON string; `source` labels errors.
    pub fn from_json_str(content: &str, source: &str) -> Result<Self> {
        let invalid = |reason: String| LoadError::InvalidSettings {
            file: source.to_string(),
            reason,
        };

        let document: Value = serde_json::from_str(content).map_err(|err| invalid(err.to_string()))?;
        if let Value::Object(keys) = &document {
            for (field, upper) in KEY_SPELLINGS {
                if keys.contains_key(field) && keys.contains_key(upper) {
                    return Err(invalid(format!(
                        "both {field} and {upper} are set; use one spelling"
                    )));
                }
            }
        }

        serde_json::from_value(document).map_err(|err| invalid(err.to_string()))
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(reference) = lookup(RESULT_PROCESSOR_ENV) {
            tracing::debug!("{} overrides configured processor: {}", RESULT_PROCESSOR_ENV, reference);
            self.course_discovery_search_result_processor = Some(reference);
        }
        self
    }

    /// Set the processor reference (builder pattern).
    pub fn with_result_processor(mut self, reference: impl Into<String>) -> Self {
        self.course_discovery_search_result_processor = Some(reference.into());
        self
    }

    /// The configured processor reference; `None` when absent or blank.
    pub fn result_processor(&self) -> Option<&str> {
        self.course_discovery_search_result_processor
            .as_deref()
            .map(str::trim)
            .filter(|reference| !reference.is_empty())
    }

    /// Whether a feature flag is switched on. Unknown flags are off.
    pub fn feature_enabled(&self, flag: &str) -> bool {
        self.features
            .get(flag)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn is_using_taxoman(&self) -> bool {
        self.feature_enabled(ENABLE_TAXOMAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_json_str("{}", "inline").unwrap();
        assert_eq!(settings.result_processor(), None);
        assert!(!settings.is_using_taxoman());
    }

    #[test]
    fn test_upper_case_keys() {
        let settings = Settings::from_json_str(
            r#"{
                "COURSE_DISCOVERY_SEARCH_RESULT_PROCESSOR": "myapp.search.Gate",
                "FEATURES": {"ENABLE_TAXOMAN": true}
            }"#,
            "inline",
        )
        .unwrap();

        assert_eq!(settings.result_processor(), Some("myapp.search.Gate"));
        assert!(settings.is_using_taxoman());
    }

    #[test]
    fn test_blank_reference_is_absent() {
        let settings = Settings::default().with_result_processor("  ");
        assert_eq!(settings.result_processor(), None);
    }

    #[test]
    fn test_env_override() {
        let settings = Settings::default()
            .with_result_processor("myapp.search.Old")
            .with_overrides_from(|key| {
                (key == RESULT_PROCESSOR_ENV).then(|| "myapp.search.New".to_string())
            });
        assert_eq!(settings.result_processor(), Some("myapp.search.New"));

        let untouched = Settings::default()
            .with_result_processor("myapp.search.Old")
            .with_overrides_from(|_| None);
        assert_eq!(untouched.result_processor(), Some("myapp.search.Old"));
    }

    #[test]
    fn test_mixed_value_feature_map() {
        let settings = Settings::from_json_str(
            r#"{
                "COURSE_DISCOVERY_SEARCH_RESULT_PROCESSOR": "myapp.search.Gate",
                "FEATURES": {
                    "ENABLE_TAXOMAN": true,
                    "PREVIEW_LMS_BASE": "preview.example.com",
                    "MAX_ENROLLMENT_INSTR_BUTTONS": 200
                }
            }"#,
            "inline",
        )
        .unwrap();

        assert_eq!(settings.result_processor(), Some("myapp.search.Gate"));
        assert!(settings.is_using_taxoman());
        assert!(!settings.feature_enabled("PREVIEW_LMS_BASE"));
        assert!(!settings.feature_enabled("MAX_ENROLLMENT_INSTR_BUTTONS"));
    }

    #[test]
    fn test_non_bool_taxoman_flag_is_off() {
        let settings =
            Settings::from_json_str(r#"{"FEATURES": {"ENABLE_TAXOMAN": "yes"}}"#, "inline").unwrap();
        assert!(!settings.is_using_taxoman());
    }

    #[test]
    fn test_both_spellings_rejected() {
        let err = Settings::from_json_str(
            r#"{
                "course_discovery_search_result_processor": "myapp.search.A",
                "COURSE_DISCOVERY_SEARCH_RESULT_PROCESSOR": "myapp.search.B"
            }"#,
            "both.json",
        )
        .unwrap_err();

        match err {
            LoadError::InvalidSettings { file, reason } => {
                assert_eq!(file, "both.json");
                assert!(reason.contains("use one spelling"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_settings() {
        let err = Settings::from_json_str(r#"{"FEATURES": []}"#, "bad.json").unwrap_err();
        assert!(matches!(err, LoadError::InvalidSettings { .. }));
    }
}
