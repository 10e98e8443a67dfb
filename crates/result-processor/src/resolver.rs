//! Resolving a configured processor reference to a `ProcessorType`.
//!
//! A reference is a dotted path such as
//! `"course_discovery.variants.EnrollmentGateProcessor"`: everything before
//! the last dot names a module, the final segment names a processor inside
//! it. Modules only exist once an application registers processors under
//! them, so the set of resolvable references is fixed when the registry is
//! built.

use crate::error::ResolutionError;
use crate::traits::ProcessorType;
use crate::variants;
use std::collections::BTreeMap;

/// Typed registry of processor variants, keyed by module path and name.
///
/// ## Usage
/// ```ignore
/// let registry = ProcessorRegistry::with_builtin()
///     .register("myapp.search", "EntitlementProcessor", ENTITLEMENT_PROCESSOR);
///
/// let processor_type = registry.resolve(
///     settings.result_processor(),
///     variants::COURSE_DISCOVERY_RESULT_PROCESSOR,
/// )?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProcessorRegistry {
    modules: BTreeMap<String, BTreeMap<String, ProcessorType>>,
}

impl ProcessorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            modules: BTreeMap::new(),
        }
    }

    /// A registry holding the base processor and the bundled variants.
    pub fn with_builtin() -> Self {
        Self::new()
            .register(
                variants::BASE_MODULE,
                "CourseDiscoveryResultProcessor",
                variants::COURSE_DISCOVERY_RESULT_PROCESSOR,
            )
            .register(
                variants::VARIANTS_MODULE,
                "EnrollmentGateProcessor",
                variants::ENROLLMENT_GATE_PROCESSOR,
            )
            .register(
                variants::VARIANTS_MODULE,
                "CourseCardProcessor",
                variants::COURSE_CARD_PROCESSOR,
            )
            .register(
                variants::VARIANTS_MODULE,
                "MatchExcerptProcessor",
                variants::MATCH_EXCERPT_PROCESSOR,
            )
    }

    /// Register a processor under `module` (builder pattern).
    ///
    /// Registering the same name twice replaces the earlier entry.
    pub fn register(
        mut self,
        module: impl Into<String>,
        name: impl Into<String>,
        processor: ProcessorType,
    ) -> Self {
        let module = module.into();
        let name = name.into();
        let previous = self
            .modules
            .entry(module.clone())
            .or_default()
            .insert(name.clone(), processor);

        if previous.is_some() {
            tracing::warn!("Processor {}.{} registered twice, keeping the latest", module, name);
        }
        self
    }

    /// Register a processor under a full dotted path.
    pub fn register_path(
        self,
        path: &str,
        processor: ProcessorType,
    ) -> Result<Self, ResolutionError> {
        let (module, name) = split_reference(path)?;
        Ok(self.register(module, name, processor))
    }

    /// Resolve a reference to a processor type.
    ///
    /// ## Algorithm
    /// 1. Absent or blank reference: return `default`
    /// 2. Split at the last `.` into module path and name
    /// 3. Look up the module; unknown modules are an error, never a fallback
    /// 4. Look up the name inside the module
    pub fn resolve(
        &self,
        reference: Option<&str>,
        default: ProcessorType,
    ) -> Result<ProcessorType, ResolutionError> {
        let reference = match reference.map(str::trim) {
            None | Some("") => return Ok(default),
            Some(reference) => reference,
        };

        let (module, name) = split_reference(reference)?;

        let processors =
            self.modules
                .get(module)
                .ok_or_else(|| ResolutionError::ModuleNotFound {
                    module: module.to_string(),
                    reference: reference.to_string(),
                })?;

        processors
            .get(name)
            .copied()
            .ok_or_else(|| ResolutionError::AttributeNotFound {
                module: module.to_string(),
                name: name.to_string(),
            })
    }

    /// Every registered dotted path with its processor, sorted by path.
    pub fn entries(&self) -> Vec<(String, ProcessorType)> {
        self.modules
            .iter()
            .flat_map(|(module, processors)| {
                processors
                    .iter()
                    .map(move |(name, processor)| (format!("{module}.{name}"), *processor))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.modules.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split `"<module.path>.<Name>"` into its module path and name.
pub fn split_reference(reference: &str) -> Result<(&str, &str), ResolutionError> {
    match reference.rsplit_once('.') {
        Some((module, name)) if !module.is_empty() && !name.is_empty() => Ok((module, name)),
        _ => Err(ResolutionError::MalformedReference {
            reference: reference.to_string(),
        }),
    }
}
