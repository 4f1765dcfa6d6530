//! The built-in conformance case hierarchy.
//!
//! Cases are plain functions over a [`CaseContext`] and are registered into
//! a [`CaseRegistry`] in a fixed order; the registry is the single source of
//! truth for what exists and in which sequence it runs. Group registration
//! order, not name sorting, defines the traversal, so re-running the
//! harness always visits cases identically.
//!
//! A case reports its verdict through [`CaseStatus`] and signals faults by
//! returning a [`CaseError`]; the iteration engine converts either into
//! exactly one log record. Nothing a case does can abort the run.

use thiserror::Error;

use crate::archive::Archive;
use crate::config::Config;
use crate::platform::{DriverCallError, FunctionLibrary, GlDriver, Library};
use crate::testlog::{Outcome, SubResult};

pub mod capability;
pub mod info;
pub mod shaders;

/// Root of every case name in the hierarchy.
pub const CASE_ROOT: &str = "dEQP-GLES2";

pub type CaseFn = fn(&mut CaseContext<'_>) -> Result<CaseStatus, CaseError>;

/// One registered case: its full dotted name and its body.
pub struct CaseDef {
    pub name: String,
    pub run: CaseFn,
}

/// Ordered collection of cases. Registration order is execution order.
#[derive(Default)]
pub struct CaseRegistry {
    cases: Vec<CaseDef>,
}

impl CaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, run: CaseFn) {
        self.cases.push(CaseDef {
            name: name.into(),
            run,
        });
    }

    pub fn cases(&self) -> &[CaseDef] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Builds the full built-in hierarchy, group by group.
pub fn build_default_case_registry() -> CaseRegistry {
    let mut registry = CaseRegistry::new();
    info::register(&mut registry);
    capability::register(&mut registry);
    shaders::register(&mut registry);
    registry
}

/// A case's own verdict, for cases that ran to completion.
#[derive(Debug, Clone)]
pub struct CaseStatus {
    pub outcome: Outcome,
    pub description: String,
}

impl CaseStatus {
    pub fn pass(description: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Pass,
            description: description.into(),
        }
    }

    pub fn fail(description: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Fail,
            description: description.into(),
        }
    }

    pub fn quality_warning(description: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::QualityWarning,
            description: description.into(),
        }
    }

    pub fn compatibility_warning(description: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::CompatibilityWarning,
            description: description.into(),
        }
    }
}

/// Classified fault raised while a case executes.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error("resource '{path}' unavailable: {reason}")]
    Resource { path: String, reason: String },
    #[error(transparent)]
    Driver(DriverCallError),
    #[error("not supported: {0}")]
    Unsupported(String),
    #[error("internal fault: {0}")]
    Internal(String),
}

impl CaseError {
    /// The outcome this fault is recorded as.
    pub fn outcome(&self) -> Outcome {
        match self {
            CaseError::Resource { .. } => Outcome::ResourceError,
            CaseError::Driver(_) => Outcome::Fail,
            CaseError::Unsupported(_) => Outcome::NotSupported,
            CaseError::Internal(_) => Outcome::InternalError,
        }
    }
}

impl From<DriverCallError> for CaseError {
    fn from(error: DriverCallError) -> Self {
        match error {
            DriverCallError::Unsupported(what) => CaseError::Unsupported(what),
            call => CaseError::Driver(call),
        }
    }
}

/// Everything a case may touch while running.
pub struct CaseContext<'a> {
    library: &'a dyn Library,
    archive: &'a Archive,
    config: &'a Config,
    messages: Vec<String>,
    numbers: Vec<SubResult>,
}

impl<'a> CaseContext<'a> {
    pub fn new(library: &'a dyn Library, archive: &'a Archive, config: &'a Config) -> Self {
        Self {
            library,
            archive,
            config,
            messages: Vec::new(),
            numbers: Vec::new(),
        }
    }

    /// The typed driver interface, when the active library exposes one.
    pub fn driver(&self) -> Result<&'a dyn GlDriver, CaseError> {
        self.library
            .driver()
            .ok_or_else(|| CaseError::Unsupported("driver interface".to_string()))
    }

    pub fn functions(&self) -> &'a dyn FunctionLibrary {
        self.library.function_library()
    }

    pub fn archive(&self) -> &'a Archive {
        self.archive
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Reads a text resource, mapping any failure to a resource fault.
    pub fn read_text_resource(&self, relative: &str) -> Result<String, CaseError> {
        self.archive
            .read_text(relative)
            .map_err(|e| CaseError::Resource {
                path: relative.to_string(),
                reason: e.to_string(),
            })
    }

    /// Appends a free-text line to the case's log record.
    pub fn message(&mut self, text: impl Into<String>) {
        self.messages.push(text.into());
    }

    /// Attaches a named numeric sub-result to the case's log record.
    pub fn report_number(&mut self, name: &str, value: f64) {
        self.numbers.push(SubResult {
            name: name.to_string(),
            value,
        });
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<SubResult>) {
        (self.messages, self.numbers)
    }
}
