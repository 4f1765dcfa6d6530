//! Run configuration.
//!
//! A `Config` is parsed once from the command line at startup and never
//! mutated afterwards; every component receives it by shared reference for
//! the lifetime of the run.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::errors::HarnessError;
use crate::matcher::CaseMatcher;

/// Top-level behavior of a run: execute cases, or enumerate them into a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Execute every matching case and record one result per case.
    Execute,
    /// Write the case hierarchy to the log without executing anything.
    XmlCaselist,
}

/// Rendering target requested for the run.
///
/// The harness itself never creates a surface; the value is handed down to
/// cases that want to sanity-check the requested dimensions against driver
/// limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SurfaceType {
    Window,
    Fbo,
    Pixmap,
}

/// On-disk encoding of the test log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// A single XML batch-result document.
    Xml,
    /// One JSON object per record, newline separated.
    Json,
}

/// Which driver backend the platform factory should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DriverKind {
    /// Self-contained stub driver; needs no GPU, no display, no libraries.
    Null,
    /// An installed system driver, resolved by dynamic symbol lookup.
    System,
}

/// Requested surface kind and dimensions.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceConfig {
    pub kind: SurfaceType,
    pub width: u32,
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            kind: SurfaceType::Window,
            width: 256,
            height: 256,
        }
    }
}

/// Immutable configuration for one harness run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Wildcard filter applied to case names; `None` runs everything.
    pub case_filter: Option<String>,
    pub run_mode: RunMode,
    pub log_file: PathBuf,
    pub log_format: LogFormat,
    /// Suppress all console output without affecting the log.
    pub quiet: bool,
    /// Root directory for test-input resources.
    pub archive_dir: PathBuf,
    pub surface: SurfaceConfig,
    pub driver: DriverKind,
    /// Explicit path to the driver library, overriding the default lookup.
    pub gl_library: Option<PathBuf>,
    /// Whether caselist generation honors `case_filter`. Off by default:
    /// a case list is normally a complete inventory of the hierarchy.
    pub caselist_filter: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            case_filter: None,
            run_mode: RunMode::Execute,
            log_file: PathBuf::from("TestResults.qpa"),
            log_format: LogFormat::Xml,
            quiet: false,
            archive_dir: PathBuf::from("."),
            surface: SurfaceConfig::default(),
            driver: DriverKind::Null,
            gl_library: None,
            caselist_filter: false,
        }
    }
}

impl Config {
    /// Checks the cross-field invariants that `clap` cannot express.
    ///
    /// Invariant: a `Config` handed to the rest of the harness has passed
    /// this check, so downstream code never re-validates.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.surface.width == 0 || self.surface.height == 0 {
            return Err(HarnessError::Config {
                message: format!(
                    "surface dimensions must be positive, got {}x{}",
                    self.surface.width, self.surface.height
                ),
            });
        }
        // Compile the filter now so a bad pattern fails the run before any
        // resources are constructed.
        CaseMatcher::from_filter(self.case_filter.as_deref())?;
        Ok(())
    }
}
