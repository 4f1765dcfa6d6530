//! Command-line arguments for the harness binary.
//!
//! Uses `clap` with its "derive" feature; the option names follow the
//! conventional `--deqp-*` surface so existing runner scripts keep working.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, DriverKind, LogFormat, RunMode, SurfaceConfig, SurfaceType};
use crate::errors::HarnessError;

#[derive(Debug, Parser)]
#[command(
    name = "crucible",
    version,
    about = "A minimal conformance-test harness for OpenGL ES 2.0."
)]
pub struct HarnessArgs {
    /// Wildcard pattern selecting which cases to run.
    #[arg(long = "deqp-case", value_name = "PATTERN")]
    pub case: Option<String>,

    /// Execute cases, or emit the case hierarchy as a list.
    #[arg(long = "deqp-runmode", value_enum, default_value = "execute")]
    pub runmode: RunMode,

    /// Destination file for the test log.
    #[arg(long = "deqp-log-file", value_name = "PATH", default_value = "TestResults.qpa")]
    pub log_file: PathBuf,

    /// Encoding of the test log.
    #[arg(long = "deqp-log-format", value_enum, default_value = "xml")]
    pub log_format: LogFormat,

    /// Suppress console output; the log is unaffected.
    #[arg(long = "deqp-quiet")]
    pub quiet: bool,

    /// Root directory for test-input resources.
    #[arg(long = "deqp-archive-dir", value_name = "DIR", default_value = ".")]
    pub archive_dir: PathBuf,

    /// Kind of rendering surface the run is configured for.
    #[arg(long = "deqp-surface-type", value_enum, default_value = "window")]
    pub surface_type: SurfaceType,

    #[arg(
        long = "deqp-surface-width",
        value_name = "PIXELS",
        default_value_t = 256,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub surface_width: u32,

    #[arg(
        long = "deqp-surface-height",
        value_name = "PIXELS",
        default_value_t = 256,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub surface_height: u32,

    /// Driver backend to bind.
    #[arg(long = "deqp-gl-driver", value_enum, default_value = "null")]
    pub gl_driver: DriverKind,

    /// Explicit path to the GLES2 library (system driver only).
    #[arg(long = "deqp-gl-library", value_name = "PATH")]
    pub gl_library: Option<PathBuf>,

    /// Apply the case filter in caselist mode as well.
    #[arg(long = "deqp-caselist-filter")]
    pub caselist_filter: bool,
}

impl HarnessArgs {
    /// Converts parsed arguments into the validated, immutable run
    /// configuration.
    pub fn into_config(self) -> Result<Config, HarnessError> {
        let config = Config {
            case_filter: self.case,
            run_mode: self.runmode,
            log_file: self.log_file,
            log_format: self.log_format,
            quiet: self.quiet,
            archive_dir: self.archive_dir,
            surface: SurfaceConfig {
                kind: self.surface_type,
                width: self.surface_width,
                height: self.surface_height,
            },
            driver: self.gl_driver,
            gl_library: self.gl_library,
            caselist_filter: self.caselist_filter,
        };
        config.validate()?;
        Ok(config)
    }
}
