//! Setup-level error types for the harness.
//!
//! Only failures that occur before or outside test-case execution live here:
//! configuration problems, archive and log construction, and driver loading.
//! These are the errors that may reach the process boundary and turn into a
//! nonzero exit status. Anything that goes wrong *while a case is running* is
//! absorbed at the `App` boundary and recorded as a case outcome instead; see
//! `cases::CaseError`.

use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all harness setup failure modes.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(crucible::config),
        help("run with --help for the accepted options and their values")
    )]
    Config { message: String },

    #[error("invalid case filter pattern '{pattern}': {reason}")]
    #[diagnostic(
        code(crucible::config::pattern),
        help("patterns use '*' (any run of characters) and '?' (one character); ',' separates alternatives")
    )]
    Pattern { pattern: String, reason: String },

    #[error("archive directory '{path}' is not usable")]
    #[diagnostic(code(crucible::archive))]
    Archive {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open test log '{path}'")]
    #[diagnostic(code(crucible::log))]
    Log {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed writing to the test log")]
    #[diagnostic(code(crucible::log::write))]
    LogWrite {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load driver library: {reason}")]
    #[diagnostic(
        code(crucible::driver::load),
        help("pass --deqp-gl-library=<path> to name the library explicitly, or select --deqp-gl-driver=null")
    )]
    DriverLoad { reason: String },

    #[error("no '{family}' driver can be instantiated by this platform")]
    #[diagnostic(
        code(crucible::driver::unavailable),
        help("install a system driver, name one with --deqp-gl-library=<path>, or select --deqp-gl-driver=null")
    )]
    DriverUnavailable { family: String },
}
