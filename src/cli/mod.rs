//! The Crucible command-line interface.
//!
//! Assembles the run in strict dependency order — Configuration → Archive →
//! Log → Platform → App — then drives `iterate` until no work remains. Only
//! setup failures reach this boundary; they are rendered as diagnostics on
//! stderr and become a nonzero exit status. Individual case outcomes live
//! exclusively in the test log and never affect the exit code.

use std::process::ExitCode;

use clap::Parser;

use crate::app::App;
use crate::archive::Archive;
use crate::cli::args::HarnessArgs;
use crate::cli::output::{QuietSink, SharedOutput, StdoutSink};
use crate::errors::HarnessError;
use crate::platform;
use crate::testlog::TestLog;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    let args = HarnessArgs::parse();
    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let report = miette::Report::new(error);
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}

fn execute(args: HarnessArgs) -> Result<(), HarnessError> {
    let config = args.into_config()?;
    let console = if config.quiet {
        SharedOutput::new(QuietSink)
    } else {
        SharedOutput::new(StdoutSink::new())
    };

    let archive = Archive::open(&config.archive_dir)?;
    let mut log = TestLog::create(&config.log_file, config.log_format)?;
    let platform = platform::create_platform(config.driver);
    {
        let mut app = App::new(platform.as_ref(), &archive, &mut log, &config, console)?;
        while app.iterate() {}
    }
    log.finish()
}
