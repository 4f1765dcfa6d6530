//! The iteration engine.
//!
//! An `App` owns the progress state of one test run and advances it one
//! unit of work per [`App::iterate`] call: one executed case in execute
//! mode, one enumerated identifier in caselist mode. The state machine is
//! `Ready → Running → Done`, with `Failed` reserved for faults the run
//! cannot absorb (a test log that stops accepting writes).
//!
//! Everything that goes wrong *inside* a case — classified faults and
//! panics alike — is captured here and converted into exactly one outcome
//! record; a failing case never aborts the run and never reaches the
//! process boundary.

use std::panic::{self, AssertUnwindSafe};

use crate::archive::Archive;
use crate::cases::{build_default_case_registry, CaseContext, CaseRegistry};
use crate::cli::output::SharedOutput;
use crate::config::{Config, RunMode};
use crate::errors::HarnessError;
use crate::matcher::CaseMatcher;
use crate::platform::{Library, LibraryType, Platform};
use crate::testlog::{CaseRecord, Outcome, TestLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Ready,
    Running,
    Done,
    Failed,
}

/// Running totals over the executed cases.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    pub executed: usize,
    pub passed: usize,
    pub failed: usize,
    pub not_supported: usize,
    pub warnings: usize,
    pub listed: usize,
}

impl RunStats {
    fn count(&mut self, outcome: Outcome) {
        self.executed += 1;
        match outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Fail | Outcome::ResourceError | Outcome::InternalError => self.failed += 1,
            Outcome::NotSupported => self.not_supported += 1,
            Outcome::QualityWarning | Outcome::CompatibilityWarning => self.warnings += 1,
        }
    }
}

pub struct App<'a> {
    archive: &'a Archive,
    log: &'a mut TestLog,
    config: &'a Config,
    console: SharedOutput,
    registry: CaseRegistry,
    matcher: CaseMatcher,
    library: Option<Box<dyn Library>>,
    cursor: usize,
    state: RunState,
    stats: RunStats,
}

impl<'a> App<'a> {
    /// Builds an app over the default case hierarchy.
    ///
    /// The driver library is bound here, so a driver-load failure surfaces
    /// as a setup error before the first `iterate` call. Caselist runs
    /// never touch the driver.
    pub fn new(
        platform: &dyn Platform,
        archive: &'a Archive,
        log: &'a mut TestLog,
        config: &'a Config,
        console: SharedOutput,
    ) -> Result<Self, HarnessError> {
        Self::with_registry(
            platform,
            archive,
            log,
            config,
            console,
            build_default_case_registry(),
        )
    }

    /// Builds an app over an explicit case registry.
    pub fn with_registry(
        platform: &dyn Platform,
        archive: &'a Archive,
        log: &'a mut TestLog,
        config: &'a Config,
        console: SharedOutput,
        registry: CaseRegistry,
    ) -> Result<Self, HarnessError> {
        let matcher = CaseMatcher::from_filter(config.case_filter.as_deref())?;
        let library = match config.run_mode {
            RunMode::Execute => Some(platform.create_library(
                LibraryType::OpenGlEs2,
                config.gl_library.as_deref(),
            )?),
            RunMode::XmlCaselist => None,
        };
        Ok(Self {
            archive,
            log,
            config,
            console,
            registry,
            matcher,
            library,
            cursor: 0,
            state: RunState::Ready,
            stats: RunStats::default(),
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Advances one unit of work; returns whether more remains.
    ///
    /// Returns `false` for the first time on the call that finds the
    /// hierarchy exhausted, and on every call after that.
    pub fn iterate(&mut self) -> bool {
        match self.state {
            RunState::Done | RunState::Failed => return false,
            RunState::Ready => self.state = RunState::Running,
            RunState::Running => {}
        }
        let step = match self.config.run_mode {
            RunMode::Execute => self.execute_next(),
            RunMode::XmlCaselist => self.enumerate_next(),
        };
        match step {
            Ok(true) => true,
            Ok(false) => {
                self.state = RunState::Done;
                false
            }
            Err(error) => {
                self.console.emit(&format!("Aborting run: {error}"));
                self.state = RunState::Failed;
                false
            }
        }
    }

    /// Executes the next case matching the filter. Non-matching cases are
    /// skipped without producing a record.
    fn execute_next(&mut self) -> Result<bool, HarnessError> {
        let index = loop {
            if self.cursor >= self.registry.len() {
                self.print_summary();
                return Ok(false);
            }
            if self.matcher.matches(&self.registry.cases()[self.cursor].name) {
                break self.cursor;
            }
            self.cursor += 1;
        };
        self.cursor = index + 1;

        let record = self.run_case(index);
        self.stats.count(record.outcome);
        self.console.emit(&format!("Test case '{}'..", record.path));
        self.log.record(&record)?;
        self.console.emit_status(&record);
        Ok(true)
    }

    fn run_case(&self, index: usize) -> CaseRecord {
        let case = &self.registry.cases()[index];
        let Some(library) = self.library.as_deref() else {
            return CaseRecord {
                path: case.name.clone(),
                outcome: Outcome::InternalError,
                detail: "no driver library bound for execution".to_string(),
                numbers: Vec::new(),
            };
        };

        let mut ctx = CaseContext::new(library, self.archive, self.config);
        let verdict = panic::catch_unwind(AssertUnwindSafe(|| (case.run)(&mut ctx)));
        let (outcome, status_text) = match verdict {
            Ok(Ok(status)) => (status.outcome, status.description),
            Ok(Err(fault)) => (fault.outcome(), fault.to_string()),
            Err(payload) => (
                Outcome::InternalError,
                format!("panic: {}", panic_message(payload.as_ref())),
            ),
        };

        let (messages, numbers) = ctx.into_parts();
        let detail = if messages.is_empty() {
            status_text
        } else {
            let mut lines = messages;
            lines.push(status_text);
            lines.join("\n")
        };
        CaseRecord {
            path: case.name.clone(),
            outcome,
            detail,
            numbers,
        }
    }

    /// Enumerates the next case identifier into the log.
    fn enumerate_next(&mut self) -> Result<bool, HarnessError> {
        loop {
            if self.cursor >= self.registry.len() {
                self.console
                    .emit(&format!("Listed {} test cases", self.stats.listed));
                return Ok(false);
            }
            let index = self.cursor;
            self.cursor += 1;
            if self.config.caselist_filter
                && !self.matcher.matches(&self.registry.cases()[index].name)
            {
                continue;
            }
            self.log.list_case(&self.registry.cases()[index].name)?;
            self.stats.listed += 1;
            return Ok(true);
        }
    }

    fn print_summary(&self) {
        let total = self.stats.executed;
        self.console.emit("");
        self.console.emit("Test run totals:");
        self.console.emit(&format!(
            "  Passed:        {}/{} ({})",
            self.stats.passed,
            total,
            percent(self.stats.passed, total)
        ));
        self.console.emit(&format!(
            "  Failed:        {}/{} ({})",
            self.stats.failed,
            total,
            percent(self.stats.failed, total)
        ));
        self.console.emit(&format!(
            "  Not supported: {}/{} ({})",
            self.stats.not_supported,
            total,
            percent(self.stats.not_supported, total)
        ));
        self.console.emit(&format!(
            "  Warnings:      {}/{} ({})",
            self.stats.warnings,
            total,
            percent(self.stats.warnings, total)
        ));
    }
}

fn percent(part: usize, total: usize) -> String {
    if total == 0 {
        "0.0%".to_string()
    } else {
        format!("{:.1}%", part as f64 * 100.0 / total as f64)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unidentified panic".to_string()
    }
}
