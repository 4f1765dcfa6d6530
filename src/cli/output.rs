//! Console output sinks for the harness.
//!
//! All diagnostic text flows through an [`OutputSink`] so that quiet mode
//! can discard the console wholesale without touching the test log, and so
//! tests can capture output programmatically.

use std::cell::RefCell;
use std::rc::Rc;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::testlog::{CaseRecord, Outcome};

pub trait OutputSink {
    fn emit(&mut self, text: &str);

    /// Renders one case result. The default is the plain-text form; sinks
    /// may override for richer rendering.
    fn emit_status(&mut self, record: &CaseRecord) {
        self.emit(&status_line(record));
    }
}

/// The console form of a result: outcome code plus the final detail line.
pub fn status_line(record: &CaseRecord) -> String {
    format!(
        "  {} ({})",
        record.outcome.code(),
        record.detail.lines().last().unwrap_or("")
    )
}

fn outcome_color(outcome: Outcome) -> ColorSpec {
    let mut spec = ColorSpec::new();
    match outcome {
        Outcome::Pass => spec.set_fg(Some(Color::Green)),
        Outcome::Fail | Outcome::ResourceError | Outcome::InternalError => {
            spec.set_fg(Some(Color::Red)).set_bold(true)
        }
        Outcome::QualityWarning | Outcome::CompatibilityWarning => {
            spec.set_fg(Some(Color::Yellow))
        }
        Outcome::NotSupported => spec.set_fg(Some(Color::Cyan)),
    };
    spec
}

/// Writes to stdout, colorizing result lines when attached to a terminal.
pub struct StdoutSink {
    color: ColorChoice,
}

impl StdoutSink {
    pub fn new() -> Self {
        let color = if atty::is(atty::Stream::Stdout) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self { color }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        println!("{text}");
    }

    fn emit_status(&mut self, record: &CaseRecord) {
        let mut stdout = StandardStream::stdout(self.color);
        let _ = stdout.set_color(&outcome_color(record.outcome));
        print!("  {}", record.outcome.code());
        let _ = stdout.reset();
        println!(" ({})", record.detail.lines().last().unwrap_or(""));
    }
}

/// Discards everything. Installed by `--deqp-quiet`.
pub struct QuietSink;

impl OutputSink for QuietSink {
    fn emit(&mut self, _text: &str) {}

    fn emit_status(&mut self, _record: &CaseRecord) {}
}

/// Collects output into a string for tests and programmatic capture.
pub struct OutputBuffer {
    pub buffer: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);
    }
}

/// Cloneable handle to a single shared sink.
#[derive(Clone)]
pub struct SharedOutput(Rc<RefCell<dyn OutputSink>>);

impl SharedOutput {
    pub fn new(sink: impl OutputSink + 'static) -> Self {
        Self(Rc::new(RefCell::new(sink)))
    }

    /// Wraps an existing shared sink, letting the caller keep a handle for
    /// later inspection.
    pub fn from_shared(sink: Rc<RefCell<dyn OutputSink>>) -> Self {
        Self(sink)
    }

    pub fn emit(&self, text: &str) {
        self.0.borrow_mut().emit(text);
    }

    pub fn emit_status(&self, record: &CaseRecord) {
        self.0.borrow_mut().emit_status(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(outcome: Outcome, detail: &str) -> CaseRecord {
        CaseRecord {
            path: "dEQP-GLES2.info.version".to_string(),
            outcome,
            detail: detail.to_string(),
            numbers: Vec::new(),
        }
    }

    #[test]
    fn buffer_joins_lines_with_newlines() {
        let mut buffer = OutputBuffer::new();
        buffer.emit("one");
        buffer.emit("two");
        assert_eq!(buffer.as_str(), "one\ntwo");
    }

    #[test]
    fn status_line_uses_the_final_detail_line() {
        let rec = record(Outcome::Pass, "GL_OES_depth24\nGL_OES_rgb8_rgba8\n2 extensions");
        assert_eq!(status_line(&rec), "  Pass (2 extensions)");
    }

    #[test]
    fn quiet_sink_discards_everything() {
        let shared = SharedOutput::new(QuietSink);
        shared.emit("noise");
        shared.emit_status(&record(Outcome::Fail, "broken"));
        // nothing observable; the point is that neither call panics nor prints
    }

    #[test]
    fn shared_buffer_can_be_inspected_after_use() {
        let sink = Rc::new(RefCell::new(OutputBuffer::new()));
        let shared = SharedOutput::from_shared(sink.clone());
        shared.emit("hello");
        shared.emit_status(&record(Outcome::Pass, "ok"));
        assert_eq!(sink.borrow().as_str(), "hello\n  Pass (ok)");
    }
}
