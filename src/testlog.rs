//! Append-only structured test log.
//!
//! One record is written per executed case, in execution order. The log is
//! the single source of truth for test outcomes; the process exit status
//! never reflects them. Two encodings are supported: an XML batch-result
//! document and newline-delimited JSON. Neither contains timestamps or any
//! other run-varying data, so identical configurations produce identical
//! logs.
//!
//! Release is guaranteed on every exit path: `finish` writes the footer and
//! flushes, and `Drop` falls back to the same routine if the caller never
//! got there (for example when setup fails partway through).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::config::LogFormat;
use crate::errors::HarnessError;

/// Result classification for one executed case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Pass,
    Fail,
    QualityWarning,
    CompatibilityWarning,
    NotSupported,
    ResourceError,
    InternalError,
}

impl Outcome {
    pub fn code(&self) -> &'static str {
        match self {
            Outcome::Pass => "Pass",
            Outcome::Fail => "Fail",
            Outcome::QualityWarning => "QualityWarning",
            Outcome::CompatibilityWarning => "CompatibilityWarning",
            Outcome::NotSupported => "NotSupported",
            Outcome::ResourceError => "ResourceError",
            Outcome::InternalError => "InternalError",
        }
    }
}

/// A named numeric sub-result attached to a case record.
#[derive(Debug, Clone, Serialize)]
pub struct SubResult {
    pub name: String,
    pub value: f64,
}

/// One log record: everything the harness knows about one executed case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseRecord {
    #[serde(rename = "case")]
    pub path: String,
    pub outcome: Outcome,
    pub detail: String,
    pub numbers: Vec<SubResult>,
}

/// The open, append-only log sink.
pub struct TestLog {
    sink: Box<dyn Write>,
    format: LogFormat,
    finished: bool,
}

impl TestLog {
    /// Creates the log file at `path` and writes the header.
    pub fn create(path: &Path, format: LogFormat) -> Result<Self, HarnessError> {
        let file = File::create(path).map_err(|source| HarnessError::Log {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_writer(Box::new(BufWriter::new(file)), format)
    }

    /// Builds a log over an arbitrary writer. Used by tests and embedders.
    pub fn from_writer(sink: Box<dyn Write>, format: LogFormat) -> Result<Self, HarnessError> {
        let mut log = Self {
            sink,
            format,
            finished: false,
        };
        log.write_header()
            .map_err(|source| HarnessError::LogWrite { source })?;
        Ok(log)
    }

    fn write_header(&mut self) -> io::Result<()> {
        match self.format {
            LogFormat::Xml => {
                writeln!(self.sink, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
                writeln!(self.sink, "<BatchResult>")
            }
            LogFormat::Json => Ok(()),
        }
    }

    /// Appends one result record.
    pub fn record(&mut self, record: &CaseRecord) -> Result<(), HarnessError> {
        self.write_record(record)
            .map_err(|source| HarnessError::LogWrite { source })
    }

    fn write_record(&mut self, record: &CaseRecord) -> io::Result<()> {
        match self.format {
            LogFormat::Xml => {
                writeln!(
                    self.sink,
                    " <TestCaseResult CasePath=\"{}\" StatusCode=\"{}\">",
                    escape_xml(&record.path),
                    record.outcome.code()
                )?;
                if !record.detail.is_empty() {
                    writeln!(self.sink, "  <Text>{}</Text>", escape_xml(&record.detail))?;
                }
                for number in &record.numbers {
                    writeln!(
                        self.sink,
                        "  <Number Name=\"{}\" Value=\"{}\"/>",
                        escape_xml(&number.name),
                        number.value
                    )?;
                }
                writeln!(self.sink, " </TestCaseResult>")
            }
            LogFormat::Json => {
                let line = serde_json::to_string(record)?;
                writeln!(self.sink, "{line}")
            }
        }
    }

    /// Appends one case identifier in caselist-generation mode.
    pub fn list_case(&mut self, path: &str) -> Result<(), HarnessError> {
        let result = match self.format {
            LogFormat::Xml => writeln!(self.sink, " <Case Name=\"{}\"/>", escape_xml(path)),
            LogFormat::Json => writeln!(self.sink, "{{\"case\":{}}}", json_string(path)),
        };
        result.map_err(|source| HarnessError::LogWrite { source })
    }

    /// Writes the footer and flushes. Safe to call more than once.
    pub fn finish(&mut self) -> Result<(), HarnessError> {
        self.finish_inner()
            .map_err(|source| HarnessError::LogWrite { source })
    }

    fn finish_inner(&mut self) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        if let LogFormat::Xml = self.format {
            writeln!(self.sink, "</BatchResult>")?;
        }
        self.sink.flush()
    }
}

impl Drop for TestLog {
    fn drop(&mut self) {
        let _ = self.finish_inner();
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn json_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn sample_record() -> CaseRecord {
        CaseRecord {
            path: "dEQP-GLES2.info.version".to_string(),
            outcome: Outcome::Pass,
            detail: "OpenGL ES 2.0 <null>".to_string(),
            numbers: vec![SubResult {
                name: "GL_MAX_TEXTURE_SIZE".to_string(),
                value: 2048.0,
            }],
        }
    }

    #[test]
    fn xml_log_is_well_formed_and_escaped() {
        let buf = SharedBuf::default();
        let mut log = TestLog::from_writer(Box::new(buf.clone()), LogFormat::Xml).unwrap();
        log.record(&sample_record()).unwrap();
        log.finish().unwrap();

        let text = buf.contents();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("CasePath=\"dEQP-GLES2.info.version\""));
        assert!(text.contains("StatusCode=\"Pass\""));
        assert!(text.contains("OpenGL ES 2.0 &lt;null&gt;"));
        assert!(text.contains("<Number Name=\"GL_MAX_TEXTURE_SIZE\" Value=\"2048\"/>"));
        assert!(text.ends_with("</BatchResult>\n"));
    }

    #[test]
    fn json_log_emits_one_object_per_line() {
        let buf = SharedBuf::default();
        let mut log = TestLog::from_writer(Box::new(buf.clone()), LogFormat::Json).unwrap();
        log.record(&sample_record()).unwrap();
        log.list_case("dEQP-GLES2.info.vendor").unwrap();
        log.finish().unwrap();

        let text = buf.contents();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["case"], "dEQP-GLES2.info.version");
        assert_eq!(first["outcome"], "Pass");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["case"], "dEQP-GLES2.info.vendor");
    }

    #[test]
    fn dropping_an_unfinished_log_writes_the_footer() {
        let buf = SharedBuf::default();
        {
            let mut log = TestLog::from_writer(Box::new(buf.clone()), LogFormat::Xml).unwrap();
            log.record(&sample_record()).unwrap();
            // dropped without finish()
        }
        assert!(buf.contents().ends_with("</BatchResult>\n"));
    }

    #[test]
    fn finish_is_idempotent() {
        let buf = SharedBuf::default();
        let mut log = TestLog::from_writer(Box::new(buf.clone()), LogFormat::Xml).unwrap();
        log.finish().unwrap();
        log.finish().unwrap();
        assert_eq!(buf.contents().matches("</BatchResult>").count(), 1);
    }
}
