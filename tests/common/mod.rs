// Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crucible::cli::output::{OutputBuffer, SharedOutput};

/// Write sink whose contents stay readable after the log is dropped.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

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
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

/// Creates an archive directory populated with the standard shader sources.
pub fn stage_archive() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("shaders")).unwrap();
    fs::write(
        dir.path().join("shaders/basic.vert"),
        include_str!("../../data/shaders/basic.vert"),
    )
    .unwrap();
    fs::write(
        dir.path().join("shaders/basic.frag"),
        include_str!("../../data/shaders/basic.frag"),
    )
    .unwrap();
    dir
}

/// Console sink plus a handle for inspecting what was emitted.
pub fn buffered_console() -> (SharedOutput, Rc<RefCell<OutputBuffer>>) {
    let sink = Rc::new(RefCell::new(OutputBuffer::new()));
    (SharedOutput::from_shared(sink.clone()), sink)
}
