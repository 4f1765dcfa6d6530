//! Read-only, path-addressed resource archive.
//!
//! Test cases refer to their input data (shader sources, reference images)
//! by paths relative to a single root directory. The archive owns that root
//! and hands out byte streams; it never writes.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::HarnessError;

#[derive(Debug)]
pub struct Archive {
    root: PathBuf,
}

impl Archive {
    /// Opens an archive rooted at `root`, verifying the directory exists.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, HarnessError> {
        let root = root.into();
        match root.metadata() {
            Ok(meta) if meta.is_dir() => Ok(Self { root }),
            Ok(_) => Err(HarnessError::Archive {
                path: root.display().to_string(),
                source: io::Error::new(io::ErrorKind::Other, "not a directory"),
            }),
            Err(source) => Err(HarnessError::Archive {
                path: root.display().to_string(),
                source,
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Opens the resource at `relative` as a byte stream.
    pub fn stream(&self, relative: &str) -> io::Result<File> {
        File::open(self.root.join(relative))
    }

    pub fn read_bytes(&self, relative: &str) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.stream(relative)?.read_to_end(&mut data)?;
        Ok(data)
    }

    pub fn read_text(&self, relative: &str) -> io::Result<String> {
        let mut text = String::new();
        self.stream(relative)?.read_to_string(&mut text)?;
        Ok(text)
    }

    pub fn contains(&self, relative: &str) -> bool {
        self.root.join(relative).is_file()
    }

    /// Lists every resource in the archive as a sorted relative path.
    ///
    /// Sorting keeps consumers deterministic regardless of directory
    /// enumeration order.
    pub fn entries(&self) -> Vec<String> {
        let mut entries: Vec<String> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                e.path()
                    .strip_prefix(&self.root)
                    .ok()
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
            })
            .collect();
        entries.sort();
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_root_is_a_setup_error() {
        let err = Archive::open("/nonexistent/archive/root").unwrap_err();
        assert!(matches!(err, HarnessError::Archive { .. }));
    }

    #[test]
    fn reads_and_lists_resources() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("shaders")).unwrap();
        fs::write(dir.path().join("shaders/a.vert"), "void main() {}").unwrap();
        fs::write(dir.path().join("readme.txt"), "hello").unwrap();

        let archive = Archive::open(dir.path()).unwrap();
        assert!(archive.contains("shaders/a.vert"));
        assert!(!archive.contains("shaders/missing.vert"));
        assert_eq!(archive.read_text("readme.txt").unwrap(), "hello");
        assert_eq!(
            archive.entries(),
            vec!["readme.txt".to_string(), "shaders/a.vert".to_string()]
        );
    }
}
