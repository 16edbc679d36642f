// Persistence backends - where the serialized document lives

use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Raw storage for the serialized document.
///
/// A backend only moves whole documents. Parsing, validation and locking live
/// in [`crate::ContentStore`].
pub trait Backend: Send + Sync {
    /// Load the stored document. `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored document.
    fn save(&self, contents: &str) -> Result<()>;

    /// Human-readable location, for logs and error messages.
    fn describe(&self) -> String;
}

/// A single JSON file on disk.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileBackend { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl Backend for FileBackend {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes a sibling temp file and renames it over the target, so readers
    /// see either the old or the new document.
    fn save(&self, contents: &str) -> Result<()> {
        let dir = self.directory();
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps the document in memory. Nothing survives the process.
#[derive(Default)]
pub struct MemoryBackend {
    contents: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-serialized document.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        MemoryBackend {
            contents: Mutex::new(Some(contents.into())),
        }
    }
}

impl Backend for MemoryBackend {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save(&self, contents: &str) -> Result<()> {
        *self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(contents.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}
