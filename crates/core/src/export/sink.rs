//! Destinations for export payloads.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;

/// Receives a finished export file.
pub trait ExportSink: Send + Sync {
    fn write(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<()>;
}

/// Writes export files into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl ExportSink for DirectorySink {
    fn write(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(file_name), bytes)
    }
}

/// Keeps export files in memory. Useful for tests and for callers that
/// stream the payload elsewhere.
#[derive(Clone, Default)]
pub struct MemorySink {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_files(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.files.lock().unwrap_or_else(|poisoned| {
            warn!("MemorySink mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn get(&self, file_name: &str) -> Option<Vec<u8>> {
        self.lock_files().get(file_name).cloned()
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock_files().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.lock_files().is_empty()
    }
}

impl ExportSink for MemorySink {
    fn write(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<()> {
        self.lock_files()
            .insert(file_name.to_string(), bytes.to_vec());
        Ok(())
    }
}
