use std::path::{Path, PathBuf};
use std::time::Duration;

/// One discovered audio file. Built once per index run and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioEntry {
    path: PathBuf,
    description: String,
    duration_seconds: f64,
}

impl AudioEntry {
    pub fn new(path: PathBuf, metadata: Metadata) -> Self {
        Self {
            path,
            description: metadata.description,
            duration_seconds: metadata.duration_seconds.max(0.0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last path component, derived on read.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Duration in seconds; `0.0` means unknown.
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_seconds)
    }
}

/// What the extractor learned about a single file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub description: String,
    pub duration_seconds: f64,
}
