use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::thread;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::metadata::extract;
use super::model::AudioEntry;

/// A unit of the walk that was skipped.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("permission denied: {}", .0.display())]
    AccessDenied(PathBuf),
    #[error("vanished during scan: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error at {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("symlink loop: {} points back to {}", path.display(), ancestor.display())]
    Loop { path: PathBuf, ancestor: PathBuf },
}

impl From<walkdir::Error> for IndexError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        if let Some(ancestor) = err.loop_ancestor() {
            return IndexError::Loop {
                ancestor: ancestor.to_path_buf(),
                path,
            };
        }
        match err.io_error().map(io::Error::kind) {
            Some(ErrorKind::PermissionDenied) => IndexError::AccessDenied(path),
            Some(ErrorKind::NotFound) => IndexError::NotFound(path),
            _ => {
                let msg = err.to_string();
                let source = err.into_io_error().unwrap_or_else(|| io::Error::other(msg));
                IndexError::Io { path, source }
            }
        }
    }
}

/// Result of one index run: the entries plus whatever was skipped on the way.
#[derive(Debug, Default)]
pub struct IndexReport {
    pub entries: Vec<AudioEntry>,
    pub skipped: Vec<IndexError>,
}

fn normalized_extensions(settings: &LibrarySettings) -> Vec<String> {
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn has_extension(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Number of extraction workers: configured, or half the hardware threads.
pub fn worker_count(configured: Option<usize>) -> usize {
    configured
        .unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get() / 2)
                .unwrap_or(1)
        })
        .max(1)
}

/// Walk `root` and collect candidate paths. Directories that cannot be read
/// are recorded and skipped; the walk carries on with the rest.
pub fn discover(root: &Path, settings: &LibrarySettings) -> (Vec<PathBuf>, Vec<IndexError>) {
    let exts = normalized_extensions(settings);
    let mut files = Vec::new();
    let mut skipped = Vec::new();

    let mut walker = WalkDir::new(root).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        match entry {
            Ok(e) => {
                if e.file_type().is_file() && has_extension(e.path(), &exts) {
                    files.push(e.into_path());
                }
            }
            Err(err) => {
                let err = IndexError::from(err);
                warn!(error = %err, "skipping");
                skipped.push(err);
            }
        }
    }

    (files, skipped)
}

/// Extract metadata for every path on a bounded pool. Each path yields
/// exactly one entry; workers return their own results and rayon merges them.
pub fn extract_all(paths: &[PathBuf], workers: usize) -> Vec<AudioEntry> {
    let build = |path: &PathBuf| {
        let metadata = extract(path);
        debug!(path = %path.display(), duration = metadata.duration_seconds, "indexed");
        AudioEntry::new(path.clone(), metadata)
    };

    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("audex-index-{i}"))
        .build()
    {
        Ok(pool) => pool.install(|| paths.par_iter().map(build).collect()),
        Err(e) => {
            warn!(error = %e, "extraction pool unavailable, running inline");
            paths.iter().map(build).collect()
        }
    }
}

/// Index every audio file under `root`.
pub fn index(root: &Path, settings: &LibrarySettings) -> IndexReport {
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());

    let (candidates, skipped) = discover(&root, settings);
    let workers = worker_count(settings.workers);
    debug!(
        root = %root.display(),
        candidates = candidates.len(),
        workers,
        "walk complete"
    );

    let entries = extract_all(&candidates, workers);
    info!(
        root = %root.display(),
        entries = entries.len(),
        skipped = skipped.len(),
        "index complete"
    );

    IndexReport { entries, skipped }
}
