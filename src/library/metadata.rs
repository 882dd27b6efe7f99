use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use thiserror::Error;
use tracing::{debug, warn};

use super::chunk::{self, ChunkError};
use super::model::Metadata;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("tag read failed: {0}")]
    Tags(#[from] lofty::error::LoftyError),
}

/// Read comment and duration through lofty, falling back to the `bext`
/// chunk for wave files whose tags carry no comment.
pub fn try_extract(path: &Path) -> Result<Metadata, MetadataError> {
    if !path.is_file() {
        return Err(MetadataError::NotAFile(path.to_path_buf()));
    }

    let tagged = lofty::read_from_path(path)?;
    let duration_seconds = tagged.properties().duration().as_secs_f64();

    let mut description = tagged
        .primary_tag()
        .or_else(|| tagged.first_tag())
        .and_then(|tag| tag.comment().map(|c| c.into_owned()))
        .unwrap_or_default();

    if description.trim().is_empty() && is_wave(path) {
        description = bext_description(path);
    }

    Ok(Metadata {
        description,
        duration_seconds,
    })
}

/// Like [`try_extract`], but every failure degrades to an empty description
/// and zero duration.
pub fn extract(path: &Path) -> Metadata {
    match try_extract(path) {
        Ok(m) => m,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "metadata unavailable");
            Metadata::default()
        }
    }
}

fn is_wave(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

fn bext_description(path: &Path) -> String {
    let parsed = File::open(path)
        .map_err(ChunkError::from)
        .and_then(|f| chunk::parse_description(&mut BufReader::new(f)));
    match parsed {
        Ok(d) => d,
        Err(ChunkError::NotFound) => String::new(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "bext fallback failed");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::fixtures::pcm_wave;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn wave_without_tags_uses_bext_description() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("take.WAV");
        fs::write(&path, pcm_wave(2, Some("Rain on tin roof"))).unwrap();

        let m = extract(&path);
        assert_eq!(m.description, "Rain on tin roof");
        assert!((m.duration_seconds - 2.0).abs() < 0.05);
    }

    #[test]
    fn wave_without_bext_has_empty_description() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.wav");
        fs::write(&path, pcm_wave(1, None)).unwrap();

        let m = try_extract(&path).unwrap();
        assert_eq!(m.description, "");
        assert!((m.duration_seconds - 1.0).abs() < 0.05);
    }

    #[test]
    fn unreadable_files_degrade_to_defaults() {
        let dir = tempdir().unwrap();
        let junk = dir.path().join("junk.mp3");
        fs::write(&junk, b"not an mp3 at all").unwrap();
        let empty = dir.path().join("empty.wav");
        fs::write(&empty, b"").unwrap();

        assert_eq!(extract(&junk), Metadata::default());
        assert_eq!(extract(&empty), Metadata::default());
        assert_eq!(extract(&dir.path().join("missing.flac")), Metadata::default());
    }

    #[test]
    fn directories_are_not_files() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            try_extract(dir.path()),
            Err(MetadataError::NotAFile(_))
        ));
    }
}
