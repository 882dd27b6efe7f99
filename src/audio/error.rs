use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("cannot open {}: {reason}", path.display())]
    ResourceOpen { path: PathBuf, reason: String },
    #[error("audio device unavailable: {0}")]
    Device(String),
    #[error("seek failed: {0}")]
    Seek(String),
    #[error("nothing is playing")]
    NotPlaying,
    #[error("playback is not paused")]
    NotPaused,
    #[error("audio thread has exited")]
    Disconnected,
}

impl PlaybackError {
    pub(crate) fn open(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::ResourceOpen {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
