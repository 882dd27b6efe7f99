//! Audio-related small types and handles.
//!
//! This module defines the playback state, the session snapshot shared with
//! callers, the end-of-playback notification and the commands understood by
//! the audio thread.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use super::error::PlaybackError;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Snapshot of the controller's single stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSession {
    pub state: PlaybackState,
    /// Loaded file, `None` while stopped.
    pub current_path: Option<PathBuf>,
    pub position_seconds: f64,
    pub total_seconds: f64,
    /// End time that triggers auto-stop in segment mode.
    pub segment_bound_seconds: Option<f64>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// Explicit stop, or replaced by a new `play`.
    Stopped,
    /// The decoder ran dry.
    EndOfStream,
    /// A segment reached its upper bound.
    SegmentElapsed,
}

/// Sent once per loaded resource when it is torn down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackEnded {
    pub path: PathBuf,
    pub reason: EndReason,
}

pub type Reply = Sender<Result<(), PlaybackError>>;

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace whatever is loaded with `path` and start it.
    Play { path: PathBuf, reply: Reply },
    /// Play `start..end` of `path`, then stop.
    PlaySegment {
        path: PathBuf,
        start: f64,
        end: f64,
        reply: Reply,
    },
    Pause { reply: Reply },
    Resume { reply: Reply },
    TogglePause { reply: Reply },
    /// Release the device and resource.
    Stop { reply: Reply },
    /// Move to an absolute position in seconds.
    Seek { seconds: f64, reply: Reply },
    /// Move by the given number of seconds (positive or negative).
    SeekBy { delta: f64, reply: Reply },
    SetVolume { volume: f32, reply: Reply },
    /// Register the single end-of-playback listener.
    Subscribe(Sender<PlaybackEnded>),
    /// Stop and leave the audio thread.
    Quit,
}

pub type SessionHandle = Arc<Mutex<PlaybackSession>>;
