//! Single-stream playback controller.
//!
//! An audio thread owns the output device and the one loaded resource and
//! runs the stopped/playing/paused state machine. `AudioPlayer` sends it
//! commands and reads back a shared session snapshot.

mod backend;
mod error;
mod player;
mod segment;
mod sink;
mod thread;
mod types;

pub use backend::{AudioBackend, Resource};
pub use error::PlaybackError;
pub use player::AudioPlayer;
pub use segment::effective_length;
pub use types::{EndReason, PlaybackEnded, PlaybackSession, PlaybackState};

#[cfg(test)]
pub(crate) mod fake;

#[cfg(test)]
mod tests;
