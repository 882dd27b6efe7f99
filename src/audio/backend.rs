//! The seam between the playback state machine and the audio output.

use std::path::Path;
use std::time::Duration;

use super::error::PlaybackError;

/// A decodable file attached to the output device.
///
/// Resources are handed out paused; dropping one detaches it from the device.
pub trait Resource {
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, to: Duration) -> Result<(), PlaybackError>;
    fn set_volume(&mut self, volume: f32);
    fn position(&self) -> Duration;
    fn total(&self) -> Duration;
    /// True once the decoder has nothing left to play.
    fn is_finished(&self) -> bool;
}

/// Opens files into resources on one output device.
pub trait AudioBackend {
    type Resource: Resource;

    fn open(&mut self, path: &Path) -> Result<Self::Resource, PlaybackError>;
}
