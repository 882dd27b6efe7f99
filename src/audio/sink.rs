//! `rodio` implementation of the audio backend.
//!
//! Opening decodes the file into a paused `Sink` on the default output
//! stream. Seeking uses `Sink::try_seek`, in both directions.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::backend::{AudioBackend, Resource};
use super::error::PlaybackError;

pub struct RodioBackend {
    stream: OutputStream,
}

impl RodioBackend {
    pub fn open_default() -> Result<Self, PlaybackError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlaybackError::Device(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

/// Decoder over `path` that knows its byte length and may seek backwards.
fn decode(path: &Path) -> Result<Decoder<BufReader<File>>, PlaybackError> {
    let file = File::open(path).map_err(|e| PlaybackError::open(path, e))?;
    Decoder::try_from(file).map_err(|e| PlaybackError::open(path, e))
}

/// Container-reported duration, for decoders that cannot tell up front.
fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}

impl AudioBackend for RodioBackend {
    type Resource = SinkResource;

    fn open(&mut self, path: &Path) -> Result<SinkResource, PlaybackError> {
        let source = decode(path)?;

        let total = source
            .total_duration()
            .or_else(|| probe_duration(path))
            .unwrap_or(Duration::ZERO);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();
        Ok(SinkResource { sink, total })
    }
}

pub struct SinkResource {
    sink: Sink,
    total: Duration,
}

impl Resource for SinkResource {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn seek(&mut self, to: Duration) -> Result<(), PlaybackError> {
        self.sink
            .try_seek(to)
            .map_err(|e| PlaybackError::Seek(e.to_string()))
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn total(&self) -> Duration {
        self.total
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}
