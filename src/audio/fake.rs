//! Scripted stand-in for the output device, for tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::AudioSettings;

use super::backend::{AudioBackend, Resource};
use super::error::PlaybackError;
use super::player::AudioPlayer;

#[derive(Default)]
pub(crate) struct Log {
    pub opened: Vec<PathBuf>,
    pub live: usize,
    pub volumes: Vec<f32>,
}

pub(crate) type SharedLog = Arc<Mutex<Log>>;

/// Backend whose files are just durations; playback advances with wall time.
pub(crate) struct FakeBackend {
    durations: HashMap<PathBuf, Duration>,
    log: SharedLog,
}

impl AudioBackend for FakeBackend {
    type Resource = FakeResource;

    fn open(&mut self, path: &Path) -> Result<FakeResource, PlaybackError> {
        let total = *self
            .durations
            .get(path)
            .ok_or_else(|| PlaybackError::open(path, "no such file"))?;
        let mut log = self.log.lock().unwrap();
        log.opened.push(path.to_path_buf());
        log.live += 1;
        Ok(FakeResource {
            total,
            base: Duration::ZERO,
            started: None,
            log: self.log.clone(),
        })
    }
}

pub(crate) struct FakeResource {
    total: Duration,
    base: Duration,
    started: Option<Instant>,
    log: SharedLog,
}

impl Resource for FakeResource {
    fn play(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.base = self.position();
        self.started = None;
    }

    fn stop(&mut self) {
        self.pause();
    }

    fn seek(&mut self, to: Duration) -> Result<(), PlaybackError> {
        self.base = to.min(self.total);
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.log.lock().unwrap().volumes.push(volume);
    }

    fn position(&self) -> Duration {
        let running = self.started.map_or(Duration::ZERO, |s| s.elapsed());
        (self.base + running).min(self.total)
    }

    fn total(&self) -> Duration {
        self.total
    }

    fn is_finished(&self) -> bool {
        self.started.is_some() && self.position() >= self.total
    }
}

impl Drop for FakeResource {
    fn drop(&mut self) {
        self.log.lock().unwrap().live -= 1;
    }
}

/// Player over a fake backend holding `files` as `(path, seconds)` pairs.
pub(crate) fn fake_player(files: &[(&str, f64)]) -> (AudioPlayer, SharedLog) {
    let log = SharedLog::default();
    let durations: HashMap<PathBuf, Duration> = files
        .iter()
        .map(|(p, s)| (PathBuf::from(p), Duration::from_secs_f64(*s)))
        .collect();
    let backend_log = log.clone();
    let settings = AudioSettings {
        poll_interval_ms: 10,
        ..AudioSettings::default()
    };

    let player = AudioPlayer::with_backend(
        move || {
            Ok(FakeBackend {
                durations,
                log: backend_log,
            })
        },
        settings,
    )
    .unwrap();
    (player, log)
}
