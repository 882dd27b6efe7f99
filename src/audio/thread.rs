use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::AudioSettings;

use super::backend::{AudioBackend, Resource};
use super::error::PlaybackError;
use super::segment::effective_length;
use super::types::{
    AudioCmd, EndReason, PlaybackEnded, PlaybackSession, PlaybackState, SessionHandle,
};

/// How close to its bound a segment must be to count as done.
const SEGMENT_SLACK: Duration = Duration::from_millis(30);

struct Active<R> {
    resource: R,
    path: PathBuf,
    paused_at: Option<Duration>,
    /// End of the segment being played, if any.
    bound: Option<Duration>,
}

impl<R: Resource> Active<R> {
    fn state(&self) -> PlaybackState {
        if self.paused_at.is_some() {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        }
    }

    fn position(&self) -> Duration {
        self.paused_at.unwrap_or_else(|| self.resource.position())
    }

    /// Playing time left before the segment bound. `None` while paused or unbounded.
    fn until_bound(&self) -> Option<Duration> {
        if self.paused_at.is_some() {
            return None;
        }
        self.bound.map(|b| b.saturating_sub(self.resource.position()))
    }
}

struct AudioThread<B: AudioBackend> {
    backend: B,
    active: Option<Active<B::Resource>>,
    session: SessionHandle,
    listener: Option<Sender<PlaybackEnded>>,
    generation: u64,
    volume: f32,
}

pub(super) fn spawn_audio_thread<B, F>(
    open_backend: F,
    rx: Receiver<AudioCmd>,
    session: SessionHandle,
    audio_settings: AudioSettings,
) -> Result<JoinHandle<()>, PlaybackError>
where
    B: AudioBackend + 'static,
    F: FnOnce() -> Result<B, PlaybackError> + Send + 'static,
{
    let (ready_tx, ready_rx) = mpsc::channel::<Result<(), PlaybackError>>();
    let poll = Duration::from_millis(audio_settings.poll_interval_ms.max(1));

    let handle = thread::Builder::new()
        .name("audex-audio".into())
        .spawn(move || {
            // The device lives and dies on this thread.
            let backend = match open_backend() {
                Ok(b) => {
                    let _ = ready_tx.send(Ok(()));
                    b
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            let mut audio = AudioThread {
                backend,
                active: None,
                session,
                listener: None,
                generation: 0,
                volume: audio_settings.volume.clamp(0.0, 1.0),
            };
            audio.run(&rx, poll);
        })
        .map_err(|e| PlaybackError::Device(e.to_string()))?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(e)
        }
        Err(_) => {
            let _ = handle.join();
            Err(PlaybackError::Disconnected)
        }
    }
}

impl<B: AudioBackend> AudioThread<B> {
    fn run(&mut self, rx: &Receiver<AudioCmd>, poll: Duration) {
        loop {
            // Wake at the segment bound when it comes before the next poll.
            let wait = self
                .active
                .as_ref()
                .and_then(Active::until_bound)
                .map_or(poll, |left| left.min(poll));

            match rx.recv_timeout(wait) {
                Ok(cmd) => {
                    if !self.handle(cmd) {
                        break;
                    }
                }
                // periodic check for end of stream or segment
                Err(RecvTimeoutError::Timeout) => self.tick(),
                Err(RecvTimeoutError::Disconnected) => {
                    self.stop(EndReason::Stopped);
                    break;
                }
            }
        }
    }

    /// Returns `false` once the thread should exit.
    fn handle(&mut self, cmd: AudioCmd) -> bool {
        match cmd {
            AudioCmd::Play { path, reply } => {
                let _ = reply.send(self.play(path));
            }
            AudioCmd::PlaySegment {
                path,
                start,
                end,
                reply,
            } => {
                let _ = reply.send(self.play_segment(path, start, end));
            }
            AudioCmd::Pause { reply } => {
                let _ = reply.send(self.pause());
            }
            AudioCmd::Resume { reply } => {
                let _ = reply.send(self.resume());
            }
            AudioCmd::TogglePause { reply } => {
                let result = match self.active.as_ref().map(Active::state) {
                    Some(PlaybackState::Playing) => self.pause(),
                    Some(_) => self.resume(),
                    None => Err(PlaybackError::NotPlaying),
                };
                let _ = reply.send(result);
            }
            AudioCmd::Stop { reply } => {
                self.stop(EndReason::Stopped);
                let _ = reply.send(Ok(()));
            }
            AudioCmd::Seek { seconds, reply } => {
                let _ = reply.send(self.seek(seconds));
            }
            AudioCmd::SeekBy { delta, reply } => {
                let target = self
                    .active
                    .as_ref()
                    .map(|a| a.position().as_secs_f64() + delta);
                let result = match target {
                    Some(t) => self.seek(t),
                    None => Ok(()),
                };
                let _ = reply.send(result);
            }
            AudioCmd::SetVolume { volume, reply } => {
                self.set_volume(volume);
                let _ = reply.send(Ok(()));
            }
            AudioCmd::Subscribe(listener) => {
                self.listener = Some(listener);
            }
            AudioCmd::Quit => {
                self.stop(EndReason::Stopped);
                return false;
            }
        }
        true
    }

    /// Tear down the current session and open `path` in its place.
    fn load(&mut self, path: &Path) -> Result<B::Resource, PlaybackError> {
        self.stop(EndReason::Stopped);
        self.backend.open(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "open failed");
        })
    }

    fn play(&mut self, path: PathBuf) -> Result<(), PlaybackError> {
        let resource = self.load(&path)?;
        self.start(path, resource, Duration::ZERO, None);
        Ok(())
    }

    fn play_segment(&mut self, path: PathBuf, start: f64, end: f64) -> Result<(), PlaybackError> {
        let mut resource = self.load(&path)?;
        let start = start.max(0.0);
        let total = resource.total().as_secs_f64();

        let Some(length) = effective_length(start, end, total) else {
            debug!(path = %path.display(), start, total, "segment starts past the end");
            resource.stop();
            return Ok(());
        };

        let from = Duration::from_secs_f64(start);
        if let Err(e) = resource.seek(from) {
            resource.stop();
            return Err(e);
        }

        // An empty or inverted window plays on from `start` without a bound.
        let bound = (end > start).then(|| from + Duration::from_secs_f64(length));
        self.start(path, resource, from, bound);
        Ok(())
    }

    fn start(
        &mut self,
        path: PathBuf,
        mut resource: B::Resource,
        from: Duration,
        bound: Option<Duration>,
    ) {
        resource.set_volume(self.volume);
        resource.play();

        self.generation += 1;
        let generation = self.generation;

        info!(path = %path.display(), generation, from = ?from, segment = ?bound, "playing");
        self.active = Some(Active {
            resource,
            path,
            paused_at: None,
            bound,
        });
        self.publish();
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        let Some(active) = self.active.as_mut().filter(|a| a.paused_at.is_none()) else {
            return Err(PlaybackError::NotPlaying);
        };
        let position = active.resource.position();
        active.resource.pause();
        active.paused_at = Some(position);
        debug!(position = position.as_secs_f64(), "paused");
        self.publish();
        Ok(())
    }

    fn resume(&mut self) -> Result<(), PlaybackError> {
        let Some(active) = self.active.as_mut() else {
            return Err(PlaybackError::NotPaused);
        };
        let Some(position) = active.paused_at.take() else {
            return Err(PlaybackError::NotPaused);
        };
        if let Err(e) = active.resource.seek(position) {
            warn!(error = %e, "could not restore paused position");
        }
        active.resource.play();
        debug!(position = position.as_secs_f64(), "resumed");
        self.publish();
        Ok(())
    }

    /// Idempotent teardown; notifies the listener only when a session ends.
    fn stop(&mut self, reason: EndReason) {
        let ended = self.active.take().map(|mut active| {
            active.resource.stop();
            info!(path = %active.path.display(), ?reason, "playback ended");
            PlaybackEnded {
                path: active.path,
                reason,
            }
        });

        self.publish();
        if let Some(ended) = ended {
            self.notify(ended);
        }
    }

    fn seek(&mut self, seconds: f64) -> Result<(), PlaybackError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        let total = active.resource.total().as_secs_f64();
        let target = if seconds.is_nan() {
            0.0
        } else {
            seconds.clamp(0.0, total)
        };
        let to = Duration::from_secs_f64(target);

        active.resource.seek(to)?;
        if active.paused_at.is_some() {
            active.paused_at = Some(to);
        }
        debug!(position = target, "seek");
        self.publish();
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        let Some(active) = self.active.as_mut() else {
            debug!("no resource loaded; volume unchanged");
            return;
        };
        if volume.is_nan() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        active.resource.set_volume(volume);
        self.volume = volume;
    }

    fn tick(&mut self) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if active.until_bound().is_some_and(|left| left <= SEGMENT_SLACK) {
            self.stop(EndReason::SegmentElapsed);
        } else if active.paused_at.is_none() && active.resource.is_finished() {
            self.stop(EndReason::EndOfStream);
        } else {
            self.publish();
        }
    }

    fn publish(&self) {
        let snapshot = match &self.active {
            Some(active) => {
                let total = active.resource.total().as_secs_f64();
                PlaybackSession {
                    state: active.state(),
                    current_path: Some(active.path.clone()),
                    position_seconds: active.position().as_secs_f64().min(total),
                    total_seconds: total,
                    segment_bound_seconds: active.bound.map(|b| b.as_secs_f64()),
                }
            }
            None => PlaybackSession::default(),
        };
        if let Ok(mut session) = self.session.lock() {
            *session = snapshot;
        }
    }

    fn notify(&mut self, ended: PlaybackEnded) {
        let gone = self
            .listener
            .as_ref()
            .is_some_and(|listener| listener.send(ended).is_err());
        if gone {
            debug!("playback listener dropped");
            self.listener = None;
        }
    }
}
