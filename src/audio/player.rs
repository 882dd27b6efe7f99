use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::config::AudioSettings;

use super::backend::AudioBackend;
use super::error::PlaybackError;
use super::sink::RodioBackend;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, PlaybackEnded, PlaybackSession, PlaybackState, Reply, SessionHandle};

/// Handle to the audio thread. Every transport call waits for the thread to
/// apply it, so `session()` reflects the call once it returns.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    session: SessionHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// Open the default output device.
    pub fn new(audio_settings: AudioSettings) -> Result<Self, PlaybackError> {
        Self::with_backend(RodioBackend::open_default, audio_settings)
    }

    /// Run the controller on a backend built by `open_backend` on the audio thread.
    pub fn with_backend<B, F>(
        open_backend: F,
        audio_settings: AudioSettings,
    ) -> Result<Self, PlaybackError>
    where
        B: AudioBackend + 'static,
        F: FnOnce() -> Result<B, PlaybackError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let session: SessionHandle = Arc::new(Mutex::new(PlaybackSession::default()));

        let handle = spawn_audio_thread(
            open_backend,
            rx,
            session.clone(),
            audio_settings,
        )?;

        Ok(Self {
            tx,
            session,
            join: Mutex::new(Some(handle)),
        })
    }

    fn request(&self, cmd: impl FnOnce(Reply) -> AudioCmd) -> Result<(), PlaybackError> {
        let (reply, rx) = mpsc::channel();
        self.tx
            .send(cmd(reply))
            .map_err(|_| PlaybackError::Disconnected)?;
        rx.recv().map_err(|_| PlaybackError::Disconnected)?
    }

    pub fn play(&self, path: impl Into<PathBuf>) -> Result<(), PlaybackError> {
        let path = path.into();
        self.request(|reply| AudioCmd::Play { path, reply })
    }

    /// Play `start..end` seconds of `path` and stop at `end`. A start at or
    /// past the end of the file leaves the player stopped.
    pub fn play_segment(
        &self,
        path: impl Into<PathBuf>,
        start: f64,
        end: f64,
    ) -> Result<(), PlaybackError> {
        let path = path.into();
        self.request(|reply| AudioCmd::PlaySegment {
            path,
            start,
            end,
            reply,
        })
    }

    pub fn pause(&self) -> Result<(), PlaybackError> {
        self.request(|reply| AudioCmd::Pause { reply })
    }

    pub fn resume(&self) -> Result<(), PlaybackError> {
        self.request(|reply| AudioCmd::Resume { reply })
    }

    pub fn toggle_pause(&self) -> Result<(), PlaybackError> {
        self.request(|reply| AudioCmd::TogglePause { reply })
    }

    pub fn stop(&self) -> Result<(), PlaybackError> {
        self.request(|reply| AudioCmd::Stop { reply })
    }

    pub fn seek(&self, seconds: f64) -> Result<(), PlaybackError> {
        self.request(|reply| AudioCmd::Seek { seconds, reply })
    }

    pub fn seek_by(&self, delta: f64) -> Result<(), PlaybackError> {
        self.request(|reply| AudioCmd::SeekBy { delta, reply })
    }

    pub fn set_volume(&self, volume: f32) -> Result<(), PlaybackError> {
        self.request(|reply| AudioCmd::SetVolume { volume, reply })
    }

    /// Register the end-of-playback listener, replacing any previous one.
    pub fn subscribe(&self) -> Result<Receiver<PlaybackEnded>, PlaybackError> {
        let (tx, rx) = mpsc::channel();
        self.tx
            .send(AudioCmd::Subscribe(tx))
            .map_err(|_| PlaybackError::Disconnected)?;
        Ok(rx)
    }

    pub fn session(&self) -> PlaybackSession {
        self.session
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn state(&self) -> PlaybackState {
        self.session().state
    }

    /// Stop playback and join the audio thread.
    pub fn shutdown(&self) {
        let _ = self.tx.send(AudioCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
