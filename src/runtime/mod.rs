use std::env;
use std::io;
use std::path::PathBuf;
use std::thread;

use tracing::warn;

use crate::audio::{AudioPlayer, EndReason};
use crate::library::{self, sort_by_file_name};

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::init(&settings.log);

    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let report = library::index(&dir, &settings.library);
    if !report.skipped.is_empty() {
        warn!(
            count = report.skipped.len(),
            "some directories could not be read"
        );
    }
    let mut entries = report.entries;
    sort_by_file_name(&mut entries);

    let player = AudioPlayer::new(settings.audio.clone())?;
    let ended = player.subscribe()?;

    // Ends by itself once the audio thread drops its sender.
    thread::spawn(move || {
        for event in ended {
            let name = event
                .path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let why = match event.reason {
                EndReason::Stopped => "stopped",
                EndReason::EndOfStream => "finished",
                EndReason::SegmentElapsed => "segment done",
            };
            println!("[{why}] {name}");
        }
    });

    // Unlocked stdout so the listener thread can interleave its lines.
    let result = event_loop::run(&entries, &player, &settings, io::stdin().lock(), io::stdout());

    player.shutdown();
    result.map_err(Into::into)
}
