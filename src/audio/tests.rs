use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::{Duration, Instant};

use super::fake::{FakeBackend, SharedLog, fake_player};
use super::*;
use crate::config::AudioSettings;

const WAIT: Duration = Duration::from_secs(3);
const QUIET: Duration = Duration::from_millis(150);

fn player(files: &[(&str, f64)]) -> (AudioPlayer, SharedLog, Receiver<PlaybackEnded>) {
    let (player, log) = fake_player(files);
    let ended = player.subscribe().unwrap();
    (player, log, ended)
}

fn live(log: &SharedLog) -> usize {
    log.lock().unwrap().live
}

#[test]
fn starts_stopped() {
    let (player, log, _ended) = player(&[("a", 5.0)]);
    assert_eq!(player.session(), PlaybackSession::default());
    assert_eq!(live(&log), 0);
}

#[test]
fn device_failure_is_reported_at_construction() {
    let result = AudioPlayer::with_backend(
        || Err::<FakeBackend, _>(PlaybackError::Device("no output".into())),
        AudioSettings::default(),
    );
    assert!(matches!(result, Err(PlaybackError::Device(_))));
}

#[test]
fn play_replaces_the_previous_resource() {
    let (player, log, ended) = player(&[("a", 5.0), ("b", 5.0)]);

    player.play("a").unwrap();
    player.play("b").unwrap();

    assert_eq!(live(&log), 1);
    assert_eq!(
        log.lock().unwrap().opened,
        vec![PathBuf::from("a"), PathBuf::from("b")]
    );
    let session = player.session();
    assert_eq!(session.state, PlaybackState::Playing);
    assert_eq!(session.current_path, Some(PathBuf::from("b")));
    assert_eq!(session.total_seconds, 5.0);

    assert_eq!(
        ended.recv_timeout(WAIT).unwrap(),
        PlaybackEnded {
            path: PathBuf::from("a"),
            reason: EndReason::Stopped,
        }
    );
}

#[test]
fn failed_open_leaves_the_player_stopped() {
    let (player, log, ended) = player(&[("a", 5.0)]);

    player.play("a").unwrap();
    let err = player.play("missing").unwrap_err();
    assert!(matches!(err, PlaybackError::ResourceOpen { .. }));

    assert_eq!(player.session(), PlaybackSession::default());
    assert_eq!(live(&log), 0);
    assert_eq!(ended.recv_timeout(WAIT).unwrap().reason, EndReason::Stopped);
    assert!(ended.recv_timeout(QUIET).is_err());
}

#[test]
fn stop_is_idempotent_and_notifies_once() {
    let (player, log, ended) = player(&[("a", 5.0)]);

    player.stop().unwrap();
    player.play("a").unwrap();
    player.stop().unwrap();
    player.stop().unwrap();

    assert_eq!(live(&log), 0);
    assert_eq!(player.session(), PlaybackSession::default());
    assert_eq!(ended.recv_timeout(WAIT).unwrap().reason, EndReason::Stopped);
    assert!(ended.recv_timeout(QUIET).is_err());
}

#[test]
fn natural_end_converges_on_stop() {
    let (player, log, ended) = player(&[("short", 0.2)]);

    player.play("short").unwrap();
    let event = ended.recv_timeout(WAIT).unwrap();

    assert_eq!(event.reason, EndReason::EndOfStream);
    assert_eq!(event.path, PathBuf::from("short"));
    // The reset state is visible by the time the listener hears about it.
    assert_eq!(player.session(), PlaybackSession::default());
    assert_eq!(live(&log), 0);
    assert!(ended.recv_timeout(QUIET).is_err());
}

#[test]
fn pause_then_resume_keeps_position() {
    let (player, _log, _ended) = player(&[("a", 10.0)]);

    player.play("a").unwrap();
    thread::sleep(Duration::from_millis(150));
    player.pause().unwrap();

    let paused = player.session();
    assert_eq!(paused.state, PlaybackState::Paused);
    assert!(paused.position_seconds >= 0.1);

    thread::sleep(Duration::from_millis(150));
    assert_eq!(player.session().position_seconds, paused.position_seconds);

    player.resume().unwrap();
    let resumed = player.session();
    assert_eq!(resumed.state, PlaybackState::Playing);
    assert!((resumed.position_seconds - paused.position_seconds).abs() < 0.05);
}

#[test]
fn transport_calls_in_the_wrong_state_are_refused() {
    let (player, _log, _ended) = player(&[("a", 10.0)]);

    assert!(matches!(player.pause(), Err(PlaybackError::NotPlaying)));
    assert!(matches!(player.resume(), Err(PlaybackError::NotPaused)));
    assert!(matches!(player.toggle_pause(), Err(PlaybackError::NotPlaying)));

    player.play("a").unwrap();
    assert!(matches!(player.resume(), Err(PlaybackError::NotPaused)));

    player.toggle_pause().unwrap();
    assert_eq!(player.state(), PlaybackState::Paused);
    assert!(matches!(player.pause(), Err(PlaybackError::NotPlaying)));
    player.toggle_pause().unwrap();
    assert_eq!(player.state(), PlaybackState::Playing);
}

#[test]
fn seek_clamps_into_the_file() {
    let (player, _log, _ended) = player(&[("a", 5.0)]);

    player.seek(2.0).unwrap();
    assert_eq!(player.state(), PlaybackState::Stopped);

    player.play("a").unwrap();
    player.pause().unwrap();

    player.seek(100.0).unwrap();
    assert_eq!(player.session().position_seconds, 5.0);
    player.seek(-3.0).unwrap();
    assert_eq!(player.session().position_seconds, 0.0);
    player.seek(2.5).unwrap();
    assert_eq!(player.session().position_seconds, 2.5);

    player.seek_by(1.0).unwrap();
    assert_eq!(player.session().position_seconds, 3.5);
    player.seek_by(-10.0).unwrap();
    assert_eq!(player.session().position_seconds, 0.0);

    // Resume picks up where the seek left it.
    player.seek(4.0).unwrap();
    player.resume().unwrap();
    assert!(player.session().position_seconds >= 4.0);
}

#[test]
fn volume_only_applies_to_a_loaded_resource() {
    let (player, log, _ended) = player(&[("a", 5.0), ("b", 5.0)]);

    player.set_volume(0.3).unwrap();
    assert!(log.lock().unwrap().volumes.is_empty());

    player.play("a").unwrap();
    assert_eq!(log.lock().unwrap().volumes.last(), Some(&1.0));

    player.set_volume(0.5).unwrap();
    assert_eq!(log.lock().unwrap().volumes.last(), Some(&0.5));
    player.set_volume(1.5).unwrap();
    assert_eq!(log.lock().unwrap().volumes.last(), Some(&1.0));
    player.set_volume(0.25).unwrap();

    player.play("b").unwrap();
    assert_eq!(log.lock().unwrap().volumes.last(), Some(&0.25));
}

#[test]
fn segment_stops_itself_at_its_bound() {
    let (player, log, ended) = player(&[("a", 2.0)]);

    let started = Instant::now();
    player.play_segment("a", 0.5, 0.8).unwrap();

    let session = player.session();
    assert_eq!(session.state, PlaybackState::Playing);
    assert!(session.position_seconds >= 0.5);
    let bound = session.segment_bound_seconds.unwrap();
    assert!((bound - 0.8).abs() < 1e-6);

    let event = ended.recv_timeout(WAIT).unwrap();
    let took = started.elapsed();
    assert_eq!(event.reason, EndReason::SegmentElapsed);
    assert!(took >= Duration::from_millis(250), "{took:?}");
    // Well before the file would have run out on its own.
    assert!(took < Duration::from_millis(1200), "{took:?}");

    assert_eq!(player.session(), PlaybackSession::default());
    assert_eq!(live(&log), 0);
}

#[test]
fn segment_is_cut_short_by_the_end_of_the_file() {
    let (player, _log, ended) = player(&[("a", 1.0)]);

    player.play_segment("a", 0.7, 30.0).unwrap();
    let bound = player.session().segment_bound_seconds.unwrap();
    assert!((bound - 1.0).abs() < 1e-6);

    let event = ended.recv_timeout(WAIT).unwrap();
    assert!(matches!(
        event.reason,
        EndReason::SegmentElapsed | EndReason::EndOfStream
    ));
    assert!(ended.recv_timeout(QUIET).is_err());
}

#[test]
fn segment_starting_past_the_end_is_a_no_op() {
    let (player, log, ended) = player(&[("a", 20.0)]);

    player.play_segment("a", 25.0, 30.0).unwrap();

    assert_eq!(player.session(), PlaybackSession::default());
    assert_eq!(live(&log), 0);
    assert!(ended.recv_timeout(QUIET).is_err());
}

#[test]
fn inverted_segment_plays_without_a_bound() {
    let (player, _log, _ended) = player(&[("a", 20.0)]);

    player.play_segment("a", 4.0, 2.0).unwrap();
    let session = player.session();
    assert_eq!(session.state, PlaybackState::Playing);
    assert_eq!(session.segment_bound_seconds, None);
    assert!(session.position_seconds >= 4.0);
}

#[test]
fn replaced_segment_does_not_stop_the_next_session() {
    let (player, _log, ended) = player(&[("a", 5.0), ("b", 5.0)]);

    player.play_segment("a", 0.0, 0.2).unwrap();
    player.play("b").unwrap();
    assert_eq!(
        ended.recv_timeout(WAIT).unwrap(),
        PlaybackEnded {
            path: PathBuf::from("a"),
            reason: EndReason::Stopped,
        }
    );

    thread::sleep(Duration::from_millis(400));
    let session = player.session();
    assert_eq!(session.state, PlaybackState::Playing);
    assert_eq!(session.current_path, Some(PathBuf::from("b")));
    assert!(ended.recv_timeout(QUIET).is_err());
}

#[test]
fn paused_segment_waits_for_resume() {
    let (player, _log, ended) = player(&[("a", 5.0)]);

    player.play_segment("a", 0.0, 0.3).unwrap();
    thread::sleep(Duration::from_millis(100));
    player.pause().unwrap();

    // The bound passes in wall time while paused and must not stop anything.
    thread::sleep(Duration::from_millis(400));
    assert_eq!(player.state(), PlaybackState::Paused);
    assert!(ended.try_recv().is_err());

    let resumed = Instant::now();
    player.resume().unwrap();
    let event = ended.recv_timeout(WAIT).unwrap();
    assert_eq!(event.reason, EndReason::SegmentElapsed);
    assert!(resumed.elapsed() >= Duration::from_millis(150));
}

#[test]
fn new_subscription_replaces_the_old_listener() {
    let (player, _log, first) = player(&[("a", 5.0)]);
    let second = player.subscribe().unwrap();

    player.play("a").unwrap();
    player.stop().unwrap();

    assert_eq!(second.recv_timeout(WAIT).unwrap().reason, EndReason::Stopped);
    assert!(first.recv_timeout(QUIET).is_err());
}

#[test]
fn dropping_the_player_stops_playback() {
    let (player, log, ended) = player(&[("a", 5.0)]);
    player.play("a").unwrap();
    drop(player);

    assert_eq!(ended.recv_timeout(WAIT).unwrap().reason, EndReason::Stopped);
    assert_eq!(live(&log), 0);
}

#[test]
fn seeking_inside_a_segment_moves_its_end() {
    let (player, _log, ended) = player(&[("a", 10.0)]);

    player.play_segment("a", 0.0, 3.0).unwrap();
    for _ in 0..20 {
        player.seek_by(0.1).unwrap();
    }
    player.seek(2.8).unwrap();

    let sought = Instant::now();
    let event = ended.recv_timeout(WAIT).unwrap();
    assert_eq!(event.reason, EndReason::SegmentElapsed);
    assert!(sought.elapsed() < Duration::from_millis(800), "{:?}", sought.elapsed());
    assert!(ended.recv_timeout(QUIET).is_err());
}
