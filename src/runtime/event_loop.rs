use std::io::{self, BufRead, Write};

use crate::audio::{AudioPlayer, PlaybackState};
use crate::config;
use crate::library::{AudioEntry, format_duration, matches_query};

const HELP: &str = "\
commands:
  list [query]              show entries, optionally filtered
  play <n>                  play entry n (again = restart)
  segment <n> <start> <end> play seconds start..end of entry n
  pause | resume | toggle   pause control
  stop                      stop playback
  seek <secs>               jump to an absolute position
  ff [secs] | rw [secs]     skip forward / back
  vol <0-100>               set volume
  status                    show what is playing
  quit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List(String),
    Play(usize),
    Segment { index: usize, start: f64, end: f64 },
    Pause,
    Resume,
    Toggle,
    Stop,
    Seek(f64),
    Forward(Option<f64>),
    Rewind(Option<f64>),
    Volume(u8),
    Status,
    Help,
    Quit,
}

fn number<T: std::str::FromStr>(word: Option<&str>, what: &str) -> Result<T, String> {
    let word = word.ok_or_else(|| format!("missing {what}"))?;
    word.parse().map_err(|_| format!("bad {what}: {word}"))
}

fn optional_number(word: Option<&str>, what: &str) -> Result<Option<f64>, String> {
    match word {
        Some(_) => number(word, what).map(Some),
        None => Ok(None),
    }
}

/// Parse a line such as `segment 3 10 15`. Entry numbers are 1-based.
pub fn parse(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".to_string());
    };

    let cmd = match head.to_ascii_lowercase().as_str() {
        "list" | "ls" => Command::List(words.by_ref().collect::<Vec<_>>().join(" ")),
        "play" | "p" => Command::Play(number(words.next(), "entry number")?),
        "segment" | "seg" => Command::Segment {
            index: number(words.next(), "entry number")?,
            start: number(words.next(), "start time")?,
            end: number(words.next(), "end time")?,
        },
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "toggle" | "space" => Command::Toggle,
        "stop" | "s" => Command::Stop,
        "seek" => Command::Seek(number(words.next(), "position")?),
        "ff" => Command::Forward(optional_number(words.next(), "seconds")?),
        "rw" => Command::Rewind(optional_number(words.next(), "seconds")?),
        "vol" | "volume" => {
            let v: u8 = number(words.next(), "volume")?;
            if v > 100 {
                return Err(format!("volume out of range: {v}"));
            }
            Command::Volume(v)
        }
        "status" | "st" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };

    if words.next().is_some() {
        return Err(format!("too many arguments for `{head}`"));
    }
    Ok(cmd)
}

pub fn print_entries<W: Write>(out: &mut W, entries: &[AudioEntry], query: &str) -> io::Result<()> {
    let mut shown = 0;
    for (i, entry) in entries.iter().enumerate() {
        if !matches_query(entry, query) {
            continue;
        }
        shown += 1;
        writeln!(
            out,
            "{:>4}  {}  {}  {}",
            i + 1,
            format_duration(entry.duration_seconds()),
            entry.file_name(),
            entry.description()
        )?;
    }
    writeln!(out, "{shown} of {} files", entries.len())
}

struct Shell<'a, W> {
    entries: &'a [AudioEntry],
    player: &'a AudioPlayer,
    scrub_seconds: f64,
    out: W,
}

fn nth(entries: &[AudioEntry], n: usize) -> Option<&AudioEntry> {
    n.checked_sub(1).and_then(|i| entries.get(i))
}

impl<W: Write> Shell<'_, W> {
    fn apply(&mut self, cmd: Command) -> io::Result<()> {
        let result = match cmd {
            Command::List(query) => return print_entries(&mut self.out, self.entries, &query),
            Command::Help => return writeln!(self.out, "{HELP}"),
            Command::Status => return self.status(),
            Command::Play(n) => {
                let Some(entry) = nth(self.entries, n) else {
                    return writeln!(self.out, "no entry {n}");
                };
                let session = self.player.session();
                // Playing the current file again restarts it.
                if session.state == PlaybackState::Playing
                    && session.current_path.as_deref() == Some(entry.path())
                {
                    self.player.seek(0.0)
                } else {
                    self.player.play(entry.path())
                }
            }
            Command::Segment { index, start, end } => {
                let Some(entry) = nth(self.entries, index) else {
                    return writeln!(self.out, "no entry {index}");
                };
                let result = self.player.play_segment(entry.path(), start, end);
                if result.is_ok() && self.player.state() == PlaybackState::Stopped {
                    writeln!(self.out, "{} is shorter than {start}s", entry.file_name())?;
                }
                result
            }
            Command::Pause => self.player.pause(),
            Command::Resume => self.player.resume(),
            Command::Toggle => self.player.toggle_pause(),
            Command::Stop => self.player.stop(),
            Command::Seek(t) => self.player.seek(t),
            Command::Forward(s) => self.player.seek_by(s.unwrap_or(self.scrub_seconds)),
            Command::Rewind(s) => self.player.seek_by(-s.unwrap_or(self.scrub_seconds)),
            Command::Volume(v) => self.player.set_volume(f32::from(v) / 100.0),
            Command::Quit => Ok(()),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn status(&mut self) -> io::Result<()> {
        let s = self.player.session();
        let Some(path) = s.current_path.as_ref() else {
            return writeln!(self.out, "stopped");
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let state = match s.state {
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Stopped => "stopped",
        };
        write!(
            self.out,
            "{state} {name} {} / {}",
            format_duration(s.position_seconds),
            format_duration(s.total_seconds)
        )?;
        if let Some(bound) = s.segment_bound_seconds {
            write!(self.out, " (until {})", format_duration(bound))?;
        }
        writeln!(self.out)
    }
}

/// Read commands from `input` until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(
    entries: &[AudioEntry],
    player: &AudioPlayer,
    settings: &config::Settings,
    input: R,
    out: W,
) -> io::Result<()> {
    let mut shell = Shell {
        entries,
        player,
        scrub_seconds: settings.audio.scrub_seconds as f64,
        out,
    };

    print_entries(&mut shell.out, entries, "")?;
    writeln!(shell.out, "type `help` for commands")?;
    shell.out.flush()?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse(&line) {
            Ok(Command::Quit) => break,
            Ok(cmd) => shell.apply(cmd)?,
            Err(msg) => writeln!(shell.out, "{msg}")?,
        }
        shell.out.flush()?;
    }
    Ok(())
}
