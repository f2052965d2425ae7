//! # File Sink
//!
//! Append-only JSON-Lines writer used when the network sink is disabled or
//! unreachable. The file is opened lazily the first time a record needs it;
//! the name carries the timestamp of that moment, so one fallback log maps
//! to one stretch of the session. Every line is flushed as soon as it is
//! written: a crash can lose at most the record in flight.
//!
//! Any open or write failure disables the sink for the remainder of the
//! session. Records offered after that are counted, not retried.

use chrono::Local;
use log::{error, info};
use regex::Regex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

enum SinkState {
    Closed,
    Open { writer: BufWriter<File>, path: PathBuf },
    Dead,
}

/// Lazily opened, line-oriented fallback log writer.
pub struct FileSink {
    state: SinkState,
    lines_written: u64,
    lines_lost: u64,
}

impl FileSink {
    pub fn new() -> Self {
        Self {
            state: SinkState::Closed,
            lines_written: 0,
            lines_lost: 0,
        }
    }

    /// Append one serialized record as a line, opening the log on first
    /// use. Returns whether the line reached the file.
    pub fn append(&mut self, dir: &Path, prefix: &str, line: &str) -> bool {
        if let SinkState::Closed = self.state {
            match Self::open(dir, prefix) {
                Ok((writer, path)) => {
                    info!("[telemetry] writing to {}...", path.display());
                    self.state = SinkState::Open { writer, path };
                }
                Err(e) => {
                    error!(
                        "[telemetry] failed to open log under {}: {}; file sink disabled for this session",
                        dir.display(),
                        e
                    );
                    self.state = SinkState::Dead;
                }
            }
        }

        let SinkState::Open { writer, path } = &mut self.state else {
            self.lines_lost += 1;
            return false;
        };

        match Self::write_line(writer, line) {
            Ok(()) => {
                self.lines_written += 1;
                true
            }
            Err(e) => {
                error!(
                    "[telemetry] write to {} failed: {}; file sink disabled for this session",
                    path.display(),
                    e
                );
                self.state = SinkState::Dead;
                self.lines_lost += 1;
                false
            }
        }
    }

    fn open(dir: &Path, prefix: &str) -> io::Result<(BufWriter<File>, PathBuf)> {
        fs::create_dir_all(dir)?;
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let path = dir.join(format!("{}_{}.jsonl", sanitize_file_stem(prefix), stamp));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok((BufWriter::new(file), path))
    }

    fn write_line(writer: &mut BufWriter<File>, line: &str) -> io::Result<()> {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.state {
            SinkState::Open { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.state, SinkState::Dead)
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Lines offered while the sink was dead.
    pub fn lines_lost(&self) -> u64 {
        self.lines_lost
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace any character outside `[\w\s.]` so a configured prefix cannot
/// inject path separators into the log file name.
pub fn sanitize_file_stem(stem: &str) -> String {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    let invalid = INVALID.get_or_init(|| Regex::new(r"[^\w\s.]").expect("static pattern"));
    invalid.replace_all(stem, "_").into_owned()
}
