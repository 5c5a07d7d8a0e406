//! Source mutation detection for file-backed screens.
//!
//! Once a read cycle has finished, the screen polls [`FileWatch::check`] on every tick.
//! A newer modification time either resumes reading at the last offset, rewinds after a
//! truncation, or (watch mode, filtered sources) reloads the whole file.

use crate::buffer::source::{open_file, ChildProcess, WatchTarget};
use crate::error::{FlowlessError, Result};
use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::SystemTime;

/// What a file change does to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadPolicy {
    /// Append whatever was written past the last read offset.
    #[default]
    Tail,
    /// Replace the buffer with a fresh read of the whole file.
    Rewatch,
}

pub enum TailEvent {
    Unchanged,
    /// New data past `offset`; ingest into the same store.
    Appended {
        reader: Box<dyn Read + Send>,
        offset: u64,
    },
    /// The file shrank below the last read offset; re-read from the start.
    Truncated { reader: Box<dyn Read + Send> },
    /// Start over in a new store.
    Reloaded {
        reader: Box<dyn Read + Send>,
        process: Option<ChildProcess>,
    },
}

#[derive(Debug, Clone)]
pub struct FileWatch {
    path: PathBuf,
    filter: Option<String>,
    policy: ReloadPolicy,
    mtime: SystemTime,
    offset: u64,
}

impl FileWatch {
    /// Watch `target`, treating its current modification time as already seen.
    pub fn new(target: WatchTarget, policy: ReloadPolicy) -> Self {
        let mtime = modified(&target.path).unwrap_or(SystemTime::UNIX_EPOCH);
        Self {
            path: target.path,
            filter: target.filter,
            policy,
            mtime,
            offset: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Remember where the finished read cycle stopped.
    pub fn record_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    pub fn check(&mut self) -> Result<TailEvent> {
        let meta = match fs::metadata(&self.path) {
            Ok(meta) => meta,
            // Rotated away; keep what we have until it reappears.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(TailEvent::Unchanged),
            Err(err) => {
                return Err(FlowlessError::file_error(
                    format!("cannot stat {}", self.path.display()),
                    err,
                ))
            }
        };
        let mtime = meta.modified()?;
        if mtime <= self.mtime {
            return Ok(TailEvent::Unchanged);
        }
        self.mtime = mtime;

        let mut file = open_file(&self.path)?;

        if let Some(command) = &self.filter {
            let mut process = ChildProcess::spawn(command, Stdio::from(file))?;
            let stdout = process.take_stdout(command)?;
            self.offset = 0;
            return Ok(TailEvent::Reloaded {
                reader: Box::new(stdout),
                process: Some(process),
            });
        }

        if self.policy == ReloadPolicy::Rewatch {
            self.offset = 0;
            return Ok(TailEvent::Reloaded {
                reader: Box::new(file),
                process: None,
            });
        }

        if meta.len() < self.offset {
            log::debug!(
                "{} truncated: {} < {}",
                self.path.display(),
                meta.len(),
                self.offset
            );
            self.offset = 0;
            return Ok(TailEvent::Truncated {
                reader: Box::new(file),
            });
        }

        file.seek(SeekFrom::Start(self.offset))?;
        Ok(TailEvent::Appended {
            reader: Box::new(file),
            offset: self.offset,
        })
    }
}

fn modified(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}
