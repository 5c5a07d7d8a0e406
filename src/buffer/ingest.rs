//! Ingestion pipeline: one producer thread per read cycle feeding a [`LineStore`].

use crate::buffer::line_store::LineStore;
use bstr::ByteSlice;
use chrono::Local;
use memchr::memchr_iter;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Size of the first read used to seed the buffer before the line loop starts.
const SEED_BYTES: usize = 64 * 1024;

/// What the reader is attached to, which decides what happens at end-of-stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderKind {
    /// Process pipe, stdin or remote body: end-of-stream ends ingestion.
    Stream,
    /// Regular file: ends, the screen may resume from the recorded offset later.
    File(PathBuf),
    /// Named pipe: reopened at end-of-stream so new writers keep feeding the store.
    Fifo(PathBuf),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// Stamp every line with the wall-clock time it was read.
    pub timestamps: bool,
}

/// Summary returned when a read cycle finishes.
#[derive(Debug)]
pub struct IngestReport {
    pub lines: u64,
    /// Byte offset in the source after the last byte read.
    pub offset: u64,
    pub error: Option<io::Error>,
}

/// Handle on a running ingestion thread.
#[derive(Debug)]
pub struct IngestHandle {
    handle: JoinHandle<IngestReport>,
}

impl IngestHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> IngestReport {
        self.handle.join().unwrap_or_else(|_| IngestReport {
            lines: 0,
            offset: 0,
            error: Some(io::Error::new(io::ErrorKind::Other, "ingestion thread panicked")),
        })
    }
}

/// Start a read cycle. The store is marked loading before this returns.
pub fn spawn_ingest(
    store: Arc<LineStore>,
    reader: Box<dyn Read + Send>,
    kind: ReaderKind,
    start_offset: u64,
    options: IngestOptions,
) -> IngestHandle {
    store.begin_cycle();
    store.set_read_offset(start_offset);

    let handle = thread::spawn(move || {
        let mut ingestor = Ingestor {
            store: Arc::clone(&store),
            options,
            offset: start_offset,
            lines: 0,
        };
        log::debug!("ingest start: {kind:?} at offset {start_offset}");
        let error = ingestor.run(reader, &kind).err();
        if let Some(err) = &error {
            log::warn!("ingest failed after {} lines: {err}", ingestor.lines);
        }
        log::debug!(
            "ingest end: {} lines, offset {}",
            ingestor.lines,
            ingestor.offset
        );

        store.set_read_offset(ingestor.offset);
        store.mark_eof();
        IngestReport {
            lines: ingestor.lines,
            offset: ingestor.offset,
            error,
        }
    });

    IngestHandle { handle }
}

#[derive(Debug, PartialEq, Eq)]
enum Drain {
    EndOfStream,
    Stopped,
}

struct Ingestor {
    store: Arc<LineStore>,
    options: IngestOptions,
    offset: u64,
    lines: u64,
}

impl Ingestor {
    fn run(&mut self, mut reader: Box<dyn Read + Send>, kind: &ReaderKind) -> io::Result<()> {
        loop {
            if self.drain(reader)? == Drain::Stopped || self.store.is_closed() {
                return Ok(());
            }
            match kind {
                ReaderKind::Fifo(path) => {
                    log::debug!("reopening named pipe {}", path.display());
                    reader = Box::new(File::open(path)?);
                }
                ReaderKind::Stream | ReaderKind::File(_) => return Ok(()),
            }
        }
    }

    /// Read one stream to its end.
    fn drain(&mut self, mut reader: Box<dyn Read + Send>) -> io::Result<Drain> {
        let mut seed = vec![0u8; SEED_BYTES];
        let n = read_some(&mut reader, &mut seed)?;
        if n == 0 {
            return Ok(Drain::EndOfStream);
        }
        self.offset += n as u64;

        let mut start = 0;
        for newline in memchr_iter(b'\n', &seed[..n]) {
            if !self.emit(&seed[start..newline]) {
                return Ok(Drain::Stopped);
            }
            start = newline + 1;
        }
        let mut pending = seed[start..n].to_vec();
        drop(seed);

        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            buf.append(&mut pending);
            let read = reader.read_until(b'\n', &mut buf)?;
            self.offset += read as u64;
            if buf.is_empty() {
                return Ok(Drain::EndOfStream);
            }
            if !self.emit(&buf) {
                return Ok(Drain::Stopped);
            }
            if read == 0 {
                return Ok(Drain::EndOfStream);
            }
        }
    }

    /// Append one line; false when the store was closed while we waited for room.
    fn emit(&mut self, raw: &[u8]) -> bool {
        let text = strip_terminator(raw).to_str_lossy().into_owned();
        let timestamp = self.options.timestamps.then(Local::now);
        self.store.append(text, timestamp);
        self.lines += 1;
        self.store.wait_for_room()
    }
}

fn read_some(reader: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

fn strip_terminator(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ingest_bytes(bytes: &'static [u8], options: IngestOptions) -> (Arc<LineStore>, IngestReport) {
        let store = Arc::new(LineStore::new(usize::MAX));
        let handle = spawn_ingest(
            Arc::clone(&store),
            Box::new(Cursor::new(bytes)),
            ReaderKind::Stream,
            0,
            options,
        );
        let report = handle.join();
        (store, report)
    }

    fn texts(store: &LineStore) -> Vec<String> {
        store.snapshot().iter().map(|l| l.text.clone()).collect()
    }

    #[test]
    fn splits_lines_and_keeps_trailing_partial() {
        let (store, report) = ingest_bytes(b"one\r\ntwo\nthr", IngestOptions::default());
        assert_eq!(texts(&store), vec!["one", "two", "thr"]);
        assert_eq!(report.offset, 13);
        assert_eq!(report.lines, 3);
        assert!(report.error.is_none());
        assert!(store.is_eof());
        assert_eq!(store.read_offset(), 13);
    }

    #[test]
    fn empty_input_marks_eof_without_lines() {
        let (store, report) = ingest_bytes(b"", IngestOptions::default());
        assert!(store.is_empty());
        assert!(store.is_eof());
        assert_eq!(report.offset, 0);
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let (store, _) = ingest_bytes(b"ok\n\xffbad\n", IngestOptions::default());
        assert_eq!(store.get(1).unwrap().text, "\u{FFFD}bad");
    }

    #[test]
    fn timestamps_only_when_requested() {
        let (plain, _) = ingest_bytes(b"a\n", IngestOptions::default());
        assert!(plain.get(0).unwrap().timestamp.is_none());

        let (stamped, _) = ingest_bytes(b"a\n", IngestOptions { timestamps: true });
        assert!(stamped.get(0).unwrap().timestamp.is_some());
    }

    #[test]
    fn lines_longer_than_the_seed_are_joined() {
        let long = "x".repeat(SEED_BYTES + 10);
        let input: &'static [u8] = Box::leak(format!("{long}\nend\n").into_bytes().into_boxed_slice());
        let (store, _) = ingest_bytes(input, IngestOptions::default());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().text.len(), SEED_BYTES + 10);
        assert_eq!(store.get(1).unwrap().text, "end");
    }

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
            }
            self.served = true;
            let data = b"first\nsec";
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    #[test]
    fn read_error_ends_ingestion() {
        let store = Arc::new(LineStore::new(usize::MAX));
        let report = spawn_ingest(
            Arc::clone(&store),
            Box::new(FailingReader { served: false }),
            ReaderKind::Stream,
            0,
            IngestOptions::default(),
        )
        .join();
        assert_eq!(texts(&store), vec!["first"]);
        assert_eq!(report.error.unwrap().kind(), io::ErrorKind::BrokenPipe);
        assert!(store.is_eof());
    }

    #[test]
    fn start_offset_is_carried_into_the_report() {
        let store = Arc::new(LineStore::new(usize::MAX));
        let report = spawn_ingest(
            Arc::clone(&store),
            Box::new(Cursor::new(b"tail\n".to_vec())),
            ReaderKind::Stream,
            100,
            IngestOptions::default(),
        )
        .join();
        assert_eq!(report.offset, 105);
    }

    #[cfg(unix)]
    #[test]
    fn named_pipe_is_reopened_after_each_writer() {
        use nix::sys::stat::Mode;
        use std::io::Write;
        use std::time::{Duration, Instant};

        let dir = tempfile::tempdir().unwrap();
        let fifo = dir.path().join("feed");
        nix::unistd::mkfifo(&fifo, Mode::S_IRUSR | Mode::S_IWUSR).unwrap();

        let store = Arc::new(LineStore::new(usize::MAX));
        let reader_store = Arc::clone(&store);
        let reader_path = fifo.clone();
        let opener = thread::spawn(move || {
            let file = File::open(&reader_path).unwrap();
            spawn_ingest(
                reader_store,
                Box::new(file),
                ReaderKind::Fifo(reader_path),
                0,
                IngestOptions::default(),
            )
        });

        for text in ["a\n", "b\n"] {
            let mut writer = std::fs::OpenOptions::new().write(true).open(&fifo).unwrap();
            writer.write_all(text.as_bytes()).unwrap();
        }

        let deadline = Instant::now() + Duration::from_secs(5);
        while store.len() < 2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(texts(&store), vec!["a", "b"]);
        assert!(store.is_loading(), "a named pipe keeps loading between writers");

        let handle = opener.join().unwrap();
        store.close();
        // Wakes a reader blocked in reopen; fails harmlessly when it already stopped.
        use std::os::unix::fs::OpenOptionsExt;
        let _ = std::fs::OpenOptions::new()
            .write(true)
            .custom_flags(nix::fcntl::OFlag::O_NONBLOCK.bits())
            .open(&fifo);
        handle.join();
        assert!(store.is_eof());
    }
}
