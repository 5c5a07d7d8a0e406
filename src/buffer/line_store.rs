//! Append-only concurrent line buffer with producer backpressure.
//!
//! Exactly one ingestion thread appends; the UI thread and scans read. Readers take the
//! read lock only for the duration of an index lookup or a short range copy, so they never
//! hold up the producer for long. The producer parks in [`LineStore::wait_for_room`] while
//! it is more than `capacity` lines ahead of the view, unless buffering is unlimited.

use chrono::{DateTime, Local};
use parking_lot::{Condvar, Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// One ingested line. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    /// 1-based sequence number within the store's current numbering.
    pub seq: u64,
    /// Capture time, present only when timestamping was enabled during ingestion.
    pub timestamp: Option<DateTime<Local>>,
}

impl Line {
    pub fn new(text: impl Into<String>, seq: u64) -> Self {
        Self {
            text: text.into(),
            seq,
            timestamp: None,
        }
    }
}

#[derive(Debug)]
pub struct LineStore {
    lines: RwLock<Vec<Arc<Line>>>,
    next_seq: AtomicU64,
    capacity: usize,
    consumer_y: AtomicUsize,
    unlimited: AtomicBool,
    eof: AtomicBool,
    closed: AtomicBool,
    read_offset: AtomicU64,
    room_lock: Mutex<()>,
    room: Condvar,
}

impl LineStore {
    /// Empty store that is still loading.
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: RwLock::new(Vec::new()),
            next_seq: AtomicU64::new(0),
            capacity,
            consumer_y: AtomicUsize::new(0),
            unlimited: AtomicBool::new(false),
            eof: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            read_offset: AtomicU64::new(0),
            room_lock: Mutex::new(()),
            room: Condvar::new(),
        }
    }

    /// Store populated up front (help text, filtered views); already at end-of-stream.
    pub fn from_lines(lines: impl IntoIterator<Item = Line>) -> Self {
        let store = Self::new(usize::MAX);
        for line in lines {
            store.append_line(line);
        }
        store.mark_eof();
        store
    }

    /// Store holding `text` split into lines and numbered from 1.
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(
            text.lines()
                .enumerate()
                .map(|(idx, line)| Line::new(line, idx as u64 + 1)),
        )
    }

    /// Append a freshly ingested line and return its sequence number.
    pub fn append(&self, text: String, timestamp: Option<DateTime<Local>>) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.lines.write().push(Arc::new(Line {
            text,
            seq,
            timestamp,
        }));
        seq
    }

    /// Append a line that keeps its original numbering.
    pub fn append_line(&self, line: Line) {
        self.next_seq.fetch_max(line.seq, Ordering::SeqCst);
        self.lines.write().push(Arc::new(line));
    }

    pub fn len(&self) -> usize {
        self.lines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Arc<Line>> {
        self.lines.read().get(index).cloned()
    }

    /// Copy out the lines in `start..end`, clamped to the current length.
    pub fn range(&self, start: usize, end: usize) -> Vec<Arc<Line>> {
        let lines = self.lines.read();
        let end = end.min(lines.len());
        if start >= end {
            return Vec::new();
        }
        lines[start..end].to_vec()
    }

    pub fn snapshot(&self) -> Vec<Arc<Line>> {
        self.lines.read().clone()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_unlimited(&self) -> bool {
        self.unlimited.load(Ordering::SeqCst)
    }

    pub fn set_unlimited(&self, unlimited: bool) {
        self.unlimited.store(unlimited, Ordering::SeqCst);
        self.wake_producer();
    }

    /// Record where the consumer has read up to and let the producer re-check its budget.
    pub fn set_consumer_y(&self, y: usize) {
        self.consumer_y.store(y, Ordering::SeqCst);
        self.wake_producer();
    }

    pub fn consumer_y(&self) -> usize {
        self.consumer_y.load(Ordering::SeqCst)
    }

    /// Producer side: block until the unread backlog fits the capacity.
    ///
    /// Returns `false` once the store is closed; the producer should stop reading.
    pub fn wait_for_room(&self) -> bool {
        let mut guard = self.room_lock.lock();
        while !self.has_room() {
            self.room.wait(&mut guard);
        }
        !self.is_closed()
    }

    fn has_room(&self) -> bool {
        if self.is_unlimited() || self.is_closed() {
            return true;
        }
        self.len().saturating_sub(self.consumer_y()) <= self.capacity
    }

    fn wake_producer(&self) {
        let _guard = self.room_lock.lock();
        self.room.notify_all();
    }

    pub fn is_eof(&self) -> bool {
        self.eof.load(Ordering::SeqCst)
    }

    pub fn is_loading(&self) -> bool {
        !self.is_eof()
    }

    pub fn mark_eof(&self) {
        self.eof.store(true, Ordering::SeqCst);
    }

    /// Start another read cycle (tail resumption) on the same store.
    pub fn begin_cycle(&self) {
        self.eof.store(false, Ordering::SeqCst);
    }

    /// Restart sequence numbering at 1 for the next appended line.
    pub fn reset_numbering(&self) {
        self.next_seq.store(0, Ordering::SeqCst);
    }

    pub fn read_offset(&self) -> u64 {
        self.read_offset.load(Ordering::SeqCst)
    }

    pub fn set_read_offset(&self, offset: u64) {
        self.read_offset.store(offset, Ordering::SeqCst);
    }

    /// Teardown: lift the bound and tell the producer to stop.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.unlimited.store(true, Ordering::SeqCst);
        self.wake_producer();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
