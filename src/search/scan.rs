//! Linear scans over a [`LineStore`] for the next or previous match.

use crate::buffer::LineStore;
use crate::search::pattern::SearchPattern;

/// Lines copied out of the store per read-lock acquisition.
const SCAN_CHUNK: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanResult {
    Found(usize),
    /// Nothing matched before `len`, where the scan ran out of loaded lines.
    Exhausted { len: usize },
}

/// First index `>= start` whose line matches.
pub fn scan_forward(store: &LineStore, pattern: &SearchPattern, start: usize) -> ScanResult {
    let mut index = start;
    loop {
        let chunk = store.range(index, index.saturating_add(SCAN_CHUNK));
        if chunk.is_empty() {
            return ScanResult::Exhausted { len: index };
        }
        if let Some(offset) = chunk.iter().position(|line| pattern.is_match(&line.text)) {
            return ScanResult::Found(index + offset);
        }
        index += chunk.len();
    }
}

/// Last index `<= start` whose line matches. `start` is clamped to the loaded range.
pub fn scan_backward(store: &LineStore, pattern: &SearchPattern, start: usize) -> Option<usize> {
    let len = store.len();
    if len == 0 {
        return None;
    }
    let mut end = start.min(len - 1) + 1;
    while end > 0 {
        let begin = end.saturating_sub(SCAN_CHUNK);
        let chunk = store.range(begin, end);
        if let Some(offset) = chunk.iter().rposition(|line| pattern.is_match(&line.text)) {
            return Some(begin + offset);
        }
        end = begin;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchOptions;

    fn pattern(text: &str) -> SearchPattern {
        SearchPattern::compile(text, SearchOptions::default()).unwrap()
    }

    #[test]
    fn forward_finds_first_match_from_start() {
        let store = LineStore::from_text("a\nb\nc\nb");
        assert_eq!(scan_forward(&store, &pattern("b"), 0), ScanResult::Found(1));
        assert_eq!(scan_forward(&store, &pattern("b"), 2), ScanResult::Found(3));
    }

    #[test]
    fn forward_reports_length_when_exhausted() {
        let store = LineStore::from_text("a\nb\nc");
        assert_eq!(
            scan_forward(&store, &pattern("z"), 0),
            ScanResult::Exhausted { len: 3 }
        );
        assert_eq!(
            scan_forward(&store, &pattern("a"), 7),
            ScanResult::Exhausted { len: 7 }
        );
    }

    #[test]
    fn forward_crosses_chunk_boundaries() {
        let text: String = (0..SCAN_CHUNK * 2 + 5)
            .map(|i| if i == SCAN_CHUNK * 2 + 3 { "needle\n".to_string() } else { format!("{i}\n") })
            .collect();
        let store = LineStore::from_text(&text);
        assert_eq!(
            scan_forward(&store, &pattern("needle"), 0),
            ScanResult::Found(SCAN_CHUNK * 2 + 3)
        );
    }

    #[test]
    fn backward_finds_last_match_at_or_before_start() {
        let store = LineStore::from_text("b\na\nb\nc");
        assert_eq!(scan_backward(&store, &pattern("b"), 3), Some(2));
        assert_eq!(scan_backward(&store, &pattern("b"), 1), Some(0));
        assert_eq!(scan_backward(&store, &pattern("c"), 100), Some(3));
        assert_eq!(scan_backward(&store, &pattern("z"), 3), None);
    }

    #[test]
    fn backward_on_empty_store() {
        let store = LineStore::from_text("");
        assert_eq!(scan_backward(&store, &pattern("a"), 0), None);
    }
}
