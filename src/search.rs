//! Pattern compilation, highlight partitioning and buffer scans.

pub mod pattern;
pub mod scan;

pub use pattern::{SearchOptions, SearchPattern, Span};
pub use scan::{scan_backward, scan_forward, ScanResult};
