//! Line buffering: the shared store, the ingestion thread feeding it, and the sources
//! it reads from.

pub mod ingest;
pub mod line_store;
pub mod source;
pub mod tail;

pub use ingest::{spawn_ingest, IngestHandle, IngestOptions, IngestReport, ReaderKind};
pub use line_store::{Line, LineStore};
pub use source::{ChildProcess, OpenedSource, PipeGuard, SourceArgs, SourceRequest, WatchTarget};
pub use tail::{FileWatch, ReloadPolicy, TailEvent};
