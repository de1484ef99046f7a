pub mod cursor;
pub mod dedup;
pub mod memory;
pub mod provider;
pub mod sink;

pub use cursor::{CursorManager, FetchResult};
pub use dedup::{PlayDeduplicator, PlayKey};
pub use memory::MemoryLog;
pub use provider::{RecordBatch, SequenceToken, ShardIterator, ShardStream, StreamRecord};
pub use sink::{DryRunSink, EventSink};
