//! Partitioned-log provider contract.
//!
//! The log itself is an external collaborator: one logical partition per
//! cursor, at-least-once delivery, monotonically increasing sequence tokens.
//! Iterators expire after a provider-defined TTL and must be treated as
//! opaque and non-durable; only the sequence token survives.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::Result;

/// Durable position marker within a partition.
///
/// Opaque but ordered: within one partition a later record always carries a
/// greater token, so lexicographic comparison is positional comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceToken(pub String);

impl SequenceToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SequenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SequenceToken {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Ephemeral provider-issued read handle. May be rejected at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardIterator(pub String);

impl fmt::Display for ShardIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One record read from the partition
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRecord {
    pub sequence: SequenceToken,
    pub data: Value,
}

/// One batch read, together with the follow-up iterator
#[derive(Debug, Clone)]
pub struct RecordBatch {
    pub records: Vec<StreamRecord>,
    pub next_iterator: ShardIterator,
}

/// Read side of the partitioned event log.
#[async_trait]
pub trait ShardStream: Send + Sync {
    /// Iterator positioned after the most recent record (skips all backlog).
    async fn latest_iterator(&self) -> Result<ShardIterator>;

    /// Iterator positioned strictly after `watermark`.
    async fn iterator_after(&self, watermark: &SequenceToken) -> Result<ShardIterator>;

    /// Read up to `limit` records. Callers advance by switching to
    /// [`RecordBatch::next_iterator`]; the passed iterator should not be
    /// reused. Fails with `CursorExpired` when the provider rejects the
    /// handle and `StreamUnavailable` when the partition cannot be reached.
    async fn read_batch(&self, iterator: &ShardIterator, limit: usize) -> Result<RecordBatch>;
}
