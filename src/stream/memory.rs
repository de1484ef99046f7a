//! In-process single-partition log.
//!
//! Implements both sides of the stream contract so the whole pipeline can
//! run without external infrastructure: the poller publishes through
//! [`EventSink`] and the query path reads back through [`ShardStream`].
//! Sequence tokens are zero-padded append indices, so lexicographic order is
//! append order. Iterators are single-use handles; `expire_iterators` and
//! `set_unavailable` let tests and demos exercise the provider failure modes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::domain::PlayEvent;
use crate::error::{GridironError, Result};
use crate::stream::provider::{
    RecordBatch, SequenceToken, ShardIterator, ShardStream, StreamRecord,
};
use crate::stream::sink::EventSink;

pub struct MemoryLog {
    name: String,
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
}

#[derive(Default)]
struct Inner {
    records: Vec<StreamRecord>,
    /// Outstanding iterator handles and the index they will read next
    iterators: HashMap<String, usize>,
    issued: u64,
}

impl Inner {
    fn issue_iterator(&mut self, position: usize) -> ShardIterator {
        self.issued += 1;
        let handle = format!("it-{:08}", self.issued);
        self.iterators.insert(handle.clone(), position);
        ShardIterator(handle)
    }
}

impl MemoryLog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Mutex::new(Inner::default()),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of records appended so far
    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Invalidate every outstanding iterator, as a provider TTL would.
    pub async fn expire_iterators(&self) {
        self.inner.lock().await.iterators.clear();
    }

    /// Simulate a partition outage; all calls fail until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GridironError::StreamUnavailable(format!(
                "partition '{}' unreachable",
                self.name
            )));
        }
        Ok(())
    }

    fn sequence_for(index: usize) -> SequenceToken {
        SequenceToken(format!("{:020}", index + 1))
    }

    /// Append an arbitrary payload. The log itself is schema-agnostic; only
    /// the sink side is typed.
    pub async fn append_value(&self, data: serde_json::Value) -> Result<SequenceToken> {
        self.check_available()?;
        let mut inner = self.inner.lock().await;
        let sequence = Self::sequence_for(inner.records.len());
        inner.records.push(StreamRecord {
            sequence: sequence.clone(),
            data,
        });
        Ok(sequence)
    }
}

#[async_trait]
impl ShardStream for MemoryLog {
    async fn latest_iterator(&self) -> Result<ShardIterator> {
        self.check_available()?;
        let mut inner = self.inner.lock().await;
        let position = inner.records.len();
        Ok(inner.issue_iterator(position))
    }

    async fn iterator_after(&self, watermark: &SequenceToken) -> Result<ShardIterator> {
        self.check_available()?;
        let mut inner = self.inner.lock().await;
        let position = inner
            .records
            .partition_point(|record| record.sequence <= *watermark);
        Ok(inner.issue_iterator(position))
    }

    async fn read_batch(&self, iterator: &ShardIterator, limit: usize) -> Result<RecordBatch> {
        self.check_available()?;
        let mut inner = self.inner.lock().await;

        let Some(position) = inner.iterators.remove(&iterator.0) else {
            return Err(GridironError::CursorExpired(format!(
                "iterator {} is unknown or expired",
                iterator
            )));
        };

        let end = (position + limit).min(inner.records.len());
        let records = inner.records[position..end].to_vec();
        let next_iterator = inner.issue_iterator(end);

        Ok(RecordBatch {
            records,
            next_iterator,
        })
    }
}

#[async_trait]
impl EventSink for MemoryLog {
    async fn publish(&self, event: &PlayEvent) -> Result<()> {
        let data = serde_json::to_value(event)?;
        self.append_value(data).await?;
        Ok(())
    }
}
