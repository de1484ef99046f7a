//! Cursor Manager
//!
//! Tracks a resumable read position within a partitioned event log. The
//! durable watermark survives iterator expiry; the ephemeral iterator is
//! rebuilt from it transparently. One mutex serializes the combined
//! read-modify-write of `{iterator, watermark}` across concurrent callers,
//! so racing fetches can neither lose updates nor deliver a batch twice.
//!
//! Instances are owned and passed by the caller; there is no process-global
//! cursor.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{CursorPhase, CursorStatus};
use crate::error::{GridironError, Result};
use crate::stream::provider::{SequenceToken, ShardIterator, ShardStream, StreamRecord};

/// Records returned by one `fetch`, plus whether anything new arrived
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub records: Vec<StreamRecord>,
    pub has_new_data: bool,
}

impl FetchResult {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            has_new_data: false,
        }
    }
}

#[derive(Debug)]
struct CursorState {
    watermark: Option<SequenceToken>,
    iterator: Option<ShardIterator>,
    phase: CursorPhase,
}

impl CursorState {
    fn new() -> Self {
        Self {
            watermark: None,
            iterator: None,
            phase: CursorPhase::Uninitialized,
        }
    }

    fn advance(&mut self, to: CursorPhase) {
        if self.phase == to {
            return;
        }
        debug_assert!(
            self.phase.can_transition_to(to),
            "invalid cursor transition {} -> {}",
            self.phase,
            to
        );
        debug!(from = %self.phase, to = %to, "cursor phase transition");
        self.phase = to;
    }

    /// Watermarks only move forward; a regressing token is dropped.
    fn advance_watermark(&mut self, token: SequenceToken) {
        let regresses = self
            .watermark
            .as_ref()
            .is_some_and(|current| token <= *current);
        if regresses {
            debug!(token = %token, "ignoring non-advancing sequence token");
            return;
        }
        self.watermark = Some(token);
    }
}

/// Resumable cursor over one logical partition of an event log.
pub struct CursorManager {
    stream: Arc<dyn ShardStream>,
    state: Mutex<CursorState>,
}

impl CursorManager {
    pub fn new(stream: Arc<dyn ShardStream>) -> Self {
        Self {
            stream,
            state: Mutex::new(CursorState::new()),
        }
    }

    /// Fetch the next batch of records, at most `limit`.
    ///
    /// The first call positions "after the watermark" when one exists,
    /// otherwise "at latest" (deliberately skipping all backlog). A rejected
    /// iterator parks the cursor in STALE and yields an empty batch; the
    /// following call rebuilds from the preserved watermark, so expiry is
    /// invisible to callers beyond one possibly-empty response.
    /// `StreamUnavailable` is surfaced as an error with the watermark left
    /// untouched, so a later attempt resumes cleanly.
    pub async fn fetch(&self, limit: usize) -> Result<FetchResult> {
        let mut state = self.state.lock().await;

        let iterator = match state.iterator.clone() {
            Some(iterator) => iterator,
            None => {
                let iterator = self.acquire_iterator(state.watermark.as_ref()).await?;
                state.iterator = Some(iterator.clone());
                state.advance(CursorPhase::Iterating);
                iterator
            }
        };

        match self.stream.read_batch(&iterator, limit).await {
            Ok(batch) => {
                state.iterator = Some(batch.next_iterator);
                if let Some(last) = batch.records.last() {
                    state.advance_watermark(last.sequence.clone());
                }
                let has_new_data = !batch.records.is_empty();
                Ok(FetchResult {
                    records: batch.records,
                    has_new_data,
                })
            }
            Err(GridironError::CursorExpired(reason)) => {
                warn!(%reason, "shard iterator rejected; will rebuild from watermark");
                state.iterator = None;
                state.advance(CursorPhase::Stale);
                Ok(FetchResult::empty())
            }
            Err(e) => Err(e),
        }
    }

    /// Discard both watermark and iterator. The next fetch starts "from
    /// latest", dropping anything unread — an explicit operation for
    /// unsticking a wedged consumer, never invoked automatically.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.watermark = None;
        state.iterator = None;
        state.advance(CursorPhase::Uninitialized);
        info!("cursor reset; next fetch starts from latest");
    }

    /// Point-in-time phase and watermark, for status endpoints.
    pub async fn status(&self) -> CursorStatus {
        let state = self.state.lock().await;
        CursorStatus {
            phase: state.phase,
            watermark: state.watermark.as_ref().map(|t| t.0.clone()),
        }
    }

    async fn acquire_iterator(
        &self,
        watermark: Option<&SequenceToken>,
    ) -> Result<ShardIterator> {
        match watermark {
            Some(watermark) => self.stream.iterator_after(watermark).await,
            None => self.stream.latest_iterator().await,
        }
    }
}
