use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::services::Metrics;
use crate::stream::CursorManager;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Cursor over the play-event log, injected by the binary
    pub cursor: Arc<CursorManager>,

    /// Shared pipeline counters
    pub metrics: Arc<Metrics>,

    /// Logical name of the stream being served
    pub stream_name: String,

    /// Application start time
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(cursor: Arc<CursorManager>, metrics: Arc<Metrics>, stream_name: String) -> Self {
        Self {
            cursor,
            metrics,
            stream_name,
            started_at: Utc::now(),
        }
    }
}
