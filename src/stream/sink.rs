//! Write side of the partitioned event log.

use async_trait::async_trait;
use tracing::info;

use crate::domain::PlayEvent;
use crate::error::Result;

/// Destination for canonical play events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: &PlayEvent) -> Result<()>;
}

/// Sink that logs would-be events instead of publishing them.
pub struct DryRunSink;

#[async_trait]
impl EventSink for DryRunSink {
    async fn publish(&self, event: &PlayEvent) -> Result<()> {
        info!(
            game_id = %event.game_id,
            posteam = %event.posteam,
            down = event.down,
            ydstogo = event.ydstogo,
            yardline_100 = event.yardline_100,
            "[dry-run] would publish play event"
        );
        Ok(())
    }
}
