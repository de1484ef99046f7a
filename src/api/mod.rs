pub mod handlers;
pub mod routes;
pub mod state;
pub mod types;

pub use routes::create_router;
pub use state::AppState;

use std::net::SocketAddr;
use tracing::info;

use crate::error::{GridironError, Result};

/// Bind and serve the API until the task is cancelled.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| GridironError::Internal(format!("API server error: {e}")))?;

    Ok(())
}
