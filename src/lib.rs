pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod normalizer;
pub mod services;
pub mod stream;

pub use config::AppConfig;
pub use domain::{
    CursorPhase, PlayEvent, PredictedPlay, PredictionSet, PressureRisk, SituationSnapshot,
};
pub use error::{GridironError, Result};
pub use ingest::{EspnUpstream, LivePoller, Upstream};
pub use services::Metrics;
pub use stream::{CursorManager, EventSink, MemoryLog, PlayDeduplicator, ShardStream};
