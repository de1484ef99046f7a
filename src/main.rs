use clap::Parser;
use gridiron::api::{self, AppState};
use gridiron::cli::{self, Cli, Commands};
use gridiron::config::AppConfig;
use gridiron::domain::PlayEvent;
use gridiron::error::{GridironError, Result};
use gridiron::ingest::{EspnUpstream, LivePoller};
use gridiron::services::Metrics;
use gridiron::stream::{CursorManager, DryRunSink, EventSink, MemoryLog, ShardStream};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { port, no_poll } => {
            let config = load_config(&cli)?;
            init_logging(&config);
            run_serve(config, *port, *no_poll).await?;
        }
        Commands::Poll { interval } => {
            let config = load_config(&cli)?;
            init_logging(&config);
            run_poll(config, *interval).await;
        }
        Commands::Replay { file, port } => {
            let config = load_config(&cli)?;
            init_logging(&config);
            run_replay(config, file, *port).await?;
        }
        Commands::Predict {
            down,
            ydstogo,
            yardline,
            qtr,
            half_seconds,
            score_diff,
            shotgun,
            defenders_in_box,
            pass_rushers,
        } => {
            init_logging_simple();
            cli::run_prediction(
                *down,
                *ydstogo,
                *yardline,
                *qtr,
                *half_seconds,
                *score_diff,
                *shotgun,
                *defenders_in_box,
                *pass_rushers,
            )?;
        }
        Commands::Test => {
            init_logging_simple();
            let config = AppConfig::load_from(&cli.config)?;
            let upstream =
                EspnUpstream::new(&config.upstream.base_url, config.upstream.timeout())?;
            cli::test_connection(&upstream).await?;
        }
    }

    Ok(())
}

/// Load and validate configuration; missing required values halt startup.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = AppConfig::load_from(&cli.config)?;
    if let Err(errors) = config.validate() {
        return Err(GridironError::MissingConfig(errors.join("; ")));
    }
    Ok(config)
}

/// Full pipeline: poller feeding an in-process log, API serving from it.
async fn run_serve(config: AppConfig, port: Option<u16>, no_poll: bool) -> Result<()> {
    let port = port.unwrap_or(config.api.port);
    let metrics = Arc::new(Metrics::new());
    let log = Arc::new(MemoryLog::new(&config.stream.name));

    let cursor = Arc::new(CursorManager::new(log.clone() as Arc<dyn ShardStream>));
    let state = AppState::new(cursor, metrics.clone(), config.stream.name.clone());

    if !no_poll {
        let upstream = Arc::new(EspnUpstream::new(
            &config.upstream.base_url,
            config.upstream.timeout(),
        )?);
        let sink = log.clone() as Arc<dyn EventSink>;
        let interval = config.upstream.interval();
        let poller_metrics = metrics.clone();

        tokio::spawn(async move {
            let mut poller = LivePoller::new(upstream, sink, poller_metrics);
            poller.run(interval).await;
        });
    }

    info!(
        port,
        stream = %config.stream.name,
        poller = !no_poll,
        "starting gridiron"
    );

    tokio::select! {
        result = api::serve(state, port) => {
            if let Err(e) = &result {
                error!("API server stopped: {}", e);
            }
            result
        }
        _ = shutdown_signal() => {
            info!("shutdown signal received; stopping");
            Ok(())
        }
    }
}

/// Poll upstream and log would-be events; nothing is published anywhere.
async fn run_poll(config: AppConfig, interval_override: Option<u64>) {
    let interval = interval_override
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.upstream.interval());

    let upstream = match EspnUpstream::new(&config.upstream.base_url, config.upstream.timeout()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("failed to build upstream client: {}", e);
            return;
        }
    };

    let mut poller = LivePoller::new(upstream, Arc::new(DryRunSink), Arc::new(Metrics::new()));

    tokio::select! {
        _ = poller.run(interval) => {}
        _ = shutdown_signal() => {
            info!("shutdown signal received; stopping poller");
        }
    }
}

/// Load a JSONL capture into the in-process log and serve the API over it.
async fn run_replay(config: AppConfig, file: &str, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.api.port);
    let metrics = Arc::new(Metrics::new());
    let log = Arc::new(MemoryLog::new(&config.stream.name));

    let contents = tokio::fs::read_to_string(file).await?;
    let mut loaded = 0usize;
    let mut skipped = 0usize;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<PlayEvent>(line) {
            Ok(event) => {
                log.publish(&event).await?;
                loaded += 1;
            }
            Err(e) => {
                warn!(error = %e, "skipping unparseable capture line");
                skipped += 1;
            }
        }
    }
    info!(loaded, skipped, file, "replayed capture into log");

    let cursor = Arc::new(CursorManager::new(log.clone() as Arc<dyn ShardStream>));
    let state = AppState::new(cursor, metrics, config.stream.name.clone());

    tokio::select! {
        result = api::serve(state, port) => result,
        _ = shutdown_signal() => {
            info!("shutdown signal received; stopping");
            Ok(())
        }
    }
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,gridiron={}", config.logging.level)));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}

fn init_logging_simple() {
    // Minimal logging for one-shot CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
