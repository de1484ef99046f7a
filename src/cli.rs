use clap::{ArgAction, Parser, Subcommand};
use chrono::Utc;
use serde_json::Value;

use crate::api::types::PredictRequest;
use crate::engine;
use crate::error::Result;
use crate::ingest::Upstream;

#[derive(Parser)]
#[command(name = "gridiron")]
#[command(version = "0.1.0")]
#[command(about = "Real-time NFL game-situation analytics pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory
    #[arg(short, long, default_value = "config")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: live poller, in-process log and HTTP API
    Serve {
        /// API port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Serve the API without the background poller
        #[arg(long)]
        no_poll: bool,
    },
    /// Poll live games and log would-be events without publishing
    Poll {
        /// Polling interval in seconds (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Replay a JSONL capture of play events into the log and serve the API
    Replay {
        /// Path to a JSONL file of canonical play events
        file: String,
        /// API port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// One-shot rule-based prediction for a situation
    Predict {
        /// Current down (1-4)
        #[arg(long)]
        down: u8,
        /// Yards to convert
        #[arg(long)]
        ydstogo: u32,
        /// Yards to the opponent's end zone (0-100)
        #[arg(long)]
        yardline: u32,
        /// Quarter (1-4)
        #[arg(long, default_value = "1")]
        qtr: u8,
        /// Seconds left in the current half
        #[arg(long, default_value = "900")]
        half_seconds: u32,
        /// Possession team score minus defense team score
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        score_diff: i32,
        /// Offense in shotgun formation
        #[arg(long, default_value = "true", action = ArgAction::Set)]
        shotgun: bool,
        /// Defenders in the box
        #[arg(long, default_value = "6")]
        defenders_in_box: u32,
        /// Pass rushers
        #[arg(long, default_value = "4")]
        pass_rushers: u32,
    },
    /// Test upstream API connectivity
    Test,
}

/// Fetch the scoreboard once and list what the upstream reports.
pub async fn test_connection<U: Upstream>(upstream: &U) -> Result<()> {
    println!("Testing upstream API connection...");

    let scoreboard = upstream.scoreboard().await?;
    let events = scoreboard
        .get("events")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    println!("Success! Found {} games in scoreboard.", events.len());
    for event in &events {
        let name = event
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown Game");
        let date = event.get("date").and_then(Value::as_str).unwrap_or("");
        let status = event
            .pointer("/status/type/description")
            .and_then(Value::as_str)
            .unwrap_or("");
        println!("  {name} ({date}) - {status}");
    }

    Ok(())
}

/// Compute and print one prediction set as pretty JSON.
#[allow(clippy::too_many_arguments)]
pub fn run_prediction(
    down: u8,
    ydstogo: u32,
    yardline: u32,
    qtr: u8,
    half_seconds: u32,
    score_diff: i32,
    shotgun: bool,
    defenders_in_box: u32,
    pass_rushers: u32,
) -> Result<()> {
    let request = PredictRequest {
        down,
        ydstogo,
        yardline_100: yardline,
        qtr,
        half_seconds_remaining: half_seconds,
        score_differential: score_diff,
        shotgun: u8::from(shotgun),
        no_huddle: 0,
        defenders_in_box,
        number_of_pass_rushers: pass_rushers,
        posteam_type: Default::default(),
        goal_to_go: 0,
        posteam: None,
        defteam: None,
    };

    let snapshot = request.snapshot(Utc::now());
    let predictions = engine::predict(&snapshot);

    println!("{}", serde_json::to_string_pretty(&predictions)?);
    Ok(())
}
