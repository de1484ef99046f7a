//! API request/response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CursorStatus, PlayEvent, PosteamType, PredictionSet, SituationSnapshot};

/// One-off prediction request.
///
/// Mirrors the canonical record's field names; everything beyond the basic
/// down-and-distance triple is optional with the documented defaults. Flag
/// fields take 0/1 for compatibility with existing dashboard clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub down: u8,
    pub ydstogo: u32,
    pub yardline_100: u32,
    #[serde(default = "default_quarter")]
    pub qtr: u8,
    #[serde(default = "default_half_seconds")]
    pub half_seconds_remaining: u32,
    #[serde(default)]
    pub score_differential: i32,
    #[serde(default = "default_one")]
    pub shotgun: u8,
    #[serde(default)]
    pub no_huddle: u8,
    #[serde(default = "default_defenders_in_box")]
    pub defenders_in_box: u32,
    #[serde(default = "default_pass_rushers")]
    pub number_of_pass_rushers: u32,
    #[serde(default)]
    pub posteam_type: PosteamType,
    #[serde(default)]
    pub goal_to_go: u8,
    #[serde(default)]
    pub posteam: Option<String>,
    #[serde(default)]
    pub defteam: Option<String>,
}

impl PredictRequest {
    /// Materialize the request as a canonical snapshot.
    pub fn snapshot(&self, now: DateTime<Utc>) -> SituationSnapshot {
        SituationSnapshot {
            game_id: "adhoc".to_string(),
            timestamp: now,
            down: self.down,
            distance: self.ydstogo,
            yardline_100: self.yardline_100.min(100),
            quarter: self.qtr,
            half_seconds_remaining: self.half_seconds_remaining,
            possession_team: self.posteam.clone().unwrap_or_default(),
            defense_team: self.defteam.clone().unwrap_or_default(),
            score_differential: self.score_differential,
            posteam_is_home: self.posteam_type == PosteamType::Home,
            goal_to_go: self.goal_to_go != 0,
            shotgun: self.shotgun != 0,
            no_huddle: self.no_huddle != 0,
            defenders_in_box: self.defenders_in_box,
            pass_rushers: self.number_of_pass_rushers,
        }
    }
}

fn default_quarter() -> u8 {
    1
}

fn default_half_seconds() -> u32 {
    900
}

fn default_one() -> u8 {
    1
}

fn default_defenders_in_box() -> u32 {
    6
}

fn default_pass_rushers() -> u32 {
    4
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub input: PredictRequest,
    pub predictions: PredictionSet,
}

/// Canonical record joined with its predictions, flattened for clients
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPlay {
    #[serde(flatten)]
    pub event: PlayEvent,
    #[serde(flatten)]
    pub predictions: PredictionSet,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchResponse {
    pub status: &'static str,
    pub play_count: usize,
    pub plays: Vec<ScoredPlay>,
    pub has_new_data: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatestResponse {
    pub status: &'static str,
    pub play: Option<ScoredPlay>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamStatusResponse {
    pub stream: String,
    #[serde(flatten)]
    pub cursor: CursorStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub stream: String,
    pub cursor_phase: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub prediction_method: &'static str,
}
