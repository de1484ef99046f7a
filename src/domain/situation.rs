use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Which side of the matchup currently holds possession
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosteamType {
    Home,
    Away,
}

impl Default for PosteamType {
    fn default() -> Self {
        Self::Home
    }
}

impl PosteamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PosteamType::Home => "home",
            PosteamType::Away => "away",
        }
    }
}

impl fmt::Display for PosteamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scoreboard-level context for one game, extracted before the per-game
/// summary payload is fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMeta {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: i32,
    pub away_score: i32,
}

/// One game's current play-relevant state in canonical form.
///
/// Constructed fresh per normalization call, immutable afterwards. Every
/// field is populated: missing upstream values are replaced by documented
/// defaults so the prediction engine is total. `yardline_100` is always
/// within `[0, 100]` (0 = opponent goal line, 100 = own end zone).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SituationSnapshot {
    pub game_id: String,
    pub timestamp: DateTime<Utc>,
    /// Current down, 0 when no down is active (kickoffs, between plays)
    pub down: u8,
    /// Yards to convert
    pub distance: u32,
    /// Yards from the possessing offense to the opponent's end zone
    pub yardline_100: u32,
    pub quarter: u8,
    /// Seconds left in the current half
    pub half_seconds_remaining: u32,
    pub possession_team: String,
    pub defense_team: String,
    /// Possession team score minus defense team score
    pub score_differential: i32,
    pub posteam_is_home: bool,
    pub goal_to_go: bool,
    pub shotgun: bool,
    pub no_huddle: bool,
    pub defenders_in_box: u32,
    pub pass_rushers: u32,
}

impl SituationSnapshot {
    /// Canonical wire record for this snapshot, stamped with its origin.
    pub fn play_event(&self, source: &str) -> PlayEvent {
        PlayEvent {
            game_id: self.game_id.clone(),
            down: self.down,
            ydstogo: self.distance,
            yardline_100: self.yardline_100,
            qtr: self.quarter,
            half_seconds_remaining: self.half_seconds_remaining,
            score_differential: self.score_differential,
            posteam: self.possession_team.clone(),
            defteam: self.defense_team.clone(),
            posteam_type: if self.posteam_is_home {
                PosteamType::Home
            } else {
                PosteamType::Away
            },
            goal_to_go: self.goal_to_go,
            shotgun: self.shotgun,
            no_huddle: self.no_huddle,
            defenders_in_box: self.defenders_in_box,
            number_of_pass_rushers: self.pass_rushers,
            timestamp: self.timestamp,
            source: source.to_string(),
        }
    }
}

/// Canonical play-event record written to and read from the partitioned log.
///
/// Flag fields are serialized as 0/1 integers to stay compatible with
/// captures produced by earlier versions of the pipeline; deserialization
/// accepts either integers or booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayEvent {
    pub game_id: String,
    #[serde(default)]
    pub down: u8,
    #[serde(default)]
    pub ydstogo: u32,
    #[serde(default = "default_yardline")]
    pub yardline_100: u32,
    #[serde(default = "default_quarter")]
    pub qtr: u8,
    #[serde(default = "default_half_seconds")]
    pub half_seconds_remaining: u32,
    #[serde(default)]
    pub score_differential: i32,
    #[serde(default)]
    pub posteam: String,
    #[serde(default)]
    pub defteam: String,
    #[serde(default)]
    pub posteam_type: PosteamType,
    #[serde(
        default,
        deserialize_with = "flag_from_any",
        serialize_with = "flag_as_int"
    )]
    pub goal_to_go: bool,
    #[serde(
        default = "default_true",
        deserialize_with = "flag_from_any",
        serialize_with = "flag_as_int"
    )]
    pub shotgun: bool,
    #[serde(
        default,
        deserialize_with = "flag_from_any",
        serialize_with = "flag_as_int"
    )]
    pub no_huddle: bool,
    #[serde(default = "default_defenders_in_box")]
    pub defenders_in_box: u32,
    #[serde(default = "default_pass_rushers")]
    pub number_of_pass_rushers: u32,
    #[serde(default = "default_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub source: String,
}

impl From<&PlayEvent> for SituationSnapshot {
    fn from(event: &PlayEvent) -> Self {
        Self {
            game_id: event.game_id.clone(),
            timestamp: event.timestamp,
            down: event.down,
            distance: event.ydstogo,
            yardline_100: event.yardline_100.min(100),
            quarter: event.qtr,
            half_seconds_remaining: event.half_seconds_remaining,
            possession_team: event.posteam.clone(),
            defense_team: event.defteam.clone(),
            score_differential: event.score_differential,
            posteam_is_home: event.posteam_type == PosteamType::Home,
            goal_to_go: event.goal_to_go,
            shotgun: event.shotgun,
            no_huddle: event.no_huddle,
            defenders_in_box: event.defenders_in_box,
            pass_rushers: event.number_of_pass_rushers,
        }
    }
}

fn default_yardline() -> u32 {
    75
}

fn default_quarter() -> u8 {
    1
}

fn default_half_seconds() -> u32 {
    900
}

fn default_defenders_in_box() -> u32 {
    6
}

fn default_pass_rushers() -> u32 {
    4
}

fn default_true() -> bool {
    true
}

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

fn flag_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(v) => v != 0,
    })
}

fn flag_as_int<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_snapshot() -> SituationSnapshot {
        SituationSnapshot {
            game_id: "401547403".to_string(),
            timestamp: "2025-11-02T18:21:07Z".parse().expect("timestamp"),
            down: 3,
            distance: 7,
            yardline_100: 42,
            quarter: 2,
            half_seconds_remaining: 312,
            possession_team: "KC".to_string(),
            defense_team: "BUF".to_string(),
            score_differential: -4,
            posteam_is_home: false,
            goal_to_go: false,
            shotgun: true,
            no_huddle: false,
            defenders_in_box: 6,
            pass_rushers: 4,
        }
    }

    #[test]
    fn snapshot_round_trips_through_play_event() {
        let snapshot = sample_snapshot();
        let event = snapshot.play_event("espn_live");

        assert_eq!(event.posteam_type, PosteamType::Away);
        assert_eq!(event.ydstogo, 7);
        assert_eq!(event.source, "espn_live");

        let back = SituationSnapshot::from(&event);
        assert_eq!(back, snapshot);
    }

    #[test]
    fn play_event_flags_serialize_as_ints() {
        let event = sample_snapshot().play_event("espn_live");
        let value = serde_json::to_value(&event).expect("serialize");

        assert_eq!(value["shotgun"], json!(1));
        assert_eq!(value["no_huddle"], json!(0));
        assert_eq!(value["goal_to_go"], json!(0));
        assert_eq!(value["posteam_type"], json!("away"));
    }

    #[test]
    fn play_event_accepts_int_and_bool_flags() {
        let from_ints: PlayEvent = serde_json::from_value(json!({
            "game_id": "g1",
            "shotgun": 0,
            "goal_to_go": 1,
            "timestamp": "2025-11-02T18:21:07Z"
        }))
        .expect("int flags");
        assert!(!from_ints.shotgun);
        assert!(from_ints.goal_to_go);

        let from_bools: PlayEvent = serde_json::from_value(json!({
            "game_id": "g1",
            "shotgun": true,
            "goal_to_go": false,
            "timestamp": "2025-11-02T18:21:07Z"
        }))
        .expect("bool flags");
        assert!(from_bools.shotgun);
        assert!(!from_bools.goal_to_go);
    }

    #[test]
    fn partial_play_event_gets_documented_defaults() {
        let event: PlayEvent = serde_json::from_value(json!({ "game_id": "g1" }))
            .expect("minimal record");

        assert_eq!(event.down, 0);
        assert_eq!(event.ydstogo, 0);
        assert_eq!(event.yardline_100, 75);
        assert_eq!(event.qtr, 1);
        assert_eq!(event.half_seconds_remaining, 900);
        assert_eq!(event.defenders_in_box, 6);
        assert_eq!(event.number_of_pass_rushers, 4);
        assert!(event.shotgun);
        assert!(!event.no_huddle);
        assert_eq!(event.posteam_type, PosteamType::Home);
    }

    #[test]
    fn oversized_yardline_is_clamped_on_conversion() {
        let event: PlayEvent = serde_json::from_value(json!({
            "game_id": "g1",
            "yardline_100": 400
        }))
        .expect("record");

        let snapshot = SituationSnapshot::from(&event);
        assert_eq!(snapshot.yardline_100, 100);
    }
}
