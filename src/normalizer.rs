//! Situation Normalizer
//!
//! Converts raw upstream summary payloads (arbitrarily incomplete nested
//! JSON) into canonical [`SituationSnapshot`] records. The function is total:
//! any key may be absent at any depth, unexpected types are tolerated, and
//! the output is always a fully populated snapshot. Anomalies found along the
//! way are returned for observability, never raised.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::{GameMeta, SituationSnapshot};

/// Yard line assumed when the upstream omits field position
pub const DEFAULT_YARD_LINE: u32 = 75;
/// Half clock assumed when the display clock is missing or unparseable
pub const DEFAULT_HALF_SECONDS: u32 = 900;
/// Defensive box count assumed when the upstream omits formation data
pub const DEFAULT_DEFENDERS_IN_BOX: u32 = 6;
/// Pass rusher count assumed when the upstream omits formation data
pub const DEFAULT_PASS_RUSHERS: u32 = 4;

/// Something unexpected about one field of the raw payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    /// JSON pointer of the offending field
    pub path: String,
    pub kind: AnomalyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyKind {
    Missing,
    WrongType,
    Unparseable,
}

/// Result of normalizing one summary payload
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOutcome {
    pub snapshot: SituationSnapshot,
    pub anomalies: Vec<Anomaly>,
}

/// Reads typed values out of an untyped payload, recording an anomaly for
/// every absent or mistyped field instead of failing.
struct FieldReader<'a> {
    root: &'a Value,
    anomalies: Vec<Anomaly>,
}

impl<'a> FieldReader<'a> {
    fn new(root: &'a Value) -> Self {
        Self {
            root,
            anomalies: Vec::new(),
        }
    }

    fn record(&mut self, path: &str, kind: AnomalyKind) {
        self.anomalies.push(Anomaly {
            path: path.to_string(),
            kind,
        });
    }

    /// Integer at `path`, tolerating numbers encoded as strings.
    fn int_at(&mut self, path: &str) -> Option<i64> {
        let Some(value) = self.root.pointer(path) else {
            self.record(path, AnomalyKind::Missing);
            return None;
        };

        match value {
            Value::Number(n) => match n.as_i64() {
                Some(v) => Some(v),
                None => {
                    self.record(path, AnomalyKind::WrongType);
                    None
                }
            },
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    self.record(path, AnomalyKind::Unparseable);
                    None
                }
            },
            _ => {
                self.record(path, AnomalyKind::WrongType);
                None
            }
        }
    }

    fn str_at(&mut self, path: &str) -> Option<&'a str> {
        let Some(value) = self.root.pointer(path) else {
            self.record(path, AnomalyKind::Missing);
            return None;
        };

        match value.as_str() {
            Some(s) => Some(s),
            None => {
                self.record(path, AnomalyKind::WrongType);
                None
            }
        }
    }
}

/// Normalize one raw summary payload into a canonical snapshot.
///
/// Returns `None` iff the payload carries no `situation` object at all
/// (pregame or final). Everything else yields `Some`: absent fields fall back
/// to documented defaults. `now` is injected so repeated calls over the same
/// payload produce identical snapshots.
pub fn normalize(summary: &Value, game: &GameMeta, now: DateTime<Utc>) -> Option<NormalizeOutcome> {
    let situation = summary.get("situation")?;
    if !situation.is_object() {
        return None;
    }

    let mut reader = FieldReader::new(situation);

    let down = match reader.int_at("/down") {
        Some(d @ 0..=4) => d as u8,
        Some(_) => {
            reader.record("/down", AnomalyKind::Unparseable);
            0
        }
        None => 0,
    };

    let distance = reader.int_at("/distance").map_or(0, clamp_non_negative);

    let raw_yard_line = reader.int_at("/yardLine").map(clamp_non_negative);

    let quarter = match reader.int_at("/period") {
        Some(q) if q >= 1 => q.min(u8::MAX as i64) as u8,
        _ => 1,
    };

    let possession = reader.str_at("/possession").unwrap_or("");
    let posteam_is_home = possession == game.home_team;

    // Field position is reported from the possessing team's perspective only
    // for the away side; the home side counts from the other end.
    let yardline_100 = match raw_yard_line {
        Some(yards) if posteam_is_home => 100_u32.saturating_sub(yards),
        Some(yards) => yards.min(100),
        None => DEFAULT_YARD_LINE,
    };

    let half_seconds_remaining = match reader.str_at("/clock/displayValue") {
        Some(display) => match parse_display_clock(display, quarter) {
            Some(seconds) => seconds,
            None => {
                reader.record("/clock/displayValue", AnomalyKind::Unparseable);
                DEFAULT_HALF_SECONDS
            }
        },
        None => DEFAULT_HALF_SECONDS,
    };

    let (possession_team, defense_team, score_differential) = if posteam_is_home {
        (
            game.home_team.clone(),
            game.away_team.clone(),
            game.home_score - game.away_score,
        )
    } else {
        (
            game.away_team.clone(),
            game.home_team.clone(),
            game.away_score - game.home_score,
        )
    };

    let goal_to_go = raw_yard_line.is_some_and(|yards| yards <= distance);

    let snapshot = SituationSnapshot {
        game_id: game.game_id.clone(),
        timestamp: now,
        down,
        distance,
        yardline_100,
        quarter,
        half_seconds_remaining,
        possession_team,
        defense_team,
        score_differential,
        posteam_is_home,
        goal_to_go,
        shotgun: true,
        no_huddle: false,
        defenders_in_box: DEFAULT_DEFENDERS_IN_BOX,
        pass_rushers: DEFAULT_PASS_RUSHERS,
    };

    Some(NormalizeOutcome {
        snapshot,
        anomalies: reader.anomalies,
    })
}

/// Parse a `"MM:SS"` display clock into seconds left in the half.
///
/// Quarters 1 and 3 add the 900 seconds of the other quarter in the same
/// half, since the half clock counts down across two quarters. Returns `None`
/// on any parse failure; callers fall back to [`DEFAULT_HALF_SECONDS`] flat.
pub fn parse_display_clock(display: &str, quarter: u8) -> Option<u32> {
    let mut parts = display.split(':');
    let minutes: u32 = parts.next()?.trim().parse().ok()?;
    let seconds: u32 = match parts.next() {
        Some(part) => part.trim().parse().ok()?,
        None => 0,
    };

    let mut total = minutes * 60 + seconds;
    if quarter == 1 || quarter == 3 {
        total += 900;
    }
    Some(total)
}

/// Most recent play identifier in a summary payload, used as the
/// deduplication key component. Prefers the situation's last play, falling
/// back to the newest play of the current drive.
pub fn play_key(summary: &Value) -> Option<String> {
    if let Some(id) = summary
        .pointer("/situation/lastPlay/id")
        .and_then(id_string)
    {
        return Some(id);
    }

    summary
        .pointer("/drives/current/plays")
        .and_then(Value::as_array)
        .and_then(|plays| plays.last())
        .and_then(|play| play.get("id"))
        .and_then(id_string)
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn clamp_non_negative(value: i64) -> u32 {
    value.max(0).min(u32::MAX as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn game() -> GameMeta {
        GameMeta {
            game_id: "401547403".to_string(),
            home_team: "BUF".to_string(),
            away_team: "KC".to_string(),
            home_score: 17,
            away_score: 13,
        }
    }

    fn now() -> DateTime<Utc> {
        "2025-11-02T18:21:07Z".parse().expect("timestamp")
    }

    fn full_summary() -> Value {
        json!({
            "situation": {
                "down": 3,
                "distance": 7,
                "yardLine": 42,
                "period": 2,
                "possession": "KC",
                "clock": { "displayValue": "5:12" },
                "lastPlay": { "id": "40154740312345" }
            }
        })
    }

    #[test]
    fn missing_situation_is_the_no_situation_sentinel() {
        assert!(normalize(&json!({}), &game(), now()).is_none());
        assert!(normalize(&json!({ "situation": null }), &game(), now()).is_none());
    }

    #[test]
    fn full_payload_normalizes_without_anomalies() {
        let outcome = normalize(&full_summary(), &game(), now()).expect("situation");
        let snapshot = outcome.snapshot;

        assert_eq!(snapshot.down, 3);
        assert_eq!(snapshot.distance, 7);
        // Away possession keeps the raw yard line
        assert_eq!(snapshot.yardline_100, 42);
        assert_eq!(snapshot.quarter, 2);
        assert_eq!(snapshot.half_seconds_remaining, 312);
        assert_eq!(snapshot.possession_team, "KC");
        assert_eq!(snapshot.defense_team, "BUF");
        assert_eq!(snapshot.score_differential, -4);
        assert!(!snapshot.posteam_is_home);
        assert!(!snapshot.goal_to_go);
        assert!(snapshot.shotgun);
        assert_eq!(snapshot.defenders_in_box, DEFAULT_DEFENDERS_IN_BOX);
        assert_eq!(snapshot.pass_rushers, DEFAULT_PASS_RUSHERS);
        assert!(outcome.anomalies.is_empty());
    }

    #[test]
    fn home_possession_mirrors_field_position_and_score() {
        let summary = json!({
            "situation": {
                "down": 1,
                "distance": 10,
                "yardLine": 30,
                "period": 4,
                "possession": "BUF",
                "clock": { "displayValue": "12:00" }
            }
        });

        let outcome = normalize(&summary, &game(), now()).expect("situation");
        let snapshot = outcome.snapshot;

        assert_eq!(snapshot.yardline_100, 70);
        assert_eq!(snapshot.possession_team, "BUF");
        assert_eq!(snapshot.defense_team, "KC");
        assert_eq!(snapshot.score_differential, 4);
        assert!(snapshot.posteam_is_home);
    }

    #[test]
    fn absent_yard_line_defaults_to_75() {
        let summary = json!({
            "situation": {
                "down": 2,
                "distance": 5,
                "period": 2,
                "possession": "KC"
            }
        });

        let outcome = normalize(&summary, &game(), now()).expect("situation");
        assert_eq!(outcome.snapshot.yardline_100, DEFAULT_YARD_LINE);
        assert!(!outcome.snapshot.goal_to_go);
        assert!(outcome
            .anomalies
            .iter()
            .any(|a| a.path == "/yardLine" && a.kind == AnomalyKind::Missing));
    }

    #[test]
    fn empty_situation_yields_all_defaults() {
        let summary = json!({ "situation": {} });
        let outcome = normalize(&summary, &game(), now()).expect("situation");
        let snapshot = outcome.snapshot;

        assert_eq!(snapshot.down, 0);
        assert_eq!(snapshot.distance, 0);
        assert_eq!(snapshot.yardline_100, DEFAULT_YARD_LINE);
        assert_eq!(snapshot.quarter, 1);
        assert_eq!(snapshot.half_seconds_remaining, DEFAULT_HALF_SECONDS);
        // Nobody matches the home team, so the away side is charged with possession
        assert!(!snapshot.posteam_is_home);
        assert!(!outcome.anomalies.is_empty());
    }

    #[test]
    fn goal_to_go_when_distance_covers_the_field() {
        let summary = json!({
            "situation": {
                "down": 1,
                "distance": 8,
                "yardLine": 6,
                "period": 3,
                "possession": "KC",
                "clock": { "displayValue": "3:30" }
            }
        });

        let outcome = normalize(&summary, &game(), now()).expect("situation");
        assert!(outcome.snapshot.goal_to_go);
    }

    #[test]
    fn wrong_types_are_recorded_not_raised() {
        let summary = json!({
            "situation": {
                "down": [3],
                "distance": "seven",
                "yardLine": 42,
                "possession": 12
            }
        });

        let outcome = normalize(&summary, &game(), now()).expect("situation");
        assert_eq!(outcome.snapshot.down, 0);
        assert_eq!(outcome.snapshot.distance, 0);
        assert!(outcome
            .anomalies
            .iter()
            .any(|a| a.path == "/down" && a.kind == AnomalyKind::WrongType));
        assert!(outcome
            .anomalies
            .iter()
            .any(|a| a.path == "/distance" && a.kind == AnomalyKind::Unparseable));
        assert!(outcome
            .anomalies
            .iter()
            .any(|a| a.path == "/possession" && a.kind == AnomalyKind::WrongType));
    }

    #[test]
    fn clock_parse_adds_first_half_quarter() {
        assert_eq!(parse_display_clock("2:00", 1), Some(1020));
        assert_eq!(parse_display_clock("2:00", 2), Some(120));
        assert_eq!(parse_display_clock("2:00", 3), Some(1020));
        assert_eq!(parse_display_clock("2:00", 4), Some(120));
        assert_eq!(parse_display_clock("15:00", 1), Some(1800));
        // Bare minutes are tolerated
        assert_eq!(parse_display_clock("14", 2), Some(840));
    }

    #[test]
    fn malformed_clock_defaults_flat_900() {
        assert_eq!(parse_display_clock("--", 1), None);
        assert_eq!(parse_display_clock("", 3), None);
        assert_eq!(parse_display_clock("a:b", 2), None);

        let summary = json!({
            "situation": {
                "down": 1,
                "period": 1,
                "possession": "KC",
                "clock": { "displayValue": "--" }
            }
        });
        let outcome = normalize(&summary, &game(), now()).expect("situation");
        // Failure default is 900 flat, never 900 + 900
        assert_eq!(outcome.snapshot.half_seconds_remaining, DEFAULT_HALF_SECONDS);
        assert!(outcome
            .anomalies
            .iter()
            .any(|a| a.path == "/clock/displayValue" && a.kind == AnomalyKind::Unparseable));
    }

    #[test]
    fn normalize_is_idempotent() {
        let summary = full_summary();
        let first = normalize(&summary, &game(), now()).expect("situation");
        let second = normalize(&summary, &game(), now()).expect("situation");
        assert_eq!(first, second);
    }

    #[test]
    fn play_key_prefers_last_play_then_current_drive() {
        assert_eq!(
            play_key(&full_summary()).as_deref(),
            Some("40154740312345")
        );

        let drive_only = json!({
            "situation": { "down": 1 },
            "drives": {
                "current": {
                    "plays": [
                        { "id": 111 },
                        { "id": 222 }
                    ]
                }
            }
        });
        assert_eq!(play_key(&drive_only).as_deref(), Some("222"));

        assert_eq!(play_key(&json!({ "situation": {} })), None);
    }
}
