//! Live game poller.
//!
//! Interval-driven loop: scoreboard → per live game summary → normalize →
//! dedup → publish. Each tick is synchronous and self-contained. A failure on
//! one game is contained to that game; the next scheduled tick is the only
//! retry mechanism.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::{GameMeta, SituationSnapshot};
use crate::normalizer;
use crate::services::Metrics;
use crate::stream::{EventSink, PlayDeduplicator, PlayKey};

use super::upstream::Upstream;

/// Origin tag stamped on every forwarded record
const SOURCE: &str = "espn_live";

/// Outcome of one poll tick, for logging and tests
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub live_games: usize,
    pub forwarded: usize,
    pub errors: usize,
}

pub struct LivePoller<U: Upstream, S: EventSink + ?Sized> {
    upstream: Arc<U>,
    sink: Arc<S>,
    metrics: Arc<Metrics>,
    dedup: PlayDeduplicator,
}

impl<U: Upstream, S: EventSink + ?Sized> LivePoller<U, S> {
    pub fn new(upstream: Arc<U>, sink: Arc<S>, metrics: Arc<Metrics>) -> Self {
        Self {
            upstream,
            sink,
            metrics,
            dedup: PlayDeduplicator::new(),
        }
    }

    /// Poll forever. Stops only when the surrounding task is cancelled
    /// (process shutdown between ticks).
    pub async fn run(&mut self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = interval.as_secs(), "starting live poller");

        loop {
            ticker.tick().await;
            let summary = self.tick().await;
            if summary.live_games == 0 {
                info!("no live games found; waiting");
            } else {
                info!(
                    live_games = summary.live_games,
                    forwarded = summary.forwarded,
                    errors = summary.errors,
                    "poll tick complete"
                );
            }
        }
    }

    /// One poll pass over every live game.
    pub async fn tick(&mut self) -> TickSummary {
        self.metrics.inc_ticks();

        let scoreboard = match self.upstream.scoreboard().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "failed to fetch scoreboard");
                self.metrics.inc_poll_errors();
                return TickSummary {
                    errors: 1,
                    ..TickSummary::default()
                };
            }
        };

        let games = live_games(&scoreboard);
        self.metrics.add_live_games(games.len() as u64);

        let mut summary = TickSummary {
            live_games: games.len(),
            ..TickSummary::default()
        };

        for game in &games {
            match self.process_game(game).await {
                Ok(forwarded) => summary.forwarded += forwarded,
                Err(e) => {
                    // One bad game never aborts the rest of the tick
                    warn!(game_id = %game.game_id, error = %e, "failed to process game");
                    self.metrics.inc_poll_errors();
                    summary.errors += 1;
                }
            }
        }

        summary
    }

    async fn process_game(&mut self, game: &GameMeta) -> crate::error::Result<usize> {
        let payload = self.upstream.game_summary(&game.game_id).await?;

        let Some(outcome) = normalizer::normalize(&payload, game, Utc::now()) else {
            debug!(game_id = %game.game_id, "no active situation");
            return Ok(0);
        };

        for anomaly in &outcome.anomalies {
            debug!(
                game_id = %game.game_id,
                path = %anomaly.path,
                kind = ?anomaly.kind,
                "payload anomaly"
            );
        }
        self.metrics
            .add_payload_anomalies(outcome.anomalies.len() as u64);

        let snapshot = outcome.snapshot;
        if snapshot.down == 0 {
            // Kickoffs and dead time between plays carry no predictable down
            return Ok(0);
        }

        let play_id =
            normalizer::play_key(&payload).unwrap_or_else(|| content_key(&snapshot));
        if !self
            .dedup
            .should_forward(PlayKey::new(&snapshot.game_id, play_id))
        {
            return Ok(0);
        }

        let event = snapshot.play_event(SOURCE);
        self.sink.publish(&event).await?;
        self.metrics.inc_plays_forwarded();
        info!(
            game_id = %event.game_id,
            posteam = %event.posteam,
            down = event.down,
            ydstogo = event.ydstogo,
            "forwarded play event"
        );

        Ok(1)
    }
}

/// Fallback dedup key when the payload carries no play identifier: identical
/// situations still collapse within a session.
fn content_key(snapshot: &SituationSnapshot) -> String {
    format!(
        "q{}-{}s-{}-{}-{}",
        snapshot.quarter,
        snapshot.half_seconds_remaining,
        snapshot.down,
        snapshot.distance,
        snapshot.yardline_100
    )
}

/// Extract the games currently in progress from a scoreboard payload.
pub fn live_games(scoreboard: &Value) -> Vec<GameMeta> {
    let Some(events) = scoreboard.get("events").and_then(Value::as_array) else {
        return Vec::new();
    };

    events
        .iter()
        .filter_map(|event| {
            let state = event
                .pointer("/status/type/state")
                .and_then(Value::as_str)?;
            if state != "in" {
                return None;
            }
            game_meta(event)
        })
        .collect()
}

fn game_meta(event: &Value) -> Option<GameMeta> {
    let game_id = event.get("id").and_then(id_string)?;
    let competitors = event
        .pointer("/competitions/0/competitors")
        .and_then(Value::as_array)?;

    let mut home_team = String::new();
    let mut away_team = String::new();
    let mut home_score = 0;
    let mut away_score = 0;

    for competitor in competitors {
        let abbr = competitor
            .pointer("/team/abbreviation")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let score = competitor.get("score").map(lenient_i32).unwrap_or(0);

        match competitor.get("homeAway").and_then(Value::as_str) {
            Some("home") => {
                home_team = abbr;
                home_score = score;
            }
            _ => {
                away_team = abbr;
                away_score = score;
            }
        }
    }

    Some(GameMeta {
        game_id,
        home_team,
        away_team,
        home_score,
        away_score,
    })
}

/// Scores arrive as numbers or numeric strings depending on the feed version.
fn lenient_i32(value: &Value) -> i32 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or(0) as i32,
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridironError;
    use crate::stream::MemoryLog;
    use async_trait::async_trait;
    use serde_json::json;

    struct FakeUpstream {
        scoreboard: Value,
        summaries: std::sync::Mutex<std::collections::HashMap<String, Value>>,
        failing_games: Vec<String>,
    }

    impl FakeUpstream {
        fn new(scoreboard: Value, summaries: &[(&str, Value)], failing: &[&str]) -> Self {
            Self {
                scoreboard,
                summaries: std::sync::Mutex::new(
                    summaries
                        .iter()
                        .map(|(id, v)| (id.to_string(), v.clone()))
                        .collect(),
                ),
                failing_games: failing.iter().map(|g| g.to_string()).collect(),
            }
        }

        fn set_summary(&self, game_id: &str, value: Value) {
            self.summaries
                .lock()
                .expect("summaries lock")
                .insert(game_id.to_string(), value);
        }
    }

    #[async_trait]
    impl Upstream for FakeUpstream {
        async fn scoreboard(&self) -> crate::error::Result<Value> {
            Ok(self.scoreboard.clone())
        }

        async fn game_summary(&self, game_id: &str) -> crate::error::Result<Value> {
            if self.failing_games.iter().any(|g| g == game_id) {
                return Err(GridironError::TransientNetwork(format!(
                    "summary fetch failed for {game_id}"
                )));
            }
            Ok(self
                .summaries
                .lock()
                .expect("summaries lock")
                .get(game_id)
                .cloned()
                .unwrap_or_else(|| json!({})))
        }
    }

    fn scoreboard(games: &[(&str, &str)]) -> Value {
        let events: Vec<Value> = games
            .iter()
            .map(|(id, state)| {
                json!({
                    "id": id,
                    "status": { "type": { "state": state } },
                    "competitions": [{
                        "competitors": [
                            {
                                "homeAway": "home",
                                "team": { "abbreviation": "BUF" },
                                "score": "17"
                            },
                            {
                                "homeAway": "away",
                                "team": { "abbreviation": "KC" },
                                "score": 13
                            }
                        ]
                    }]
                })
            })
            .collect();
        json!({ "events": events })
    }

    fn summary(play_id: &str) -> Value {
        json!({
            "situation": {
                "down": 2,
                "distance": 6,
                "yardLine": 38,
                "period": 2,
                "possession": "KC",
                "clock": { "displayValue": "8:14" },
                "lastPlay": { "id": play_id }
            }
        })
    }

    fn poller(
        upstream: Arc<FakeUpstream>,
        log: Arc<MemoryLog>,
    ) -> LivePoller<FakeUpstream, MemoryLog> {
        LivePoller::new(upstream, log, Arc::new(Metrics::new()))
    }

    #[tokio::test]
    async fn tick_forwards_new_plays_once() {
        let upstream = Arc::new(FakeUpstream::new(
            scoreboard(&[("g1", "in")]),
            &[("g1", summary("p1"))],
            &[],
        ));
        let log = Arc::new(MemoryLog::new("t"));
        let mut poller = poller(upstream, log.clone());

        let first = poller.tick().await;
        assert_eq!(first.live_games, 1);
        assert_eq!(first.forwarded, 1);
        assert_eq!(first.errors, 0);
        assert_eq!(log.len().await, 1);

        // Same play on the next tick is deduplicated
        let second = poller.tick().await;
        assert_eq!(second.forwarded, 0);
        assert_eq!(log.len().await, 1);
    }

    #[tokio::test]
    async fn pregame_and_final_games_are_skipped() {
        let upstream = Arc::new(FakeUpstream::new(
            scoreboard(&[("g1", "pre"), ("g2", "post")]),
            &[],
            &[],
        ));
        let log = Arc::new(MemoryLog::new("t"));
        let mut poller = poller(upstream, log.clone());

        let summary = poller.tick().await;
        assert_eq!(summary.live_games, 0);
        assert_eq!(log.len().await, 0);
    }

    #[tokio::test]
    async fn one_failing_game_does_not_abort_the_tick() {
        let upstream = Arc::new(FakeUpstream::new(
            scoreboard(&[("bad", "in"), ("good", "in")]),
            &[("good", summary("p9"))],
            &["bad"],
        ));
        let log = Arc::new(MemoryLog::new("t"));
        let mut poller = poller(upstream, log.clone());

        let result = poller.tick().await;
        assert_eq!(result.live_games, 2);
        assert_eq!(result.errors, 1);
        assert_eq!(result.forwarded, 1);
        assert_eq!(log.len().await, 1);
    }

    #[tokio::test]
    async fn situations_without_an_active_down_are_not_forwarded() {
        let upstream = Arc::new(FakeUpstream::new(
            scoreboard(&[("g1", "in")]),
            &[("g1", json!({ "situation": { "down": 0, "possession": "KC" } }))],
            &[],
        ));
        let log = Arc::new(MemoryLog::new("t"));
        let mut poller = poller(upstream, log.clone());

        let result = poller.tick().await;
        assert_eq!(result.forwarded, 0);
        assert_eq!(log.len().await, 0);
    }

    #[tokio::test]
    async fn new_play_id_forwards_again() {
        let upstream = Arc::new(FakeUpstream::new(
            scoreboard(&[("g1", "in")]),
            &[("g1", summary("p1"))],
            &[],
        ));
        let log = Arc::new(MemoryLog::new("t"));
        let mut poller = poller(upstream.clone(), log.clone());

        poller.tick().await;

        // Advance the game to a new play within the same poller session
        upstream.set_summary("g1", summary("p2"));
        let result = poller.tick().await;
        assert_eq!(result.forwarded, 1);
        assert_eq!(log.len().await, 2);
    }

    #[test]
    fn live_games_parses_string_and_int_scores() {
        let games = live_games(&scoreboard(&[("g1", "in")]));
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].home_team, "BUF");
        assert_eq!(games[0].away_team, "KC");
        assert_eq!(games[0].home_score, 17);
        assert_eq!(games[0].away_score, 13);
    }

    #[test]
    fn empty_scoreboard_is_no_games() {
        assert!(live_games(&json!({})).is_empty());
        assert!(live_games(&json!({ "events": "nope" })).is_empty());
    }
}
