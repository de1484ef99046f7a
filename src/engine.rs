//! Prediction Engine
//!
//! Deterministic rule-based predictions over a [`SituationSnapshot`]. Pure
//! and side-effect free: the same snapshot always yields the same
//! [`PredictionSet`], so callers may cache results freely. The constants and
//! the override order below are heuristic tuning parameters; they define the
//! behavior and must not be "improved" in isolation.

use crate::domain::{PredictedPlay, PredictionSet, PressureRisk, SituationSnapshot};

/// Touchdown probability base by field position: (max yardline_100, prob).
/// First matching row wins.
const TD_BASE_BY_YARDLINE: [(u32, f64); 4] = [(5, 0.55), (10, 0.40), (20, 0.28), (50, 0.15)];
const TD_BASE_DEFAULT: f64 = 0.08;

/// Field goal make probability by attempt distance: (max distance, prob).
const FG_PROB_BY_ATTEMPT: [(u32, f64); 4] = [(30, 0.92), (40, 0.82), (50, 0.65), (55, 0.45)];
const FG_PROB_DEFAULT: f64 = 0.25;

/// End-zone depth plus snap placement, in yards, between the line of
/// scrimmage and the kicking spot.
const FG_ATTEMPT_OFFSET: u32 = 17;

/// Full prediction set for one situation.
pub fn predict(situation: &SituationSnapshot) -> PredictionSet {
    let expected_points = expected_points(situation);
    let td_prob = touchdown_probability(situation);
    let fg_prob = field_goal_probability(situation);
    let no_score_prob = no_score_probability(td_prob, fg_prob);
    let pass_probability = pass_probability(situation);
    let run_probability = 1.0 - pass_probability;
    let predicted_play = predicted_play(situation, pass_probability);
    let pressure_probability = pressure_probability(situation);
    let pressure_risk = PressureRisk::from_probability(pressure_probability);

    PredictionSet {
        expected_points,
        td_prob,
        fg_prob,
        no_score_prob,
        pass_probability,
        run_probability,
        predicted_play,
        pressure_probability,
        pressure_risk,
    }
}

/// Heuristic point value of the current situation: linear in field position,
/// adjusted for down and distance, with stacking red-zone tiers.
pub fn expected_points(situation: &SituationSnapshot) -> f64 {
    let yardline = situation.yardline_100;
    let mut ep = f64::from(100u32.saturating_sub(yardline)) * 0.06 - 1.0;

    ep += match situation.down {
        1 => 0.5,
        2 => 0.1,
        3 => -0.4,
        4 => -1.2,
        _ => 0.0,
    };

    if situation.distance <= 3 {
        ep += 0.4;
    } else if situation.distance >= 10 {
        ep -= 0.3;
    }

    // Red-zone tiers stack: deep inside the 5 earns all three bonuses.
    if yardline <= 20 {
        ep += 1.5;
    }
    if yardline <= 10 {
        ep += 1.0;
    }
    if yardline <= 5 {
        ep += 0.5;
    }

    ep
}

/// Touchdown probability: field-position bucket, scaled by down, capped.
pub fn touchdown_probability(situation: &SituationSnapshot) -> f64 {
    let mut prob = bucket(
        &TD_BASE_BY_YARDLINE,
        TD_BASE_DEFAULT,
        situation.yardline_100,
    );

    if situation.down == 1 {
        prob *= 1.1;
    } else if situation.down == 4 {
        prob *= 0.5;
    }

    prob.min(0.95)
}

/// Field goal make probability, bucketed by attempt distance.
pub fn field_goal_probability(situation: &SituationSnapshot) -> f64 {
    let attempt_distance = situation.yardline_100 + FG_ATTEMPT_OFFSET;
    bucket(&FG_PROB_BY_ATTEMPT, FG_PROB_DEFAULT, attempt_distance)
}

/// Residual no-score approximation. Intentionally not a true complement:
/// `{td, fg, no_score}` need not sum to 1.
pub fn no_score_probability(td_prob: f64, fg_prob: f64) -> f64 {
    (1.0 - td_prob - fg_prob * 0.3).max(0.05)
}

/// Pass probability as an ordered override chain; later rules win on
/// conflict, and the short-yardage rule is evaluated last on purpose.
pub fn pass_probability(situation: &SituationSnapshot) -> f64 {
    let mut prob: f64 = 0.55;

    if situation.distance >= 7 {
        prob = 0.72;
    }
    if situation.distance >= 10 {
        prob = 0.78;
    }
    if situation.down == 3 && situation.distance >= 5 {
        prob = 0.82;
    }
    // Two-minute drill while trailing
    if situation.half_seconds_remaining < 120 && situation.score_differential < 0 {
        prob = 0.85;
    }
    // Short yardage overrides everything above
    if situation.distance <= 2 {
        prob = 0.40;
    }

    if situation.shotgun {
        prob += 0.10;
    }

    prob.min(0.95)
}

/// Predicted play call, in exact precedence order.
pub fn predicted_play(situation: &SituationSnapshot, pass_probability: f64) -> PredictedPlay {
    if situation.distance <= 2 {
        PredictedPlay::Run
    } else if situation.down == 4 && situation.yardline_100 > 40 {
        PredictedPlay::Punt
    } else if situation.down == 4 && situation.yardline_100 <= 40 {
        PredictedPlay::FieldGoal
    } else if pass_probability > 0.6 {
        PredictedPlay::Pass
    } else {
        PredictedPlay::Run
    }
}

/// Pressure probability: rusher-count overrides, additive box and
/// down-and-distance adjustments, capped at 0.80.
pub fn pressure_probability(situation: &SituationSnapshot) -> f64 {
    let mut prob: f64 = 0.25;

    if situation.pass_rushers >= 5 {
        prob = 0.45;
    }
    if situation.pass_rushers >= 6 {
        prob = 0.55;
    }

    if situation.defenders_in_box >= 8 {
        prob += 0.10;
    }
    if situation.down == 3 && situation.distance >= 7 {
        prob += 0.10;
    }

    prob.min(0.80)
}

fn bucket(table: &[(u32, f64)], default: f64, value: u32) -> f64 {
    table
        .iter()
        .find(|(max, _)| value <= *max)
        .map(|(_, prob)| *prob)
        .unwrap_or(default)
}
