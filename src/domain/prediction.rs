use serde::{Deserialize, Serialize};
use std::fmt;

/// Play call predicted for the current situation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictedPlay {
    Run,
    Pass,
    Punt,
    FieldGoal,
}

impl PredictedPlay {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictedPlay::Run => "run",
            PredictedPlay::Pass => "pass",
            PredictedPlay::Punt => "punt",
            PredictedPlay::FieldGoal => "field_goal",
        }
    }
}

impl fmt::Display for PredictedPlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Quarterback pressure risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureRisk {
    Low,
    Medium,
    High,
}

impl PressureRisk {
    /// Bucket a pressure probability. Exhaustive: `high ⟺ ≥0.45`,
    /// `medium ⟺ [0.30, 0.45)`, `low ⟺ <0.30`.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.45 {
            PressureRisk::High
        } else if probability >= 0.30 {
            PressureRisk::Medium
        } else {
            PressureRisk::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PressureRisk::Low => "low",
            PressureRisk::Medium => "medium",
            PressureRisk::High => "high",
        }
    }
}

impl fmt::Display for PressureRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deterministic output of the prediction engine.
///
/// Computed on demand, immutable, never cached. `td_prob`, `fg_prob` and
/// `no_score_prob` are independent heuristics and do not sum to 1;
/// `pass_probability + run_probability == 1` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionSet {
    pub expected_points: f64,
    pub td_prob: f64,
    pub fg_prob: f64,
    pub no_score_prob: f64,
    pub pass_probability: f64,
    pub run_probability: f64,
    pub predicted_play: PredictedPlay,
    pub pressure_probability: f64,
    pub pressure_risk: PressureRisk,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_risk_partitions_probability_range() {
        assert_eq!(PressureRisk::from_probability(0.80), PressureRisk::High);
        assert_eq!(PressureRisk::from_probability(0.45), PressureRisk::High);
        assert_eq!(PressureRisk::from_probability(0.4499), PressureRisk::Medium);
        assert_eq!(PressureRisk::from_probability(0.30), PressureRisk::Medium);
        assert_eq!(PressureRisk::from_probability(0.2999), PressureRisk::Low);
        assert_eq!(PressureRisk::from_probability(0.0), PressureRisk::Low);
    }

    #[test]
    fn predicted_play_serializes_snake_case() {
        let json = serde_json::to_string(&PredictedPlay::FieldGoal).expect("serialize");
        assert_eq!(json, "\"field_goal\"");

        let parsed: PredictedPlay = serde_json::from_str("\"punt\"").expect("deserialize");
        assert_eq!(parsed, PredictedPlay::Punt);
    }

    #[test]
    fn pressure_risk_serializes_lowercase() {
        let json = serde_json::to_string(&PressureRisk::Medium).expect("serialize");
        assert_eq!(json, "\"medium\"");
    }
}
