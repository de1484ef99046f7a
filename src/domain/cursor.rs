use serde::{Deserialize, Serialize};
use std::fmt;

/// Cursor state machine phases
///
/// `UNINITIALIZED → ITERATING → {ITERATING, STALE} → ITERATING (after
/// rebuild)`; `reset()` returns to `UNINITIALIZED` from any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CursorPhase {
    /// No read position requested yet; the next fetch acquires one
    Uninitialized,
    /// Holding a live iterator into the partition
    Iterating,
    /// Iterator rejected by the provider; watermark retained for rebuild
    Stale,
}

impl CursorPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CursorPhase::Uninitialized => "UNINITIALIZED",
            CursorPhase::Iterating => "ITERATING",
            CursorPhase::Stale => "STALE",
        }
    }

    /// Check if this phase can transition to another phase
    pub fn can_transition_to(&self, target: CursorPhase) -> bool {
        use CursorPhase::*;

        match (self, target) {
            // Reset is allowed from any phase
            (_, Uninitialized) => true,

            // First fetch acquires an iterator
            (Uninitialized, Iterating) => true,

            // Provider rejected the iterator
            (Iterating, Stale) => true,

            // Rebuild from the preserved watermark
            (Stale, Iterating) => true,

            // Repeated fetches stay in place
            (Iterating, Iterating) => true,
            (Stale, Stale) => true,

            _ => false,
        }
    }
}

impl fmt::Display for CursorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Point-in-time view of a cursor, for status endpoints and logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorStatus {
    pub phase: CursorPhase,
    /// Last durable sequence token, if any records have been consumed
    pub watermark: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use CursorPhase::*;

        assert!(Uninitialized.can_transition_to(Iterating));
        assert!(Iterating.can_transition_to(Stale));
        assert!(Stale.can_transition_to(Iterating));
        assert!(Iterating.can_transition_to(Iterating));

        // Reset from every phase
        assert!(Uninitialized.can_transition_to(Uninitialized));
        assert!(Iterating.can_transition_to(Uninitialized));
        assert!(Stale.can_transition_to(Uninitialized));
    }

    #[test]
    fn invalid_transitions() {
        use CursorPhase::*;

        // A fresh cursor has no iterator to go stale
        assert!(!Uninitialized.can_transition_to(Stale));
    }

    #[test]
    fn display_names() {
        assert_eq!(CursorPhase::Uninitialized.to_string(), "UNINITIALIZED");
        assert_eq!(CursorPhase::Iterating.to_string(), "ITERATING");
        assert_eq!(CursorPhase::Stale.to_string(), "STALE");
    }
}
