pub mod cursor;
pub mod prediction;
pub mod situation;

pub use cursor::{CursorPhase, CursorStatus};
pub use prediction::{PredictedPlay, PredictionSet, PressureRisk};
pub use situation::{GameMeta, PlayEvent, PosteamType, SituationSnapshot};
