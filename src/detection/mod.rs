//! Output record types

mod emotion;
mod prediction;
mod summary;

pub use emotion::EmotionLabel;
pub use prediction::{Prediction, SpectralStats, DEGRADED_LABEL, DEGRADED_SCORE};
pub use summary::{EmotionSummary, EmotionTally};
