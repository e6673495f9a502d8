//! Emotion classifiers
//!
//! Two implementations of [`Classifier`] exist: [`ModelBackedClassifier`]
//! wraps a loaded [`ClassifierArtifact`]; [`HeuristicClassifier`] scores
//! labels from fixed formulas over waveform descriptors and is used when
//! no artifact is available. The service picks one at construction.

mod heuristic;
mod model;

pub use heuristic::{HeuristicClassifier, HeuristicDescriptors, HEURISTIC_TIE_ORDER};
pub use model::{load_artifact, ClassifierArtifact, LinearArtifact, ModelBackedClassifier};

use serde::Serialize;
use std::fmt;

use crate::core::features::FeatureMatrix;
use crate::core::loader::Waveform;
use crate::detection::{EmotionLabel, SpectralStats};
use crate::error::Result;

/// Which classifier produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    Model,
    Heuristic,
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierKind::Model => write!(f, "model"),
            ClassifierKind::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Everything a classifier may look at for one inference
pub struct ClassifierInput<'a> {
    pub features: &'a FeatureMatrix,
    pub spectral: &'a SpectralStats,
    /// Full resampled waveform, before silence trimming
    pub waveform: &'a Waveform,
}

/// One score per label, indexed in artifact order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelScores([f32; EmotionLabel::COUNT]);

impl LabelScores {
    pub fn new(scores: [f32; EmotionLabel::COUNT]) -> Self {
        Self(scores)
    }

    pub fn get(&self, label: EmotionLabel) -> f32 {
        self.0[label.index()]
    }

    pub fn as_array(&self) -> &[f32; EmotionLabel::COUNT] {
        &self.0
    }

    /// Highest and second-highest labels.
    ///
    /// Labels are visited in `order` and a later label only displaces an
    /// earlier one on a strictly greater score, so ties go to whichever
    /// comes first in `order`. The secondary never equals the primary.
    pub fn top_two(&self, order: &[EmotionLabel; EmotionLabel::COUNT]) -> ((EmotionLabel, f32), (EmotionLabel, f32)) {
        let best = |exclude: Option<EmotionLabel>| {
            order
                .iter()
                .copied()
                .filter(|&label| Some(label) != exclude)
                .fold(None, |best: Option<(EmotionLabel, f32)>, label| {
                    let score = self.get(label);
                    match best {
                        Some((_, s)) if score <= s => best,
                        _ => Some((label, score)),
                    }
                })
        };

        let primary = best(None).unwrap_or((order[0], self.get(order[0])));
        let secondary = best(Some(primary.0)).unwrap_or((order[1], self.get(order[1])));
        (primary, secondary)
    }
}

pub trait Classifier: Send + Sync {
    fn kind(&self) -> ClassifierKind;

    fn score(&self, input: &ClassifierInput<'_>) -> Result<LabelScores>;

    /// Precedence among equal scores
    fn tie_order(&self) -> &'static [EmotionLabel; EmotionLabel::COUNT] {
        &EmotionLabel::ALL
    }
}
