// src/core/confidence.rs
//
// Spectral-condition boosts applied to artifact confidences.

use crate::detection::{EmotionLabel, SpectralStats};

/// One `(label, condition) -> factor` rule
struct Boost {
    label: EmotionLabel,
    factor: f32,
    applies: fn(&SpectralStats) -> bool,
}

const BOOSTS: [Boost; 4] = [
    Boost {
        label: EmotionLabel::Anger,
        factor: 1.20,
        applies: |s| s.contrast > 0.6,
    },
    Boost {
        label: EmotionLabel::Joy,
        factor: 1.15,
        applies: |s| s.centroid > 0.5 && s.rolloff > 0.6,
    },
    Boost {
        label: EmotionLabel::Sadness,
        factor: 1.25,
        applies: |s| s.centroid < 0.4 && s.contrast < 0.4,
    },
    Boost {
        label: EmotionLabel::Fear,
        factor: 1.10,
        applies: |s| s.rolloff > 0.7,
    },
];

/// Multiplicative confidence boost, capped at 1.0. The result is never
/// below the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceAdjuster;

impl ConfidenceAdjuster {
    pub fn new() -> Self {
        Self
    }

    pub fn adjust(&self, confidence: f32, label: EmotionLabel, spectral: &SpectralStats) -> f32 {
        let boosted = BOOSTS
            .iter()
            .find(|b| b.label == label && (b.applies)(spectral))
            .map_or(confidence, |b| (confidence * b.factor).min(1.0));
        boosted.max(confidence)
    }
}
