//! Aggregation of many predictions (batch runs)

use serde::Serialize;
use std::collections::BTreeMap;

use super::emotion::EmotionLabel;
use super::prediction::Prediction;

/// Per-emotion aggregate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EmotionTally {
    pub count: usize,
    pub mean_confidence: f32,
    pub mean_intensity: f32,
}

/// Distribution of primary emotions over a set of predictions
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmotionSummary {
    pub total: usize,
    pub degraded: usize,
    pub by_emotion: BTreeMap<String, EmotionTally>,
    #[serde(skip)]
    sums: [(usize, f64, f64); EmotionLabel::COUNT],
}

impl EmotionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one prediction. Degraded results are counted but kept out of
    /// the per-emotion averages.
    pub fn add(&mut self, prediction: &Prediction, degraded: bool) {
        self.total += 1;
        if degraded {
            self.degraded += 1;
            return;
        }

        let label = prediction.primary();
        let slot = &mut self.sums[label.index()];
        slot.0 += 1;
        slot.1 += prediction.confidence() as f64;
        slot.2 += prediction.intensity() as f64;

        let (count, conf_sum, int_sum) = *slot;
        self.by_emotion.insert(
            label.name().to_string(),
            EmotionTally {
                count,
                mean_confidence: (conf_sum / count as f64) as f32,
                mean_intensity: (int_sum / count as f64) as f32,
            },
        );
    }

    /// Most frequent primary emotion; earlier labels win ties
    pub fn dominant(&self) -> Option<EmotionLabel> {
        let mut best: Option<(EmotionLabel, usize)> = None;
        for label in EmotionLabel::ALL {
            let count = self.sums[label.index()].0;
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(label: EmotionLabel, confidence: f32, intensity: f32) -> Prediction {
        Prediction::new((label, confidence), None, intensity, 1.0, None)
    }

    #[test]
    fn test_averages_per_emotion() {
        let mut summary = EmotionSummary::new();
        summary.add(&prediction(EmotionLabel::Joy, 0.8, 0.6), false);
        summary.add(&prediction(EmotionLabel::Joy, 0.4, 0.2), false);
        summary.add(&prediction(EmotionLabel::Fear, 0.5, 0.5), false);

        let joy = summary.by_emotion["Joy"];
        assert_eq!(joy.count, 2);
        assert!((joy.mean_confidence - 0.6).abs() < 1e-6);
        assert!((joy.mean_intensity - 0.4).abs() < 1e-6);
        assert_eq!(summary.dominant(), Some(EmotionLabel::Joy));
    }

    #[test]
    fn test_degraded_excluded_from_distribution() {
        let mut summary = EmotionSummary::new();
        summary.add(&Prediction::degraded(0.0), true);
        assert_eq!(summary.total, 1);
        assert_eq!(summary.degraded, 1);
        assert!(summary.by_emotion.is_empty());
        assert_eq!(summary.dominant(), None);
    }
}
