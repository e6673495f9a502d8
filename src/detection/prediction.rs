//! Prediction record handed to callers

use serde::{Deserialize, Serialize};

use super::emotion::EmotionLabel;

/// Time-means of the normalized per-frame spectral series.
///
/// Nominally in [0, 1] but not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpectralStats {
    #[serde(rename = "spectral_centroid")]
    pub centroid: f32,
    #[serde(rename = "spectral_contrast")]
    pub contrast: f32,
    #[serde(rename = "spectral_rolloff")]
    pub rolloff: f32,
}

impl SpectralStats {
    /// Trailing scalars appended to the artifact input vector
    pub fn as_array(&self) -> [f32; 3] {
        [self.centroid, self.contrast, self.rolloff]
    }
}

/// Result of one inference call.
///
/// Serializes with the field names persisted by the storage layer
/// (`primary_emotion`, `secondary_emotion`, `duration`, `spectral_features`).
/// Optional fields are omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "primary_emotion")]
    primary: EmotionLabel,
    #[serde(rename = "secondary_emotion", default, skip_serializing_if = "Option::is_none")]
    secondary: Option<EmotionLabel>,
    confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secondary_confidence: Option<f32>,
    intensity: f32,
    #[serde(rename = "duration")]
    duration_seconds: f32,
    #[serde(rename = "spectral_features", default, skip_serializing_if = "Option::is_none")]
    spectral: Option<SpectralStats>,
}

/// Primary label reported when the pipeline cannot produce a real answer
pub const DEGRADED_LABEL: EmotionLabel = EmotionLabel::Calm;
/// Confidence and intensity reported by a degraded prediction
pub const DEGRADED_SCORE: f32 = 0.5;

impl Prediction {
    /// Assemble a full prediction. Confidences and intensity are clamped into
    /// [0, 1]; duration is clamped at 0. A secondary equal to the primary is
    /// dropped.
    pub fn new(
        primary: (EmotionLabel, f32),
        secondary: Option<(EmotionLabel, f32)>,
        intensity: f32,
        duration_seconds: f32,
        spectral: Option<SpectralStats>,
    ) -> Self {
        let secondary = secondary.filter(|(label, _)| *label != primary.0);
        Self {
            primary: primary.0,
            secondary: secondary.map(|(label, _)| label),
            confidence: unit(primary.1),
            secondary_confidence: secondary.map(|(_, c)| unit(c)),
            intensity: unit(intensity),
            duration_seconds: if duration_seconds.is_finite() {
                duration_seconds.max(0.0)
            } else {
                0.0
            },
            spectral,
        }
    }

    /// The fixed fallback answer: Calm, confidence 0.5, intensity 0.5
    pub fn degraded(duration_seconds: f32) -> Self {
        Self::new(
            (DEGRADED_LABEL, DEGRADED_SCORE),
            None,
            DEGRADED_SCORE,
            duration_seconds,
            None,
        )
    }

    pub fn primary(&self) -> EmotionLabel {
        self.primary
    }

    pub fn secondary(&self) -> Option<EmotionLabel> {
        self.secondary
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn secondary_confidence(&self) -> Option<f32> {
        self.secondary_confidence
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn duration_seconds(&self) -> f32 {
        self.duration_seconds
    }

    pub fn spectral(&self) -> Option<&SpectralStats> {
        self.spectral.as_ref()
    }
}

fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_shape() {
        let p = Prediction::degraded(0.0);
        assert_eq!(p.primary(), EmotionLabel::Calm);
        assert_eq!(p.confidence(), 0.5);
        assert_eq!(p.intensity(), 0.5);
        assert_eq!(p.duration_seconds(), 0.0);
        assert!(p.secondary().is_none());
        assert!(p.secondary_confidence().is_none());
        assert!(p.spectral().is_none());
    }

    #[test]
    fn test_degraded_json_omits_optional_fields() {
        let json = serde_json::to_value(Prediction::degraded(0.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "primary_emotion": "Calm",
                "confidence": 0.5,
                "intensity": 0.5,
                "duration": 0.0
            })
        );
    }

    #[test]
    fn test_secondary_equal_to_primary_is_dropped() {
        let p = Prediction::new(
            (EmotionLabel::Joy, 0.4),
            Some((EmotionLabel::Joy, 0.4)),
            0.3,
            1.0,
            None,
        );
        assert!(p.secondary().is_none());
        assert!(p.secondary_confidence().is_none());
    }

    #[test]
    fn test_values_are_clamped() {
        let p = Prediction::new(
            (EmotionLabel::Anger, 1.3),
            Some((EmotionLabel::Fear, -0.2)),
            f32::NAN,
            -1.0,
            None,
        );
        assert_eq!(p.confidence(), 1.0);
        assert_eq!(p.secondary_confidence(), Some(0.0));
        assert_eq!(p.intensity(), 0.0);
        assert_eq!(p.duration_seconds(), 0.0);
    }

    #[test]
    fn test_full_json_field_names() {
        let p = Prediction::new(
            (EmotionLabel::Joy, 0.6),
            Some((EmotionLabel::Anger, 0.1)),
            0.7,
            2.5,
            Some(SpectralStats {
                centroid: 0.1,
                contrast: 0.2,
                rolloff: 0.3,
            }),
        );
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["primary_emotion"], "Joy");
        assert_eq!(json["secondary_emotion"], "Anger");
        assert!(json["spectral_features"]["spectral_rolloff"].is_number());

        let back: Prediction = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
