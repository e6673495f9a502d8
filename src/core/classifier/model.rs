// src/core/classifier/model.rs
//
// Artifact-backed classification. The artifact maps the flattened feature
// vector to seven non-negative scores in label order
// [Anger, Disgust, Fear, Joy, Sadness, Surprise, Calm].

use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::{Classifier, ClassifierInput, ClassifierKind, LabelScores};
use crate::detection::EmotionLabel;
use crate::error::{EmotionError, Result};

/// A loaded, read-only scoring model
pub trait ClassifierArtifact: Send + Sync {
    /// Expected input vector length, if the artifact knows it
    fn input_len(&self) -> Option<usize>;

    /// Raw output vector for one input
    fn predict(&self, input: &[f32]) -> Result<Vec<f32>>;
}

/// Multinomial linear model: `softmax(W x + b)`.
///
/// Stored as JSON:
/// `{"labels": [...], "input_len": N, "weights": [[..N..] x 7], "bias": [..7..]}`
#[derive(Debug, Clone, Deserialize)]
pub struct LinearArtifact {
    labels: Vec<String>,
    input_len: usize,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl LinearArtifact {
    pub fn new(weights: Vec<Vec<f32>>, bias: Vec<f32>) -> Result<Self> {
        let input_len = weights.first().map(Vec::len).unwrap_or(0);
        let artifact = Self {
            labels: EmotionLabel::ALL.iter().map(|l| l.name().to_string()).collect(),
            input_len,
            weights,
            bias,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(text)
            .map_err(|e| EmotionError::ArtifactLoad(format!("Malformed artifact: {}", e)))?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<()> {
        let expected: Vec<&str> = EmotionLabel::ALL.iter().map(|l| l.name()).collect();
        let matches = self.labels.len() == expected.len()
            && self
                .labels
                .iter()
                .zip(&expected)
                .all(|(a, b)| a.eq_ignore_ascii_case(b));
        if !matches {
            return Err(EmotionError::ArtifactLoad(format!(
                "Label order {:?} does not match {:?}",
                self.labels, expected
            )));
        }
        if self.weights.len() != EmotionLabel::COUNT || self.bias.len() != EmotionLabel::COUNT {
            return Err(EmotionError::ArtifactLoad(format!(
                "Expected {} weight rows and biases, found {} and {}",
                EmotionLabel::COUNT,
                self.weights.len(),
                self.bias.len()
            )));
        }
        if self.input_len == 0 || self.weights.iter().any(|row| row.len() != self.input_len) {
            return Err(EmotionError::ArtifactLoad(format!(
                "Every weight row must have input_len = {} entries",
                self.input_len
            )));
        }
        let finite = self
            .weights
            .iter()
            .flatten()
            .chain(&self.bias)
            .all(|v| v.is_finite());
        if !finite {
            return Err(EmotionError::ArtifactLoad("Non-finite parameter".into()));
        }
        Ok(())
    }
}

impl ClassifierArtifact for LinearArtifact {
    fn input_len(&self) -> Option<usize> {
        Some(self.input_len)
    }

    fn predict(&self, input: &[f32]) -> Result<Vec<f32>> {
        if input.len() != self.input_len {
            return Err(EmotionError::Classification(format!(
                "Artifact expects {} inputs, got {}",
                self.input_len,
                input.len()
            )));
        }

        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, &b)| {
                row.iter()
                    .zip(input)
                    .map(|(&w, &x)| w as f64 * x as f64)
                    .sum::<f64>()
                    + b as f64
            })
            .collect();

        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|&z| (z - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        Ok(exps.iter().map(|&e| (e / total) as f32).collect())
    }
}

/// Load an artifact from disk. Only the JSON linear format is understood.
pub fn load_artifact(path: &Path) -> Result<Arc<dyn ClassifierArtifact>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    if ext.as_deref() != Some("json") {
        return Err(EmotionError::ArtifactLoad(format!(
            "Unsupported artifact format: {}",
            path.display()
        )));
    }

    let text = fs::read_to_string(path)
        .map_err(|e| EmotionError::ArtifactLoad(format!("{}: {}", path.display(), e)))?;
    let artifact = LinearArtifact::from_json(&text)?;
    info!(
        "Loaded linear artifact from {} ({} inputs)",
        path.display(),
        artifact.input_len
    );
    Ok(Arc::new(artifact))
}

/// Classifier delegating to a shared artifact
pub struct ModelBackedClassifier {
    artifact: Arc<dyn ClassifierArtifact>,
    include_spectral: bool,
}

impl ModelBackedClassifier {
    /// `include_spectral` appends `[centroid, contrast, rolloff]` to the
    /// flattened feature matrix
    pub fn new(artifact: Arc<dyn ClassifierArtifact>, include_spectral: bool) -> Self {
        Self {
            artifact,
            include_spectral,
        }
    }

    /// Input vector handed to the artifact
    pub fn feature_vector(&self, input: &ClassifierInput<'_>) -> Vec<f32> {
        let mut vector = input.features.flatten();
        if self.include_spectral {
            vector.extend_from_slice(&input.spectral.as_array());
        }
        vector
    }
}

impl Classifier for ModelBackedClassifier {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Model
    }

    fn score(&self, input: &ClassifierInput<'_>) -> Result<LabelScores> {
        let vector = self.feature_vector(input);
        if let Some(expected) = self.artifact.input_len() {
            if expected != vector.len() {
                return Err(EmotionError::Classification(format!(
                    "Feature vector has {} values, artifact expects {}",
                    vector.len(),
                    expected
                )));
            }
        }

        let output = self.artifact.predict(&vector)?;
        let scores: [f32; EmotionLabel::COUNT] = output.as_slice().try_into().map_err(|_| {
            EmotionError::Classification(format!(
                "Artifact returned {} scores, expected {}",
                output.len(),
                EmotionLabel::COUNT
            ))
        })?;
        if scores.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(EmotionError::Classification(format!(
                "Artifact returned invalid scores {:?}",
                scores
            )));
        }

        debug!("Artifact scores: {:?}", scores);
        Ok(LabelScores::new(scores))
    }
}
