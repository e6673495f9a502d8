// src/error.rs
//
// Error taxonomy for the inference pipeline. None of these reach callers of
// EmotionDetectionService; the service folds them into a degraded prediction
// and reports them through the diagnostics side channel.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmotionError {
    /// Audio source unreadable, corrupt or in an unsupported encoding
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// Classifier artifact missing or corrupt at startup
    #[error("Failed to load classifier artifact: {0}")]
    ArtifactLoad(String),

    /// Numeric failure during feature extraction (e.g. nothing left after trimming)
    #[error("Feature computation failed: {0}")]
    FeatureComputation(String),

    /// Classifier produced an unusable score vector
    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Inference exceeded {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EmotionError>;

impl From<serde_json::Error> for EmotionError {
    fn from(err: serde_json::Error) -> Self {
        EmotionError::Config(err.to_string())
    }
}

impl From<symphonia::core::errors::Error> for EmotionError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        EmotionError::Decode(err.to_string())
    }
}
