// src/config/pipeline.rs
//
// Pipeline parameters. The defaults are the values any trained artifact was
// fitted against; changing framing or matrix width breaks compatibility with
// an existing artifact.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EmotionError, Result};

/// Environment variable consulted for the classifier artifact location
pub const MODEL_PATH_ENV: &str = "EMOVOICE_MODEL";

/// Blend weights of the intensity estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntensityWeights {
    /// RMS energy weight when spectral statistics are available
    pub energy: f32,
    pub onset: f32,
    pub dynamic: f32,
    pub spectral: f32,
    /// RMS energy weight when no spectral statistics are available
    pub energy_without_spectral: f32,
    /// Sub-weights of the spectral factor
    pub contrast: f32,
    pub centroid: f32,
    pub rolloff: f32,
}

impl Default for IntensityWeights {
    fn default() -> Self {
        Self {
            energy: 0.4,
            onset: 0.3,
            dynamic: 0.1,
            spectral: 0.2,
            energy_without_spectral: 0.6,
            contrast: 0.4,
            centroid: 0.3,
            rolloff: 0.3,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rate every input is resampled to (Hz)
    pub sample_rate: u32,
    /// Number of cepstral coefficients (rows of the feature matrix)
    pub n_mfcc: usize,
    /// STFT window size in samples
    pub n_fft: usize,
    /// STFT hop in samples
    pub hop_length: usize,
    /// Fixed feature matrix width (frames)
    pub max_frames: usize,
    /// Frames this many dB below the loudest frame count as silence
    pub top_db: f32,
    /// Mel bands feeding the cepstral transform
    pub n_mels: usize,
    /// Append the three spectral means to the artifact's input vector
    pub include_spectral_in_vector: bool,
    pub intensity: IntensityWeights,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            n_mfcc: 13,
            n_fft: 2048,
            hop_length: 512,
            max_frames: 174,
            top_db: 25.0,
            n_mels: 128,
            include_spectral_in_vector: true,
            intensity: IntensityWeights::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(EmotionError::Config("sample_rate must be positive".into()));
        }
        if self.n_fft == 0 || self.hop_length == 0 {
            return Err(EmotionError::Config("n_fft and hop_length must be positive".into()));
        }
        if self.hop_length > self.n_fft {
            return Err(EmotionError::Config(format!(
                "hop_length ({}) exceeds n_fft ({})",
                self.hop_length, self.n_fft
            )));
        }
        if self.n_mfcc == 0 || self.max_frames == 0 {
            return Err(EmotionError::Config("n_mfcc and max_frames must be positive".into()));
        }
        if self.n_mels < self.n_mfcc {
            return Err(EmotionError::Config(format!(
                "n_mels ({}) must be at least n_mfcc ({})",
                self.n_mels, self.n_mfcc
            )));
        }
        if !(self.top_db.is_finite() && self.top_db > 0.0) {
            return Err(EmotionError::Config("top_db must be a positive number".into()));
        }
        Ok(())
    }

    /// Length of the vector a classifier artifact receives
    pub fn feature_vector_len(&self) -> usize {
        let extra = if self.include_spectral_in_vector { 3 } else { 0 };
        self.n_mfcc * self.max_frames + extra
    }
}

/// Default artifact location: `$EMOVOICE_MODEL`, else `<data dir>/emovoice/emotion_model.json`
pub fn default_model_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(MODEL_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::data_dir().map(|dir| dir.join("emovoice").join("emotion_model.json"))
}
