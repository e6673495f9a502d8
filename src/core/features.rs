// src/core/features.rs
//
// Fixed-shape cepstral features plus spectral summary statistics.

use log::debug;
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::core::backend::SignalProcessingBackend;
use crate::core::dsp::stats::{mean, std_dev};
use crate::core::dsp::Matrix;
use crate::detection::SpectralStats;
use crate::error::{EmotionError, Result};

/// Guard added to the standard deviation of constant rows
pub const NORMALIZE_EPSILON: f64 = 1e-10;

/// Per-row z-score: `(x - mean) / (std + 1e-10)` with population std.
///
/// Each row is normalized on its own; constant rows become all zeros.
pub fn normalize_rows(matrix: &mut Matrix) {
    for r in 0..matrix.rows() {
        let row = matrix.row_mut(r);
        let m = mean(row) as f64;
        let s = std_dev(row) as f64 + NORMALIZE_EPSILON;
        for v in row.iter_mut() {
            *v = ((*v as f64 - m) / s) as f32;
        }
    }
}

/// `n_mfcc x max_frames` cepstral matrix
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    matrix: Matrix,
}

impl FeatureMatrix {
    pub fn rows(&self) -> usize {
        self.matrix.rows()
    }

    pub fn cols(&self) -> usize {
        self.matrix.cols()
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.matrix.get(row, col)
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Row-major flattening
    pub fn flatten(&self) -> Vec<f32> {
        self.matrix.as_slice().to_vec()
    }
}

/// Output of one extraction
#[derive(Debug, Clone)]
pub struct ExtractedFeatures {
    pub matrix: FeatureMatrix,
    pub duration_secs: f32,
    pub spectral: SpectralStats,
}

pub struct FeatureExtractor {
    backend: Arc<dyn SignalProcessingBackend>,
    sample_rate: u32,
    n_mfcc: usize,
    max_frames: usize,
}

impl FeatureExtractor {
    pub fn new(backend: Arc<dyn SignalProcessingBackend>, config: &PipelineConfig) -> Self {
        Self {
            backend,
            sample_rate: config.sample_rate,
            n_mfcc: config.n_mfcc,
            max_frames: config.max_frames,
        }
    }

    /// Extract features from a trimmed waveform at the pipeline rate
    pub fn extract(&self, samples: &[f32]) -> Result<ExtractedFeatures> {
        if samples.is_empty() {
            return Err(EmotionError::FeatureComputation(
                "No signal left after silence trimming".into(),
            ));
        }

        let duration_secs = samples.len() as f32 / self.sample_rate as f32;

        let mut mfcc = self.backend.mfcc(samples, self.sample_rate, self.n_mfcc)?;
        let mut centroid = Matrix::from_series(self.backend.spectral_centroid(samples, self.sample_rate)?);
        let mut contrast = self.backend.spectral_contrast(samples, self.sample_rate)?;
        let mut rolloff = Matrix::from_series(self.backend.spectral_rolloff(samples, self.sample_rate)?);

        for m in [&mut mfcc, &mut centroid, &mut contrast, &mut rolloff] {
            normalize_rows(m);
            if !m.all_finite() {
                return Err(EmotionError::FeatureComputation(
                    "Non-finite value in feature series".into(),
                ));
            }
        }

        let spectral = SpectralStats {
            centroid: centroid.mean(),
            contrast: contrast.mean(),
            rolloff: rolloff.mean(),
        };

        debug!(
            "Extracted {} frames ({:.2}s); centroid {:.4}, contrast {:.4}, rolloff {:.4}",
            mfcc.cols(),
            duration_secs,
            spectral.centroid,
            spectral.contrast,
            spectral.rolloff
        );

        Ok(ExtractedFeatures {
            matrix: FeatureMatrix {
                matrix: mfcc.fit_columns(self.max_frames),
            },
            duration_secs,
            spectral,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::DspBackend;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(Arc::new(DspBackend::default()), &PipelineConfig::default())
    }

    fn noise(n: usize, seed: u32) -> Vec<f32> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect()
    }

    #[test]
    fn test_normalize_rows() {
        let mut m = Matrix::from_rows(vec![
            vec![1.0, 2.0, 3.0, 4.0, 10.0],
            vec![-5.0, 0.0, 5.0, 100.0, 3.0],
        ]);
        normalize_rows(&mut m);
        for r in 0..2 {
            assert!(mean(m.row(r)).abs() < 1e-6);
            assert!((std_dev(m.row(r)) - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_normalize_constant_row_is_zero() {
        let mut m = Matrix::from_rows(vec![vec![3.0; 6]]);
        normalize_rows(&mut m);
        assert!(m.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_short_input_padded() {
        let features = extractor().extract(&noise(4096, 7)).unwrap();
        assert_eq!((features.matrix.rows(), features.matrix.cols()), (13, 174));
        // 4096 samples give 9 frames; the rest is zero padding
        for r in 0..13 {
            for c in 9..174 {
                assert_eq!(features.matrix.get(r, c), 0.0);
            }
        }
        assert!((features.duration_secs - 4096.0 / 22050.0).abs() < 1e-6);
    }

    #[test]
    fn test_long_input_truncated() {
        let features = extractor().extract(&noise(22050 * 5, 3)).unwrap();
        assert_eq!(features.matrix.cols(), 174);
        assert_eq!(features.matrix.flatten().len(), 13 * 174);
    }

    #[test]
    fn test_spectral_means_near_zero() {
        // Means of z-scored series are ~0 before any padding
        let features = extractor().extract(&noise(22050, 11)).unwrap();
        assert!(features.spectral.centroid.abs() < 1e-4);
        assert!(features.spectral.contrast.abs() < 1e-4);
        assert!(features.spectral.rolloff.abs() < 1e-4);
    }

    #[test]
    fn test_empty_signal_rejected() {
        let err = extractor().extract(&[]).unwrap_err();
        assert!(matches!(err, EmotionError::FeatureComputation(_)));
    }
}
