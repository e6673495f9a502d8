// src/core/intensity.rs
//
// Scalar emotional intensity from energy, onset activity, dynamic range and
// (optionally) the spectral means.

use log::{debug, warn};
use std::sync::Arc;

use crate::config::IntensityWeights;
use crate::core::backend::SignalProcessingBackend;
use crate::core::dsp::stats::mean;
use crate::core::loader::Waveform;
use crate::detection::{SpectralStats, DEGRADED_SCORE};
use crate::error::{EmotionError, Result};

pub struct IntensityEstimator {
    backend: Arc<dyn SignalProcessingBackend>,
    weights: IntensityWeights,
}

impl IntensityEstimator {
    pub fn new(backend: Arc<dyn SignalProcessingBackend>, weights: IntensityWeights) -> Self {
        Self { backend, weights }
    }

    /// Intensity in [0, 1]; 0.5 when it cannot be computed
    pub fn estimate(&self, waveform: &Waveform, spectral: Option<&SpectralStats>) -> f32 {
        match self.try_estimate(waveform, spectral) {
            Ok(value) => value,
            Err(e) => {
                warn!("Intensity estimation failed, using {}: {}", DEGRADED_SCORE, e);
                DEGRADED_SCORE
            }
        }
    }

    pub fn try_estimate(&self, waveform: &Waveform, spectral: Option<&SpectralStats>) -> Result<f32> {
        let samples = &waveform.samples;
        if samples.is_empty() {
            return Err(EmotionError::FeatureComputation("Empty waveform".into()));
        }

        let rms = mean(&self.backend.rms(samples));
        let onset = mean(&self.backend.onset_strength(samples, waveform.sample_rate)?);
        let (lo, hi) = samples.iter().fold((f32::INFINITY, 0.0f32), |(lo, hi), s| {
            let a = s.abs();
            (lo.min(a), hi.max(a))
        });

        let base = (rms * 10.0).min(1.0);
        let onset = (onset * 5.0).min(1.0);
        let dynamic = ((hi - lo) * 2.0).min(1.0);

        let w = &self.weights;
        let intensity = match spectral {
            Some(s) => {
                let factor = w.contrast * s.contrast + w.centroid * s.centroid + w.rolloff * s.rolloff;
                w.energy * base + w.onset * onset + w.dynamic * dynamic + w.spectral * factor
            }
            None => w.energy_without_spectral * base + w.onset * onset + w.dynamic * dynamic,
        };

        if !intensity.is_finite() {
            return Err(EmotionError::FeatureComputation(format!(
                "Non-finite intensity (base {}, onset {}, dynamic {})",
                base, onset, dynamic
            )));
        }

        debug!(
            "Intensity {:.4} (base {:.3}, onset {:.3}, dynamic {:.3})",
            intensity, base, onset, dynamic
        );
        Ok(intensity.clamp(0.0, 1.0))
    }
}
