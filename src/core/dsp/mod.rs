//! Digital Signal Processing utilities

pub mod matrix;
pub mod mel;
pub mod resample;
pub mod stats;
pub mod windows;

use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

use crate::error::{EmotionError, Result};
pub use matrix::Matrix;
use stats::{center_pad, frame_count, PadMode};
use windows::hann_window;

/// Short-time Fourier transform with centred, zero-padded frames
pub struct StftProcessor {
    n_fft: usize,
    hop_length: usize,
    window: Vec<f32>,
    fft: Arc<dyn RealToComplex<f32>>,
}

impl StftProcessor {
    pub fn new(n_fft: usize, hop_length: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        Self {
            n_fft,
            hop_length,
            window: hann_window(n_fft),
            fft: planner.plan_fft_forward(n_fft),
        }
    }

    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Number of positive-frequency bins
    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Centre frequency of every bin, `0..=sr/2`
    pub fn bin_frequencies(&self, sample_rate: u32) -> Vec<f32> {
        let step = sample_rate as f32 / self.n_fft as f32;
        (0..self.n_bins()).map(|k| k as f32 * step).collect()
    }

    /// Magnitude spectrogram, `n_bins x frames`
    pub fn magnitude(&self, samples: &[f32]) -> Result<Matrix> {
        self.spectrogram(samples, |re, im| (re * re + im * im).sqrt())
    }

    /// Power spectrogram, `n_bins x frames`
    pub fn power(&self, samples: &[f32]) -> Result<Matrix> {
        self.spectrogram(samples, |re, im| re * re + im * im)
    }

    fn spectrogram(&self, samples: &[f32], cell: impl Fn(f32, f32) -> f32) -> Result<Matrix> {
        if samples.is_empty() {
            return Err(EmotionError::FeatureComputation("Empty signal".into()));
        }

        let padded = center_pad(samples, self.n_fft, PadMode::Constant);
        let num_frames = frame_count(samples.len(), self.hop_length);
        let mut out = Matrix::zeros(self.n_bins(), num_frames);

        let mut input = self.fft.make_input_vec();
        let mut spectrum = self.fft.make_output_vec();

        for t in 0..num_frames {
            let start = t * self.hop_length;
            for (i, slot) in input.iter_mut().enumerate() {
                *slot = padded.get(start + i).copied().unwrap_or(0.0) * self.window[i];
            }

            self.fft
                .process(&mut input, &mut spectrum)
                .map_err(|e| EmotionError::FeatureComputation(format!("FFT failed: {}", e)))?;

            for (k, c) in spectrum.iter().enumerate() {
                out.set(k, t, cell(c.re, c.im));
            }
        }

        Ok(out)
    }
}
