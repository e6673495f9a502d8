// src/core/backend.rs
//
// Signal-processing capability consumed by the pipeline stages. The default
// implementation is built on realfft (STFT) and rubato (resampling) and
// reproduces the usual speech/music-analysis conventions: centred frames,
// periodic Hann window, Slaney mel scale, dB with an 80 dB floor.

use log::debug;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::{Arc, RwLock};

use crate::core::analysis::{
    chroma_from_power, estimate_tempo, log_mel, mel_spectrogram, mfcc_from_mel, onset_strength,
    spectral_centroid, spectral_contrast, spectral_rolloff, CONTRAST_BANDS, CONTRAST_FMIN,
    CONTRAST_QUANTILE, ROLL_PERCENT,
};
use crate::core::dsp::mel::{chroma_filterbank, mel_filterbank};
use crate::core::dsp::resample::resample_mono;
use crate::core::dsp::stats::{frame_rms, frame_zero_crossing_rate, AMIN};
use crate::core::dsp::{Matrix, StftProcessor};
use crate::error::Result;

/// Pitch classes in a chromagram
pub const N_CHROMA: usize = 12;

/// Numeric operations the feature extractor, heuristic classifier and
/// intensity estimator are written against.
///
/// Matrices are `features x frames`; per-frame series have one value per
/// centred frame.
pub trait SignalProcessingBackend: Send + Sync {
    fn resample(&self, samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>>;

    /// Sample range left after dropping leading and trailing frames more than
    /// `top_db` below the loudest frame. Empty when nothing is loud enough.
    fn trim_silence(&self, samples: &[f32], top_db: f32) -> Range<usize>;

    /// Mel power spectrogram
    fn mel_spectrogram(&self, samples: &[f32], sample_rate: u32) -> Result<Matrix>;

    fn mfcc(&self, samples: &[f32], sample_rate: u32, n_mfcc: usize) -> Result<Matrix>;

    fn spectral_centroid(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>>;

    fn spectral_contrast(&self, samples: &[f32], sample_rate: u32) -> Result<Matrix>;

    fn spectral_rolloff(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>>;

    fn rms(&self, samples: &[f32]) -> Vec<f32>;

    fn zero_crossing_rate(&self, samples: &[f32]) -> Vec<f32>;

    /// Chromagram, each frame scaled so its strongest class is 1
    fn chroma(&self, samples: &[f32], sample_rate: u32) -> Result<Matrix>;

    fn onset_strength(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>>;

    /// Global tempo in BPM from an onset envelope
    fn tempo(&self, onset_envelope: &[f32], sample_rate: u32) -> f32;
}

/// Filterbanks keyed by sample rate, built on first use
#[derive(Default)]
struct FilterCache {
    banks: RwLock<HashMap<u32, Arc<Matrix>>>,
}

impl FilterCache {
    fn get_or_build(&self, sample_rate: u32, build: impl FnOnce() -> Matrix) -> Arc<Matrix> {
        if let Some(bank) = self.banks.read().ok().and_then(|b| b.get(&sample_rate).cloned()) {
            return bank;
        }
        let bank = Arc::new(build());
        match self.banks.write() {
            Ok(mut banks) => Arc::clone(banks.entry(sample_rate).or_insert(bank)),
            Err(_) => bank,
        }
    }
}

/// Default backend
pub struct DspBackend {
    stft: StftProcessor,
    n_mels: usize,
    mel_banks: FilterCache,
    chroma_banks: FilterCache,
}

impl DspBackend {
    pub fn new(n_fft: usize, hop_length: usize, n_mels: usize) -> Self {
        Self {
            stft: StftProcessor::new(n_fft, hop_length),
            n_mels,
            mel_banks: FilterCache::default(),
            chroma_banks: FilterCache::default(),
        }
    }

    pub fn n_fft(&self) -> usize {
        self.stft.n_fft()
    }

    pub fn hop_length(&self) -> usize {
        self.stft.hop_length()
    }

    fn mel_filters(&self, sample_rate: u32) -> Arc<Matrix> {
        self.mel_banks.get_or_build(sample_rate, || {
            debug!("Building {}-band mel filterbank for {} Hz", self.n_mels, sample_rate);
            mel_filterbank(
                sample_rate,
                self.stft.n_fft(),
                self.n_mels,
                0.0,
                sample_rate as f64 / 2.0,
            )
        })
    }

    fn chroma_filters(&self, sample_rate: u32) -> Arc<Matrix> {
        self.chroma_banks
            .get_or_build(sample_rate, || chroma_filterbank(sample_rate, self.stft.n_fft(), N_CHROMA))
    }
}

impl Default for DspBackend {
    fn default() -> Self {
        Self::new(2048, 512, 128)
    }
}

impl SignalProcessingBackend for DspBackend {
    fn resample(&self, samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
        resample_mono(samples, from_rate, to_rate)
    }

    fn trim_silence(&self, samples: &[f32], top_db: f32) -> Range<usize> {
        if samples.is_empty() {
            return 0..0;
        }

        let power: Vec<f32> = frame_rms(samples, self.stft.n_fft(), self.stft.hop_length())
            .into_iter()
            .map(|r| r * r)
            .collect();
        let peak = power.iter().copied().fold(0.0f32, f32::max);
        if peak <= AMIN {
            debug!("Signal is silent throughout ({} frames)", power.len());
            return 0..0;
        }

        let ref_db = 10.0 * peak.log10();
        let loud = |p: &f32| 10.0 * p.max(AMIN).log10() - ref_db > -top_db;
        let (Some(first), Some(last)) = (power.iter().position(loud), power.iter().rposition(loud))
        else {
            return 0..0;
        };

        let hop = self.stft.hop_length();
        let start = (first * hop).min(samples.len());
        let end = ((last + 1) * hop).min(samples.len());
        debug!(
            "Trimmed to samples {}..{} (frames {}..={} of {})",
            start,
            end,
            first,
            last,
            power.len()
        );
        start..end
    }

    fn mel_spectrogram(&self, samples: &[f32], sample_rate: u32) -> Result<Matrix> {
        let power = self.stft.power(samples)?;
        Ok(mel_spectrogram(&power, self.mel_filters(sample_rate).as_ref()))
    }

    fn mfcc(&self, samples: &[f32], sample_rate: u32, n_mfcc: usize) -> Result<Matrix> {
        let mel = self.mel_spectrogram(samples, sample_rate)?;
        Ok(mfcc_from_mel(&mel, n_mfcc))
    }

    fn spectral_centroid(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
        let magnitude = self.stft.magnitude(samples)?;
        Ok(spectral_centroid(&magnitude, &self.stft.bin_frequencies(sample_rate)))
    }

    fn spectral_contrast(&self, samples: &[f32], sample_rate: u32) -> Result<Matrix> {
        let magnitude = self.stft.magnitude(samples)?;
        Ok(spectral_contrast(
            &magnitude,
            &self.stft.bin_frequencies(sample_rate),
            CONTRAST_FMIN,
            CONTRAST_BANDS,
            CONTRAST_QUANTILE,
        ))
    }

    fn spectral_rolloff(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
        let magnitude = self.stft.magnitude(samples)?;
        Ok(spectral_rolloff(
            &magnitude,
            &self.stft.bin_frequencies(sample_rate),
            ROLL_PERCENT,
        ))
    }

    fn rms(&self, samples: &[f32]) -> Vec<f32> {
        frame_rms(samples, self.stft.n_fft(), self.stft.hop_length())
    }

    fn zero_crossing_rate(&self, samples: &[f32]) -> Vec<f32> {
        frame_zero_crossing_rate(samples, self.stft.n_fft(), self.stft.hop_length())
    }

    fn chroma(&self, samples: &[f32], sample_rate: u32) -> Result<Matrix> {
        let power = self.stft.power(samples)?;
        Ok(chroma_from_power(&power, self.chroma_filters(sample_rate).as_ref()))
    }

    fn onset_strength(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
        let mel = self.mel_spectrogram(samples, sample_rate)?;
        Ok(onset_strength(
            &log_mel(&mel),
            self.stft.n_fft(),
            self.stft.hop_length(),
        ))
    }

    fn tempo(&self, onset_envelope: &[f32], sample_rate: u32) -> f32 {
        estimate_tempo(onset_envelope, sample_rate, self.stft.hop_length())
    }
}
