// src/core/analysis/rhythm.rs
//
// Onset strength envelope and global tempo estimation.
//
// Onset strength is the half-wave rectified first difference of the
// log-mel spectrogram, averaged over mel bands. Tempo is chosen from the
// envelope's autocorrelation, weighted by a log-normal prior centred on
// 120 BPM with a one-octave spread.

use crate::core::dsp::Matrix;

/// Tempo the prior is centred on
pub const PRIOR_BPM: f32 = 120.0;
/// Upper bound on estimated tempo
pub const MAX_BPM: f32 = 320.0;
/// Span of the autocorrelation window (seconds)
pub const AC_SECONDS: f32 = 8.0;

/// Onset strength per frame, same length as the spectrogram.
///
/// The envelope is shifted right by `1 + n_fft / (2 * hop)` frames so values
/// line up with centred STFT frames; the shifted-in frames are zero.
pub fn onset_strength(log_mel: &Matrix, n_fft: usize, hop_length: usize) -> Vec<f32> {
    let frames = log_mel.cols();
    let bands = log_mel.rows();
    if frames == 0 || bands == 0 {
        return Vec::new();
    }

    let lag = 1;
    let pad = lag + n_fft / (2 * hop_length);

    let mut envelope = vec![0.0f32; pad];
    for t in lag..frames {
        let flux: f32 = (0..bands)
            .map(|m| (log_mel.get(m, t) - log_mel.get(m, t - lag)).max(0.0))
            .sum();
        envelope.push(flux / bands as f32);
    }
    envelope.truncate(frames);
    envelope.resize(frames, 0.0);
    envelope
}

/// Global tempo estimate in BPM; 0 when the envelope carries no energy
pub fn estimate_tempo(onset_envelope: &[f32], sample_rate: u32, hop_length: usize) -> f32 {
    if onset_envelope.len() < 2 || !onset_envelope.iter().any(|&v| v > 0.0) {
        return 0.0;
    }

    let window = (AC_SECONDS * sample_rate as f32 / hop_length as f32) as usize;
    let max_lag = window.min(onset_envelope.len() - 1);
    let energy: f64 = onset_envelope.iter().map(|&v| (v as f64) * (v as f64)).sum();
    if energy <= 0.0 {
        return 0.0;
    }

    let frames_per_minute = 60.0 * sample_rate as f64 / hop_length as f64;
    let prior_center = (PRIOR_BPM as f64).log2();

    let mut best: Option<(f64, f64)> = None;
    for lag in 1..=max_lag {
        let bpm = frames_per_minute / lag as f64;
        if bpm > MAX_BPM as f64 {
            continue;
        }

        let ac: f64 = onset_envelope[..onset_envelope.len() - lag]
            .iter()
            .zip(&onset_envelope[lag..])
            .map(|(&a, &b)| a as f64 * b as f64)
            .sum::<f64>()
            / energy;

        let log_prior = -0.5 * (bpm.log2() - prior_center).powi(2);
        let score = (1e6 * ac.max(0.0)).ln_1p() + log_prior;
        if best.map_or(true, |(s, _)| score > s) {
            best = Some((score, bpm));
        }
    }

    best.map_or(0.0, |(_, bpm)| bpm as f32)
}
