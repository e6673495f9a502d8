//! Mel and chroma filterbanks
//!
//! The mel scale is the Slaney auditory-toolbox variant (linear below
//! 1 kHz, logarithmic above) with area-normalized triangular filters.

use super::matrix::Matrix;

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Convert frequency to mel scale
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Convert mel to frequency
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Mel filterbank matrix, `n_mels x (n_fft/2 + 1)`
pub fn mel_filterbank(sample_rate: u32, n_fft: usize, n_mels: usize, fmin: f64, fmax: f64) -> Matrix {
    let n_bins = n_fft / 2 + 1;
    let fft_freqs: Vec<f64> = (0..n_bins)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect();

    let mel_min = hz_to_mel(fmin);
    let mel_max = hz_to_mel(fmax);
    let mel_freqs: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f64 / (n_mels + 1) as f64))
        .collect();

    let mut filters = Matrix::zeros(n_mels, n_bins);
    for m in 0..n_mels {
        let (left, center, right) = (mel_freqs[m], mel_freqs[m + 1], mel_freqs[m + 2]);
        let lower_width = center - left;
        let upper_width = right - center;
        let enorm = 2.0 / (right - left);

        for (k, &f) in fft_freqs.iter().enumerate() {
            let lower = (f - left) / lower_width;
            let upper = (right - f) / upper_width;
            let w = lower.min(upper).max(0.0);
            if w > 0.0 {
                filters.set(m, k, (w * enorm) as f32);
            }
        }
    }

    filters
}

/// Chroma filterbank, `n_chroma x (n_fft/2 + 1)`, rows starting at C.
///
/// Gaussian bumps per pitch class, L2-normalized per bin and weighted by a
/// Gaussian over octaves centred on octave 5 (two octaves wide).
pub fn chroma_filterbank(sample_rate: u32, n_fft: usize, n_chroma: usize) -> Matrix {
    const CENTER_OCTAVE: f64 = 5.0;
    const OCTAVE_WIDTH: f64 = 2.0;

    let nc = n_chroma as f64;
    // A0 reference of the octave scale: 440 / 16 Hz
    let a_ref = 440.0 / 16.0;

    // Bin 0 (DC) gets a synthetic position 1.5 octaves below bin 1
    let mut frq_bins: Vec<f64> = (1..n_fft)
        .map(|k| {
            let f = k as f64 * sample_rate as f64 / n_fft as f64;
            nc * (f / a_ref).log2()
        })
        .collect();
    frq_bins.insert(0, frq_bins[0] - 1.5 * nc);

    let mut bin_widths: Vec<f64> = frq_bins
        .windows(2)
        .map(|w| (w[1] - w[0]).max(1.0))
        .collect();
    bin_widths.push(1.0);

    let half = (nc / 2.0).round();
    let n_cols = frq_bins.len();
    let mut weights = vec![vec![0.0f64; n_cols]; n_chroma];
    for (c, row) in weights.iter_mut().enumerate() {
        for (k, w) in row.iter_mut().enumerate() {
            let d = (frq_bins[k] - c as f64 + half + 10.0 * nc).rem_euclid(nc) - half;
            *w = (-0.5 * (2.0 * d / bin_widths[k]).powi(2)).exp();
        }
    }

    for k in 0..n_cols {
        let norm = weights.iter().map(|row| row[k] * row[k]).sum::<f64>().sqrt();
        let octave_weight = (-0.5 * ((frq_bins[k] / nc - CENTER_OCTAVE) / OCTAVE_WIDTH).powi(2)).exp();
        for row in weights.iter_mut() {
            if norm > 0.0 {
                row[k] /= norm;
            }
            row[k] *= octave_weight;
        }
    }

    // Rotate so row 0 is C rather than A
    let shift = 3 * (n_chroma / 12);
    weights.rotate_left(shift % n_chroma.max(1));

    let n_bins = n_fft / 2 + 1;
    Matrix::from_rows(
        weights
            .into_iter()
            .map(|row| row[..n_bins].iter().map(|&v| v as f32).collect())
            .collect(),
    )
}
