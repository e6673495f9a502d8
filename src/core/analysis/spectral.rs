// src/core/analysis/spectral.rs
//
// Per-frame spectral shape descriptors computed from a magnitude
// spectrogram (`n_bins x frames`).

use crate::core::dsp::stats::power_to_db;
use crate::core::dsp::Matrix;

/// Fraction of spectral energy below the rolloff frequency
pub const ROLL_PERCENT: f32 = 0.85;

/// Lower edge of the first contrast octave band (Hz)
pub const CONTRAST_FMIN: f32 = 200.0;
/// Number of octave bands above the base band
pub const CONTRAST_BANDS: usize = 6;
/// Share of each band averaged for the peak and valley estimates
pub const CONTRAST_QUANTILE: f32 = 0.02;

/// Frequency-weighted centre of mass per frame (Hz). Silent frames yield 0.
pub fn spectral_centroid(magnitude: &Matrix, freqs: &[f32]) -> Vec<f32> {
    (0..magnitude.cols())
        .map(|t| {
            let mut total = 0.0f64;
            let mut weighted = 0.0f64;
            for (k, &f) in freqs.iter().enumerate() {
                let m = magnitude.get(k, t) as f64;
                total += m;
                weighted += m * f as f64;
            }
            if total > 0.0 {
                (weighted / total) as f32
            } else {
                0.0
            }
        })
        .collect()
}

/// Lowest bin frequency below which `roll_percent` of the magnitude sum lies
pub fn spectral_rolloff(magnitude: &Matrix, freqs: &[f32], roll_percent: f32) -> Vec<f32> {
    (0..magnitude.cols())
        .map(|t| {
            let total: f64 = (0..magnitude.rows()).map(|k| magnitude.get(k, t) as f64).sum();
            let threshold = roll_percent as f64 * total;
            let mut cumulative = 0.0f64;
            for (k, &f) in freqs.iter().enumerate() {
                cumulative += magnitude.get(k, t) as f64;
                if cumulative >= threshold {
                    return f;
                }
            }
            freqs.last().copied().unwrap_or(0.0)
        })
        .collect()
}

/// Bin indices belonging to each octave band, lowest band first.
///
/// Each band above the first also takes the bin just below its lower edge;
/// the top band absorbs everything up to Nyquist; every band except the top
/// drops its highest bin.
fn contrast_bands(freqs: &[f32], fmin: f32, n_bands: usize) -> Vec<(Vec<usize>, usize)> {
    let mut edges = vec![0.0f32];
    edges.extend((0..=n_bands).map(|i| fmin * 2f32.powi(i as i32)));

    edges
        .windows(2)
        .enumerate()
        .map(|(k, edge)| {
            let (f_low, f_high) = (edge[0], edge[1]);
            let mut member: Vec<bool> = freqs.iter().map(|&f| f >= f_low && f <= f_high).collect();
            let first = member.iter().position(|&m| m);
            let last = member.iter().rposition(|&m| m);

            match first {
                Some(first) if k > 0 && first > 0 => member[first - 1] = true,
                _ => {}
            }
            match last {
                Some(last) if k == n_bands => {
                    for m in member.iter_mut().skip(last + 1) {
                        *m = true;
                    }
                }
                _ => {}
            }

            let mut rows: Vec<usize> = member
                .iter()
                .enumerate()
                .filter_map(|(i, &m)| m.then_some(i))
                .collect();
            let band_size = rows.len();
            if k < n_bands {
                rows.pop();
            }
            (rows, band_size)
        })
        .collect()
}

/// Octave-band spectral contrast, `(n_bands + 1) x frames`, in dB
pub fn spectral_contrast(magnitude: &Matrix, freqs: &[f32], fmin: f32, n_bands: usize, quantile: f32) -> Matrix {
    let bands = contrast_bands(freqs, fmin, n_bands);
    let frames = magnitude.cols();
    let mut peaks = Matrix::zeros(bands.len(), frames);
    let mut valleys = Matrix::zeros(bands.len(), frames);

    let mut scratch = Vec::new();
    for (b, (rows, band_size)) in bands.iter().enumerate() {
        if rows.is_empty() {
            continue;
        }
        let q = ((quantile * *band_size as f32).round() as usize).max(1).min(rows.len());
        for t in 0..frames {
            scratch.clear();
            scratch.extend(rows.iter().map(|&k| magnitude.get(k, t)));
            scratch.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            let valley = scratch[..q].iter().sum::<f32>() / q as f32;
            let peak = scratch[scratch.len() - q..].iter().sum::<f32>() / q as f32;
            valleys.set(b, t, valley);
            peaks.set(b, t, peak);
        }
    }

    power_to_db(&mut peaks, 1.0, Some(80.0));
    power_to_db(&mut valleys, 1.0, Some(80.0));

    let mut contrast = peaks;
    for b in 0..contrast.rows() {
        let valley_row = valleys.row(b).to_vec();
        for (c, v) in contrast.row_mut(b).iter_mut().zip(valley_row) {
            *c -= v;
        }
    }
    contrast
}
