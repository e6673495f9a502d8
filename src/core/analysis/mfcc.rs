// src/core/analysis/mfcc.rs
//
// Mel spectrogram and MFCC computation from a power spectrogram.

use crate::core::dsp::stats::power_to_db;
use crate::core::dsp::Matrix;

/// Dynamic range kept by the log-mel stage
pub const MEL_TOP_DB: f32 = 80.0;

/// Apply a mel filterbank (`n_mels x n_bins`) to a power spectrogram
/// (`n_bins x frames`)
pub fn mel_spectrogram(power: &Matrix, filters: &Matrix) -> Matrix {
    filters.dot(power)
}

/// Log-mel in dB relative to 1.0 with an [`MEL_TOP_DB`] floor
pub fn log_mel(mel_power: &Matrix) -> Matrix {
    let mut db = mel_power.clone();
    power_to_db(&mut db, 1.0, Some(MEL_TOP_DB));
    db
}

/// Orthonormal DCT-II basis, `n_out x n_in`
pub fn dct_basis(n_out: usize, n_in: usize) -> Matrix {
    let n = n_in as f64;
    let mut basis = Matrix::zeros(n_out, n_in);
    for k in 0..n_out {
        let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
        for i in 0..n_in {
            let angle = std::f64::consts::PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n);
            basis.set(k, i, (scale * angle.cos()) as f32);
        }
    }
    basis
}

/// Cepstral coefficients, `num_coefficients x frames`, from a mel power
/// spectrogram
pub fn mfcc_from_mel(mel_power: &Matrix, num_coefficients: usize) -> Matrix {
    let db = log_mel(mel_power);
    dct_basis(num_coefficients, db.rows()).dot(&db)
}
