// src/core/analysis/chroma.rs
//
// Pitch-class energy distribution from a power spectrogram.

use crate::core::dsp::Matrix;

/// Project a power spectrogram onto a chroma filterbank and scale each frame
/// so its strongest pitch class is 1.0. All-zero frames stay zero.
pub fn chroma_from_power(power: &Matrix, filters: &Matrix) -> Matrix {
    let mut chroma = filters.dot(power);
    for t in 0..chroma.cols() {
        let peak = (0..chroma.rows())
            .map(|c| chroma.get(c, t).abs())
            .fold(0.0f32, f32::max);
        if peak > f32::MIN_POSITIVE {
            for c in 0..chroma.rows() {
                let v = chroma.get(c, t) / peak;
                chroma.set(c, t, v);
            }
        }
    }
    chroma
}
