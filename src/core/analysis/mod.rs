//! Acoustic feature algorithms
//!
//! - MFCC (mel spectrogram, log-mel, DCT)
//! - Spectral shape (centroid, contrast, rolloff)
//! - Chroma (pitch-class energy)
//! - Rhythm (onset strength, tempo)

mod chroma;
mod mfcc;
mod rhythm;
mod spectral;

pub use chroma::chroma_from_power;
pub use mfcc::{dct_basis, log_mel, mel_spectrogram, mfcc_from_mel, MEL_TOP_DB};
pub use rhythm::{estimate_tempo, onset_strength, AC_SECONDS, MAX_BPM, PRIOR_BPM};
pub use spectral::{
    spectral_centroid, spectral_contrast, spectral_rolloff, CONTRAST_BANDS, CONTRAST_FMIN,
    CONTRAST_QUANTILE, ROLL_PERCENT,
};
