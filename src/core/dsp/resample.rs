//! Sample-rate conversion using rubato

use log::debug;
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use crate::error::{EmotionError, Result};

/// Resample a mono signal from `input_rate` to `output_rate`.
///
/// The whole signal is processed as a single chunk; the output is trimmed
/// or zero-extended to `ceil(len * ratio)` samples.
pub fn resample_mono(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == output_rate || input.is_empty() {
        return Ok(input.to_vec());
    }
    if input_rate == 0 || output_rate == 0 {
        return Err(EmotionError::Decode(format!(
            "Cannot resample between {} Hz and {} Hz",
            input_rate, output_rate
        )));
    }

    let ratio = output_rate as f64 / input_rate as f64;
    debug!(
        "Resampling {} samples from {}Hz to {}Hz",
        input.len(),
        input_rate,
        output_rate
    );

    let mut resampler = FastFixedIn::<f32>::new(
        ratio,
        1.0,
        PolynomialDegree::Septic,
        input.len(),
        1,
    )
    .map_err(|e| EmotionError::Decode(format!("Failed to create resampler: {}", e)))?;

    let planar_input = vec![input.to_vec()];
    let mut output = resampler
        .process(&planar_input, None)
        .map_err(|e| EmotionError::Decode(format!("Resampling failed: {}", e)))?;

    let mut samples = output.pop().unwrap_or_default();
    let expected_len = (input.len() as f64 * ratio).ceil() as usize;
    samples.resize(expected_len, 0.0);

    Ok(samples)
}
