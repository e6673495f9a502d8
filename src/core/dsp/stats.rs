//! Statistical and framing helpers

use super::matrix::Matrix;

/// Floor applied before taking logarithms of power values
pub const AMIN: f32 = 1e-10;

/// Arithmetic mean (accumulated in f64); 0 for an empty slice
pub fn mean(data: &[f32]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    (data.iter().map(|&v| v as f64).sum::<f64>() / data.len() as f64) as f32
}

/// Population standard deviation (ddof = 0); 0 for an empty slice
pub fn std_dev(data: &[f32]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    let m = data.iter().map(|&v| v as f64).sum::<f64>() / data.len() as f64;
    let var = data
        .iter()
        .map(|&v| {
            let d = v as f64 - m;
            d * d
        })
        .sum::<f64>()
        / data.len() as f64;
    var.sqrt() as f32
}

/// Padding applied to both ends of a signal before centred framing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    /// Zeros
    Constant,
    /// Repeat the edge sample
    Edge,
}

/// Pad `frame_length / 2` samples on each side so frame `t` is centred on
/// sample `t * hop`
pub fn center_pad(samples: &[f32], frame_length: usize, mode: PadMode) -> Vec<f32> {
    let pad = frame_length / 2;
    let (head, tail) = match mode {
        PadMode::Constant => (0.0, 0.0),
        PadMode::Edge => (
            samples.first().copied().unwrap_or(0.0),
            samples.last().copied().unwrap_or(0.0),
        ),
    };
    let mut padded = Vec::with_capacity(samples.len() + 2 * pad);
    padded.resize(pad, head);
    padded.extend_from_slice(samples);
    padded.resize(padded.len() + pad, tail);
    padded
}

/// Number of centred frames for a signal of `len` samples
pub fn frame_count(len: usize, hop: usize) -> usize {
    1 + len / hop
}

/// Iterate centred frames of a padded signal
fn frames<'a>(padded: &'a [f32], frame_length: usize, hop: usize, count: usize) -> impl Iterator<Item = &'a [f32]> {
    (0..count).map(move |t| {
        let start = t * hop;
        let end = (start + frame_length).min(padded.len());
        &padded[start.min(end)..end]
    })
}

/// Per-frame RMS energy over centred, zero-padded frames
pub fn frame_rms(samples: &[f32], frame_length: usize, hop: usize) -> Vec<f32> {
    let padded = center_pad(samples, frame_length, PadMode::Constant);
    let count = frame_count(samples.len(), hop);
    frames(&padded, frame_length, hop, count)
        .map(|frame| {
            let sum_sq: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
            (sum_sq / frame_length as f64).sqrt() as f32
        })
        .collect()
}

/// Per-frame zero-crossing rate over centred, edge-padded frames.
///
/// Samples with magnitude below [`AMIN`] count as zero, and zero counts as
/// positive.
pub fn frame_zero_crossing_rate(samples: &[f32], frame_length: usize, hop: usize) -> Vec<f32> {
    let padded: Vec<f32> = center_pad(samples, frame_length, PadMode::Edge)
        .into_iter()
        .map(|s| if s.abs() <= AMIN { 0.0 } else { s })
        .collect();
    let count = frame_count(samples.len(), hop);
    frames(&padded, frame_length, hop, count)
        .map(|frame| {
            let crossings = frame
                .windows(2)
                .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
                .count();
            crossings as f32 / frame_length as f32
        })
        .collect()
}

/// Convert a power matrix to dB in place: `10 * log10(max(x, AMIN) / ref)`,
/// then floor everything at `max - top_db` when `top_db` is given.
pub fn power_to_db(power: &mut Matrix, reference: f32, top_db: Option<f32>) {
    let ref_db = 10.0 * reference.abs().max(AMIN).log10();
    power.map_inplace(|p| 10.0 * p.max(AMIN).log10() - ref_db);
    if let Some(top_db) = top_db {
        let floor = power.max() - top_db;
        power.map_inplace(|db| db.max(floor));
    }
}
