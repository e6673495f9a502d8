//! Window function implementations

use std::f32::consts::PI;

/// Periodic (DFT-even) Hann window, the STFT analysis window
pub fn hann_window(size: usize) -> Vec<f32> {
    if size == 0 {
        return Vec::new();
    }
    if size == 1 {
        return vec![1.0];
    }
    let n = size as f32;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / n).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_window() {
        let window = hann_window(4);
        assert!((window[0]).abs() < 0.01); // Should be ~0 at edges
        assert!((window[2] - 1.0).abs() < 0.01); // Should be ~1 at center
    }

    #[test]
    fn test_periodic_not_symmetric() {
        let window = hann_window(8);
        assert!(window[7] > 0.1);
        assert!((window[1] - window[7]).abs() < 1e-6);
        assert_eq!(hann_window(1), vec![1.0]);
    }
}
