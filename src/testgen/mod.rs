// src/testgen/mod.rs
//
// Deterministic synthetic signals for exercising the pipeline, plus a WAV
// writer so the same signals can be fed through the decoder.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::f32::consts::PI;
use std::path::Path;

/// Pure tone
pub fn sine(freq_hz: f32, seconds: f32, sample_rate: u32, amplitude: f32) -> Vec<f32> {
    let n = (seconds * sample_rate as f32) as usize;
    (0..n)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Linear frequency sweep from `start_hz` to `end_hz`
pub fn chirp(start_hz: f32, end_hz: f32, seconds: f32, sample_rate: u32, amplitude: f32) -> Vec<f32> {
    let n = (seconds * sample_rate as f32) as usize;
    let rate = (end_hz - start_hz) / seconds;
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let phase = 2.0 * PI * (start_hz * t + 0.5 * rate * t * t);
            amplitude * phase.sin()
        })
        .collect()
}

/// Uniform white noise in `[-amplitude, amplitude]` from a xorshift generator
pub fn noise(seconds: f32, sample_rate: u32, amplitude: f32, seed: u64) -> Vec<f32> {
    let n = (seconds * sample_rate as f32) as usize;
    let mut state = seed.max(1);
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let unit = (state >> 40) as f32 / (1u64 << 24) as f32;
            amplitude * (unit * 2.0 - 1.0)
        })
        .collect()
}

/// Bursts of noise repeating at `bpm`, each `burst_ms` long, silent between
pub fn pulse_train(bpm: f32, burst_ms: f32, seconds: f32, sample_rate: u32, amplitude: f32, seed: u64) -> Vec<f32> {
    let period = (60.0 / bpm * sample_rate as f32) as usize;
    let burst = (burst_ms / 1000.0 * sample_rate as f32) as usize;
    let mut samples = noise(seconds, sample_rate, amplitude, seed);
    for (i, s) in samples.iter_mut().enumerate() {
        if period == 0 || i % period >= burst {
            *s = 0.0;
        }
    }
    samples
}

/// Write 16-bit PCM. With `channels > 1` the mono signal is duplicated on
/// every channel.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) -> Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for &s in samples {
        let value = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(value)?;
        }
    }

    writer
        .finalize()
        .with_context(|| format!("Failed to finalize {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths() {
        assert_eq!(sine(440.0, 1.0, 22050, 0.5).len(), 22050);
        assert_eq!(chirp(100.0, 1000.0, 0.5, 16000, 0.5).len(), 8000);
        assert_eq!(noise(2.0, 8000, 0.5, 1).len(), 16000);
    }

    #[test]
    fn test_noise_is_seeded_and_bounded() {
        let a = noise(0.5, 22050, 0.8, 42);
        let b = noise(0.5, 22050, 0.8, 42);
        let c = noise(0.5, 22050, 0.8, 43);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|s| s.abs() <= 0.8));
    }

    #[test]
    fn test_pulse_train_gaps() {
        let p = pulse_train(120.0, 50.0, 2.0, 22050, 0.9, 5);
        let period = 11025;
        let burst = 1102;
        assert!(p[..burst].iter().any(|&s| s != 0.0));
        assert!(p[burst..period].iter().all(|&s| s == 0.0));
        assert!(p[period..period + burst].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_write_wav_stereo() {
        let dir = std::env::temp_dir().join("emovoice-testgen");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stereo.wav");
        write_wav(&path, &sine(440.0, 0.1, 44100, 0.5), 44100, 2).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 44100);
        assert_eq!(reader.len(), 4410 * 2);
    }
}
