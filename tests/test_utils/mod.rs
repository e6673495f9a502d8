// tests/test_utils/mod.rs
//
// Shared helpers: synthetic WAV fixtures under the cargo temp dir and a
// handle on the built binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use emovoice::testgen;

/// Directory for generated fixtures, unique per test binary and name
pub fn fixture_dir(name: &str) -> PathBuf {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("emovoice").join(name);
    std::fs::create_dir_all(&dir).expect("Failed to create fixture directory");
    dir
}

/// Write a mono signal as a WAV fixture and return its path
pub fn write_fixture(dir: &Path, file: &str, samples: &[f32], sample_rate: u32, channels: u16) -> PathBuf {
    let path = dir.join(file);
    testgen::write_wav(&path, samples, sample_rate, channels).expect("Failed to write WAV fixture");
    path
}

/// Loud noise bursts at 150 BPM
pub fn energetic_clip(sample_rate: u32) -> Vec<f32> {
    testgen::pulse_train(150.0, 120.0, 3.0, sample_rate, 0.9, 17)
}

/// Quiet low tone
pub fn subdued_clip(sample_rate: u32) -> Vec<f32> {
    testgen::sine(140.0, 3.0, sample_rate, 0.02)
}

pub fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_emovoice"))
}
