// src/core/loader.rs
//
// Turns an encoded audio source into a mono waveform at the pipeline rate,
// plus the sample range that survives silence trimming.

use log::debug;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use crate::core::backend::SignalProcessingBackend;
use crate::core::decoder::{decode_bytes, decode_path, extract_mono, AudioData};
use crate::error::Result;

/// Mono samples at a known rate
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Loader output: the full resampled waveform and the non-silent span
#[derive(Debug, Clone)]
pub struct LoadedSignal {
    pub full: Waveform,
    pub trim: Range<usize>,
}

impl LoadedSignal {
    /// The waveform with leading and trailing silence removed
    pub fn trimmed(&self) -> &[f32] {
        &self.full.samples[self.trim.clone()]
    }

    pub fn trimmed_duration_secs(&self) -> f32 {
        if self.full.sample_rate == 0 {
            return 0.0;
        }
        self.trim.len() as f32 / self.full.sample_rate as f32
    }
}

/// Decode, down-mix, resample, trim
pub struct SignalLoader {
    backend: Arc<dyn SignalProcessingBackend>,
    sample_rate: u32,
    top_db: f32,
}

impl SignalLoader {
    pub fn new(backend: Arc<dyn SignalProcessingBackend>, sample_rate: u32, top_db: f32) -> Self {
        Self {
            backend,
            sample_rate,
            top_db,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn load_path(&self, path: &Path) -> Result<LoadedSignal> {
        let audio = decode_path(path)?;
        self.prepare(&audio)
    }

    pub fn load_bytes(&self, bytes: Vec<u8>) -> Result<LoadedSignal> {
        let audio = decode_bytes(bytes)?;
        self.prepare(&audio)
    }

    /// Resample and trim an already decoded mono waveform
    pub fn load_waveform(&self, waveform: &Waveform) -> Result<LoadedSignal> {
        let samples = self
            .backend
            .resample(&waveform.samples, waveform.sample_rate, self.sample_rate)?;
        Ok(self.finish(samples))
    }

    fn prepare(&self, audio: &AudioData) -> Result<LoadedSignal> {
        let mono = extract_mono(audio);
        let samples = self
            .backend
            .resample(&mono, audio.sample_rate, self.sample_rate)?;
        Ok(self.finish(samples))
    }

    fn finish(&self, samples: Vec<f32>) -> LoadedSignal {
        let trim = self.backend.trim_silence(&samples, self.top_db);
        debug!(
            "Loaded {} samples @ {} Hz, {} kept after trimming",
            samples.len(),
            self.sample_rate,
            trim.len()
        );
        LoadedSignal {
            full: Waveform::new(samples, self.sample_rate),
            trim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::DspBackend;

    fn loader() -> SignalLoader {
        SignalLoader::new(Arc::new(DspBackend::default()), 22050, 25.0)
    }

    #[test]
    fn test_waveform_resampled_to_pipeline_rate() {
        let samples: Vec<f32> = (0..44100).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let loaded = loader().load_waveform(&Waveform::new(samples, 44100)).unwrap();
        assert_eq!(loaded.full.sample_rate, 22050);
        assert_eq!(loaded.full.len(), 22050);
        assert!((loaded.full.duration_secs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_silent_waveform_trims_to_nothing() {
        let loaded = loader()
            .load_waveform(&Waveform::new(vec![0.0; 22050], 22050))
            .unwrap();
        assert!(loaded.trimmed().is_empty());
        assert_eq!(loaded.trimmed_duration_secs(), 0.0);
        assert_eq!(loaded.full.len(), 22050);
    }

    #[test]
    fn test_corrupt_bytes_fail_to_load() {
        assert!(loader().load_bytes(vec![0x13; 512]).is_err());
    }
}
