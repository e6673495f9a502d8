//! EmoVoice - infer an emotional state from a short speech sample
//!
//! Deterministic acoustic feature extraction feeding either a trained
//! classifier artifact or a fixed heuristic, followed by confidence
//! adjustment and intensity scoring.
//!
//! ## Pipeline
//!
//! 1. Decode (Symphonia), down-mix to mono, resample to 22050 Hz, trim
//!    leading and trailing silence
//! 2. 13 MFCCs over 2048/512 framing, padded or truncated to 174 frames,
//!    plus normalized spectral centroid, contrast and rolloff means
//! 3. Classify: artifact-backed when an artifact loaded, heuristic otherwise
//! 4. Boost artifact confidences on matching spectral conditions
//! 5. Estimate intensity from energy, onsets and dynamic range
//!
//! Failures never reach the caller: each one yields the degraded prediction
//! `Calm / 0.5 / intensity 0.5`, with the cause recorded in [`Diagnostics`].
//!
//! ## Module Structure
//!
//! - `core` - pipeline stages, classifiers and DSP utilities
//! - `cli` - command-line interface
//! - `config` - pipeline configuration
//! - `detection` - emotion labels and the prediction record
//! - `testgen` - synthetic test signals
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use emovoice::{EmotionDetectionService, ServiceBuilder};
//!
//! let service = ServiceBuilder::new().model_path("emotion_model.json").build()?;
//! let prediction = service.analyze_path(Path::new("clip.wav"));
//!
//! println!("{} ({:.0}%)", prediction.primary(), prediction.confidence() * 100.0);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod testgen;

pub use config::{IntensityWeights, PipelineConfig};
pub use core::{
    Analysis, ClassifierArtifact, ClassifierKind, Diagnostics, EmotionDetectionService,
    ServiceBuilder, SignalProcessingBackend, Waveform,
};
pub use detection::{EmotionLabel, EmotionSummary, Prediction, SpectralStats};
pub use error::{EmotionError, Result};
