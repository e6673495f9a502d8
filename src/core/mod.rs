//! Inference pipeline and DSP building blocks

pub mod analysis;
pub mod backend;
pub mod classifier;
pub mod confidence;
pub mod decoder;
pub mod dsp;
pub mod features;
pub mod intensity;
pub mod loader;
pub mod service;

pub use backend::{DspBackend, SignalProcessingBackend};
pub use classifier::{
    load_artifact, Classifier, ClassifierArtifact, ClassifierInput, ClassifierKind, HeuristicClassifier,
    LabelScores, LinearArtifact, ModelBackedClassifier,
};
pub use confidence::ConfidenceAdjuster;
pub use features::{normalize_rows, ExtractedFeatures, FeatureExtractor, FeatureMatrix};
pub use intensity::IntensityEstimator;
pub use loader::{LoadedSignal, SignalLoader, Waveform};
pub use service::{Analysis, Diagnostics, EmotionDetectionService, ServiceBuilder};
