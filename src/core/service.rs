// src/core/service.rs
//
// End-to-end inference: load → extract → classify → adjust → intensity.
// Every failure becomes a degraded prediction; the cause is available
// through the diagnostics returned by the `*_with_diagnostics` methods.

use log::{debug, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::core::backend::{DspBackend, SignalProcessingBackend};
use crate::core::classifier::{
    load_artifact, Classifier, ClassifierArtifact, ClassifierInput, ClassifierKind,
    HeuristicClassifier, LabelScores, ModelBackedClassifier,
};
use crate::core::confidence::ConfidenceAdjuster;
use crate::core::features::FeatureExtractor;
use crate::core::intensity::IntensityEstimator;
use crate::core::loader::{LoadedSignal, SignalLoader, Waveform};
use crate::detection::Prediction;
use crate::error::{EmotionError, Result};

/// How a prediction was produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub classifier: ClassifierKind,
    /// True when the prediction is the fixed fallback answer
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    /// Raw classifier scores in label order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<LabelScores>,
}

/// Prediction plus diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub prediction: Prediction,
    pub diagnostics: Diagnostics,
}

/// Builder for [`EmotionDetectionService`]
#[derive(Default)]
pub struct ServiceBuilder {
    config: PipelineConfig,
    model_path: Option<PathBuf>,
    artifact: Option<Arc<dyn ClassifierArtifact>>,
    backend: Option<Arc<dyn SignalProcessingBackend>>,
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the artifact from this path at build time
    pub fn model_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Use an already loaded artifact; takes precedence over `model_path`
    pub fn artifact(mut self, artifact: Arc<dyn ClassifierArtifact>) -> Self {
        self.artifact = Some(artifact);
        self
    }

    pub fn backend(mut self, backend: Arc<dyn SignalProcessingBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Fails only on invalid configuration. A missing, unreadable or
    /// wrongly sized artifact selects the heuristic classifier for the
    /// service's lifetime.
    pub fn build(self) -> Result<EmotionDetectionService> {
        let config = self.config;
        config.validate()?;

        let backend: Arc<dyn SignalProcessingBackend> = match self.backend {
            Some(backend) => backend,
            None => Arc::new(DspBackend::new(config.n_fft, config.hop_length, config.n_mels)),
        };

        let artifact = match (self.artifact, self.model_path) {
            (Some(artifact), _) => Some(artifact),
            (None, Some(path)) => match load_artifact(&path) {
                Ok(artifact) => Some(artifact),
                Err(e) => {
                    warn!("{}; falling back to heuristic classification", e);
                    None
                }
            },
            (None, None) => None,
        };

        // An artifact sized for a different feature vector can never score
        let artifact = artifact.filter(|artifact| match artifact.input_len() {
            Some(len) if len != config.feature_vector_len() => {
                warn!(
                    "Artifact expects {} inputs but the pipeline produces {}; falling back to heuristic classification",
                    len,
                    config.feature_vector_len()
                );
                false
            }
            _ => true,
        });

        let classifier: Box<dyn Classifier> = match artifact {
            Some(artifact) => Box::new(ModelBackedClassifier::new(
                artifact,
                config.include_spectral_in_vector,
            )),
            None => Box::new(HeuristicClassifier::new(Arc::clone(&backend))),
        };
        info!("Using {} classifier", classifier.kind());

        Ok(EmotionDetectionService {
            loader: SignalLoader::new(Arc::clone(&backend), config.sample_rate, config.top_db),
            extractor: FeatureExtractor::new(Arc::clone(&backend), &config),
            intensity: IntensityEstimator::new(backend, config.intensity),
            adjuster: ConfidenceAdjuster::new(),
            classifier,
            config,
        })
    }
}

pub struct EmotionDetectionService {
    config: PipelineConfig,
    loader: SignalLoader,
    extractor: FeatureExtractor,
    classifier: Box<dyn Classifier>,
    adjuster: ConfidenceAdjuster,
    intensity: IntensityEstimator,
}

impl EmotionDetectionService {
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    /// Default configuration, loading the artifact at `model_path` if given
    pub fn new(model_path: Option<&Path>) -> Result<Self> {
        let mut builder = ServiceBuilder::new();
        if let Some(path) = model_path {
            builder = builder.model_path(path);
        }
        builder.build()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classifier_kind(&self) -> ClassifierKind {
        self.classifier.kind()
    }

    pub fn analyze_path(&self, path: &Path) -> Prediction {
        self.analyze_path_with_diagnostics(path).prediction
    }

    pub fn analyze_bytes(&self, bytes: Vec<u8>) -> Prediction {
        self.analyze_bytes_with_diagnostics(bytes).prediction
    }

    pub fn analyze_waveform(&self, waveform: &Waveform) -> Prediction {
        self.analyze_waveform_with_diagnostics(waveform).prediction
    }

    pub fn analyze_path_with_diagnostics(&self, path: &Path) -> Analysis {
        debug!("Analyzing {}", path.display());
        self.run(self.loader.load_path(path))
    }

    pub fn analyze_bytes_with_diagnostics(&self, bytes: Vec<u8>) -> Analysis {
        debug!("Analyzing {} byte buffer", bytes.len());
        self.run(self.loader.load_bytes(bytes))
    }

    pub fn analyze_waveform_with_diagnostics(&self, waveform: &Waveform) -> Analysis {
        self.run(self.loader.load_waveform(waveform))
    }

    /// Analyze on a worker thread, giving up after `timeout`.
    ///
    /// On timeout the worker is left to finish in the background and its
    /// result is discarded.
    pub fn analyze_path_with_timeout(self: &Arc<Self>, path: &Path, timeout: Duration) -> Analysis {
        let (tx, rx) = mpsc::channel();
        let service = Arc::clone(self);
        let owned = path.to_path_buf();

        let spawned = thread::Builder::new()
            .name("emovoice-inference".into())
            .spawn(move || {
                let _ = tx.send(service.analyze_path_with_diagnostics(&owned));
            });
        if let Err(e) = spawned {
            return self.degraded(0.0, EmotionError::Io(e));
        }

        match rx.recv_timeout(timeout) {
            Ok(analysis) => analysis,
            Err(RecvTimeoutError::Timeout) => {
                self.degraded(0.0, EmotionError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => self.degraded(
                0.0,
                EmotionError::FeatureComputation("Inference worker terminated".into()),
            ),
        }
    }

    fn run(&self, loaded: Result<LoadedSignal>) -> Analysis {
        let loaded = match loaded {
            Ok(loaded) => loaded,
            Err(e) => return self.degraded(0.0, e),
        };

        let extracted = match self.extractor.extract(loaded.trimmed()) {
            Ok(extracted) => extracted,
            Err(e) => return self.degraded(0.0, e),
        };
        let duration = extracted.duration_secs;

        let input = ClassifierInput {
            features: &extracted.matrix,
            spectral: &extracted.spectral,
            waveform: &loaded.full,
        };
        let scores = match self.classifier.score(&input) {
            Ok(scores) => scores,
            Err(e) => return self.degraded(duration, e),
        };

        let ((primary, mut confidence), (secondary, mut secondary_confidence)) =
            scores.top_two(self.classifier.tie_order());
        if self.classifier.kind() == ClassifierKind::Model {
            confidence = self.adjuster.adjust(confidence, primary, &extracted.spectral);
            secondary_confidence =
                self.adjuster
                    .adjust(secondary_confidence, secondary, &extracted.spectral);
        }

        let intensity = self.intensity.estimate(&loaded.full, Some(&extracted.spectral));

        debug!(
            "{} {:.3} / {} {:.3}, intensity {:.3}",
            primary, confidence, secondary, secondary_confidence, intensity
        );

        Analysis {
            prediction: Prediction::new(
                (primary, confidence),
                Some((secondary, secondary_confidence)),
                intensity,
                duration,
                Some(extracted.spectral),
            ),
            diagnostics: Diagnostics {
                classifier: self.classifier.kind(),
                degraded: false,
                failure: None,
                scores: Some(scores),
            },
        }
    }

    fn degraded(&self, duration: f32, error: EmotionError) -> Analysis {
        warn!("Returning degraded prediction: {}", error);
        Analysis {
            prediction: Prediction::degraded(duration),
            diagnostics: Diagnostics {
                classifier: self.classifier.kind(),
                degraded: true,
                failure: Some(error.to_string()),
                scores: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::EmotionLabel;

    struct Fixed(Vec<f32>);

    impl ClassifierArtifact for Fixed {
        fn input_len(&self) -> Option<usize> {
            None
        }

        fn predict(&self, _input: &[f32]) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    fn tone(seconds: f32) -> Waveform {
        let n = (22050.0 * seconds) as usize;
        let samples = (0..n)
            .map(|i| 0.4 * (2.0 * std::f32::consts::PI * 330.0 * i as f32 / 22050.0).sin())
            .collect();
        Waveform::new(samples, 22050)
    }

    #[test]
    fn test_silence_is_degraded() {
        let service = EmotionDetectionService::new(None).unwrap();
        let analysis = service.analyze_waveform_with_diagnostics(&Waveform::new(vec![0.0; 22050], 22050));
        assert_eq!(analysis.prediction, Prediction::degraded(0.0));
        assert!(analysis.diagnostics.degraded);
        assert!(analysis.diagnostics.failure.is_some());
    }

    #[test]
    fn test_model_path_uses_artifact_scores() {
        let service = ServiceBuilder::new()
            .artifact(Arc::new(Fixed(vec![0.1, 0.05, 0.05, 0.6, 0.1, 0.05, 0.05])))
            .build()
            .unwrap();
        assert_eq!(service.classifier_kind(), ClassifierKind::Model);

        let analysis = service.analyze_waveform_with_diagnostics(&tone(1.0));
        let p = &analysis.prediction;
        assert!(!analysis.diagnostics.degraded);
        assert_eq!(p.primary(), EmotionLabel::Joy);
        assert_eq!(p.secondary(), Some(EmotionLabel::Anger));
        // Spectral means are ~0, so no boost applies
        assert!((p.confidence() - 0.6).abs() < 1e-6);
        assert!((p.secondary_confidence().unwrap() - 0.1).abs() < 1e-6);
        assert!((p.duration_seconds() - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_model_path_applies_confidence_boost() {
        let service = ServiceBuilder::new()
            .artifact(Arc::new(Fixed(vec![0.05, 0.05, 0.05, 0.1, 0.6, 0.1, 0.05])))
            .build()
            .unwrap();

        let p = service.analyze_waveform(&tone(1.0));
        let spectral = p.spectral().unwrap();
        assert!(spectral.centroid < 0.4 && spectral.contrast < 0.4);
        assert_eq!(p.primary(), EmotionLabel::Sadness);
        // 0.6 * 1.25
        assert!((p.confidence() - 0.75).abs() < 1e-5, "confidence {}", p.confidence());
        assert_eq!(p.secondary(), Some(EmotionLabel::Joy));
        assert!((p.secondary_confidence().unwrap() - 0.1).abs() < 1e-6);
    }

    /// Delegates to the default backend but reports bright, still, quiet
    /// signals, which push the heuristic towards Sadness.
    struct Hushed(DspBackend);

    impl SignalProcessingBackend for Hushed {
        fn resample(&self, samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
            self.0.resample(samples, from_rate, to_rate)
        }
        fn trim_silence(&self, samples: &[f32], top_db: f32) -> std::ops::Range<usize> {
            self.0.trim_silence(samples, top_db)
        }
        fn mel_spectrogram(&self, samples: &[f32], sample_rate: u32) -> Result<crate::core::dsp::Matrix> {
            self.0.mel_spectrogram(samples, sample_rate)
        }
        fn mfcc(&self, samples: &[f32], sample_rate: u32, n_mfcc: usize) -> Result<crate::core::dsp::Matrix> {
            self.0.mfcc(samples, sample_rate, n_mfcc)
        }
        fn spectral_centroid(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
            self.0.spectral_centroid(samples, sample_rate)
        }
        fn spectral_contrast(&self, samples: &[f32], sample_rate: u32) -> Result<crate::core::dsp::Matrix> {
            self.0.spectral_contrast(samples, sample_rate)
        }
        fn spectral_rolloff(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
            self.0.spectral_rolloff(samples, sample_rate)
        }
        fn rms(&self, samples: &[f32]) -> Vec<f32> {
            vec![0.01; self.0.rms(samples).len()]
        }
        fn zero_crossing_rate(&self, samples: &[f32]) -> Vec<f32> {
            vec![0.5; self.0.zero_crossing_rate(samples).len()]
        }
        fn chroma(&self, samples: &[f32], sample_rate: u32) -> Result<crate::core::dsp::Matrix> {
            self.0.chroma(samples, sample_rate)
        }
        fn onset_strength(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>> {
            self.0.onset_strength(samples, sample_rate)
        }
        fn tempo(&self, _onset_envelope: &[f32], _sample_rate: u32) -> f32 {
            0.0
        }
    }

    #[test]
    fn test_heuristic_path_reports_raw_score() {
        let service = ServiceBuilder::new()
            .backend(Arc::new(Hushed(DspBackend::default())))
            .build()
            .unwrap();
        assert_eq!(service.classifier_kind(), ClassifierKind::Heuristic);

        // Very quiet tone keeps the mel statistics near zero
        let samples = tone(1.0).samples.iter().map(|s| s * 0.0025).collect();
        let analysis = service.analyze_waveform_with_diagnostics(&Waveform::new(samples, 22050));
        assert!(!analysis.diagnostics.degraded, "{:?}", analysis.diagnostics.failure);

        let p = &analysis.prediction;
        assert_eq!(p.primary(), EmotionLabel::Sadness);
        let raw = analysis.diagnostics.scores.unwrap().get(EmotionLabel::Sadness);
        let boosted = ConfidenceAdjuster::new().adjust(raw, EmotionLabel::Sadness, p.spectral().unwrap());
        assert!(boosted > raw, "a boost rule matches this signal");
        assert_eq!(p.confidence(), raw.clamp(0.0, 1.0));
    }

    #[test]
    fn test_wrongly_sized_artifact_selects_heuristic() {
        let config = PipelineConfig {
            include_spectral_in_vector: false,
            ..Default::default()
        };
        let artifact =
            crate::core::classifier::LinearArtifact::new(vec![vec![0.0; 13 * 174 + 3]; 7], vec![0.0; 7]).unwrap();
        let service = ServiceBuilder::new()
            .config(config)
            .artifact(Arc::new(artifact))
            .build()
            .unwrap();
        assert_eq!(service.classifier_kind(), ClassifierKind::Heuristic);

        let analysis = service.analyze_waveform_with_diagnostics(&tone(1.0));
        assert!(!analysis.diagnostics.degraded, "{:?}", analysis.diagnostics.failure);
        assert_eq!(analysis.diagnostics.classifier, ClassifierKind::Heuristic);
    }

    #[test]
    fn test_bad_artifact_output_is_degraded_with_duration() {
        let service = ServiceBuilder::new()
            .artifact(Arc::new(Fixed(vec![1.0; 3])))
            .build()
            .unwrap();
        let analysis = service.analyze_waveform_with_diagnostics(&tone(1.0));
        assert!(analysis.diagnostics.degraded);
        assert_eq!(analysis.prediction.primary(), EmotionLabel::Calm);
        assert!(analysis.prediction.duration_seconds() > 0.9);
    }

    #[test]
    fn test_missing_artifact_selects_heuristic() {
        let service = EmotionDetectionService::new(Some(Path::new("/nonexistent/model.json"))).unwrap();
        assert_eq!(service.classifier_kind(), ClassifierKind::Heuristic);

        let p = service.analyze_waveform(&tone(1.0));
        assert_ne!(Some(p.primary()), p.secondary());
        assert!(p.secondary().is_some());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig {
            n_fft: 0,
            ..Default::default()
        };
        assert!(ServiceBuilder::new().config(config).build().is_err());
    }

    #[test]
    fn test_timeout_returns_degraded() {
        let service = Arc::new(EmotionDetectionService::new(None).unwrap());
        let analysis = service.analyze_path_with_timeout(Path::new("/nonexistent/a.wav"), Duration::from_secs(30));
        assert!(analysis.diagnostics.degraded);
        assert!(analysis.diagnostics.failure.unwrap().contains("decode"));
    }

    #[test]
    fn test_diagnostics_json() {
        let service = EmotionDetectionService::new(None).unwrap();
        let analysis = service.analyze_bytes_with_diagnostics(b"RIFF....garbage".to_vec());
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["diagnostics"]["classifier"], "heuristic");
        assert_eq!(json["diagnostics"]["degraded"], true);
        assert_eq!(json["prediction"]["primary_emotion"], "Calm");
    }
}
