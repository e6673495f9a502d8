// src/core/classifier/heuristic.rs
//
// Fallback classifier used when no artifact is loaded. Scores each label
// with a fixed linear blend of waveform descriptors and spectral means.
// Scores are not probabilities and do not sum to 1.

use log::debug;
use std::sync::Arc;

use super::{Classifier, ClassifierInput, ClassifierKind, LabelScores};
use crate::core::backend::SignalProcessingBackend;
use crate::core::dsp::stats::mean;
use crate::core::loader::Waveform;
use crate::detection::{EmotionLabel, SpectralStats};
use crate::error::{EmotionError, Result};

/// Ranking precedence among equal heuristic scores
pub const HEURISTIC_TIE_ORDER: [EmotionLabel; EmotionLabel::COUNT] = [
    EmotionLabel::Anger,
    EmotionLabel::Joy,
    EmotionLabel::Sadness,
    EmotionLabel::Fear,
    EmotionLabel::Surprise,
    EmotionLabel::Disgust,
    EmotionLabel::Calm,
];

/// Raw waveform descriptors feeding the score formulas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicDescriptors {
    /// Mean frame RMS
    pub rms: f32,
    /// Mean frame zero-crossing rate
    pub zcr: f32,
    /// Global tempo (BPM)
    pub tempo: f32,
    pub chroma_mean: f32,
    pub chroma_std: f32,
    /// Mean and std of the mel power spectrogram
    pub mel_mean: f32,
    pub mel_std: f32,
}

impl HeuristicDescriptors {
    pub fn compute(backend: &dyn SignalProcessingBackend, waveform: &Waveform) -> Result<Self> {
        let samples = &waveform.samples;
        let sr = waveform.sample_rate;
        if samples.is_empty() {
            return Err(EmotionError::Classification("Empty waveform".into()));
        }

        let chroma = backend.chroma(samples, sr)?;
        let mel = backend.mel_spectrogram(samples, sr)?;
        let onset = backend.onset_strength(samples, sr)?;

        Ok(Self {
            rms: mean(&backend.rms(samples)),
            zcr: mean(&backend.zero_crossing_rate(samples)),
            tempo: backend.tempo(&onset, sr),
            chroma_mean: chroma.mean(),
            chroma_std: chroma.std(),
            mel_mean: mel.mean(),
            mel_std: mel.std(),
        })
    }

    /// Apply the fixed score table
    pub fn scores(&self, spectral: &SpectralStats) -> LabelScores {
        let rms = (self.rms * 10.0).min(1.0);
        let tempo = (self.tempo / 180.0).min(1.0);
        let zcr = (self.zcr * 100.0).min(1.0);
        let SpectralStats {
            centroid,
            contrast,
            rolloff,
        } = *spectral;

        let mut scores = [0.0f32; EmotionLabel::COUNT];
        let mut put = |label: EmotionLabel, value: f32| scores[label.index()] = value;

        put(EmotionLabel::Anger, 0.6 * rms + 0.2 * zcr + 0.2 * contrast);
        put(EmotionLabel::Joy, 0.4 * rms + 0.3 * tempo + 0.3 * self.chroma_mean);
        put(
            EmotionLabel::Sadness,
            0.5 * (1.0 - rms) + 0.3 * (1.0 - tempo) + 0.2 * (1.0 - self.mel_mean),
        );
        put(EmotionLabel::Fear, 0.4 * zcr + 0.3 * (1.0 - rms) + 0.3 * rolloff);
        put(EmotionLabel::Surprise, 0.5 * zcr + 0.3 * tempo + 0.2 * self.mel_std);
        put(
            EmotionLabel::Disgust,
            0.4 * (1.0 - zcr) + 0.4 * centroid + 0.2 * (1.0 - self.chroma_std),
        );
        put(EmotionLabel::Calm, 0.6 * (1.0 - zcr) + 0.2 * (1.0 - rms) + 0.2 * (1.0 - contrast));

        LabelScores::new(scores)
    }
}

pub struct HeuristicClassifier {
    backend: Arc<dyn SignalProcessingBackend>,
}

impl HeuristicClassifier {
    pub fn new(backend: Arc<dyn SignalProcessingBackend>) -> Self {
        Self { backend }
    }
}

impl Classifier for HeuristicClassifier {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Heuristic
    }

    fn score(&self, input: &ClassifierInput<'_>) -> Result<LabelScores> {
        let descriptors = HeuristicDescriptors::compute(self.backend.as_ref(), input.waveform)?;
        debug!("Heuristic descriptors: {:?}", descriptors);

        let scores = descriptors.scores(input.spectral);
        if scores.as_array().iter().any(|s| !s.is_finite()) {
            return Err(EmotionError::Classification(format!(
                "Non-finite heuristic score {:?}",
                scores
            )));
        }
        Ok(scores)
    }

    fn tie_order(&self) -> &'static [EmotionLabel; EmotionLabel::COUNT] {
        &HEURISTIC_TIE_ORDER
    }
}
