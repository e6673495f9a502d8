// tests/pipeline_test.rs
//
// End-to-end behaviour of the inference service on synthetic WAV input.

mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use emovoice::config::PipelineConfig;
use emovoice::core::{normalize_rows, DspBackend, FeatureExtractor, ServiceBuilder};
use emovoice::core::dsp::stats::{mean, std_dev};
use emovoice::core::dsp::Matrix;
use emovoice::testgen;
use emovoice::{ClassifierKind, EmotionDetectionService, EmotionLabel, Prediction, Waveform};

use test_utils::{energetic_clip, fixture_dir, subdued_clip, write_fixture};

fn heuristic_service() -> EmotionDetectionService {
    ServiceBuilder::new().build().unwrap()
}

#[test]
fn test_silent_file_is_degraded() {
    let dir = fixture_dir("silent");
    let path = write_fixture(&dir, "silence.wav", &vec![0.0; 22050], 22050, 1);

    let analysis = heuristic_service().analyze_path_with_diagnostics(&path);
    let p = &analysis.prediction;
    assert_eq!(p.primary(), EmotionLabel::Calm);
    assert_eq!(p.confidence(), 0.5);
    assert_eq!(p.intensity(), 0.5);
    assert_eq!(p.duration_seconds(), 0.0);
    assert!(p.secondary().is_none());
    assert!(analysis.diagnostics.degraded);

    let json = serde_json::to_value(p).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"primary_emotion": "Calm", "confidence": 0.5, "intensity": 0.5, "duration": 0.0})
    );
}

#[test]
fn test_feature_matrix_width_is_fixed() {
    let extractor = FeatureExtractor::new(Arc::new(DspBackend::default()), &PipelineConfig::default());
    for seconds in [0.03, 0.5, 2.0, 4.04, 7.5] {
        let samples = testgen::noise(seconds, 22050, 0.5, 99);
        let features = extractor.extract(&samples).unwrap();
        assert_eq!(features.matrix.rows(), 13, "{}s", seconds);
        assert_eq!(features.matrix.cols(), 174, "{}s", seconds);
    }
}

#[test]
fn test_normalized_rows_have_unit_statistics() {
    let rows: Vec<Vec<f32>> = (0..13)
        .map(|r| testgen::noise(0.01, 22050, 1.0 + r as f32, r as u64 + 1))
        .collect();
    let mut m = Matrix::from_rows(rows);
    normalize_rows(&mut m);
    for r in 0..m.rows() {
        assert!(mean(m.row(r)).abs() < 1e-5, "row {} mean {}", r, mean(m.row(r)));
        assert!((std_dev(m.row(r)) - 1.0).abs() < 1e-3, "row {}", r);
    }
}

#[test]
fn test_energetic_clip_ranks_joy_or_surprise_over_calm_and_sadness() {
    let dir = fixture_dir("energetic");
    let path = write_fixture(&dir, "pulses.wav", &energetic_clip(22050), 22050, 1);

    let service = heuristic_service();
    assert_eq!(service.classifier_kind(), ClassifierKind::Heuristic);
    let analysis = service.analyze_path_with_diagnostics(&path);
    assert!(!analysis.diagnostics.degraded, "{:?}", analysis.diagnostics.failure);

    let scores = analysis.diagnostics.scores.expect("scores recorded");
    let lively = scores.get(EmotionLabel::Joy).max(scores.get(EmotionLabel::Surprise));
    assert!(lively > scores.get(EmotionLabel::Calm));
    assert!(lively > scores.get(EmotionLabel::Sadness));
    assert_ne!(analysis.prediction.primary(), EmotionLabel::Calm);
}

#[test]
fn test_heuristic_is_deterministic() {
    let service = heuristic_service();
    let waveform = Waveform::new(subdued_clip(16000), 16000);
    let a = service.analyze_waveform_with_diagnostics(&waveform);
    let b = service.analyze_waveform_with_diagnostics(&waveform);
    assert_eq!(a, b);
    assert_ne!(Some(a.prediction.primary()), a.prediction.secondary());
}

#[test]
fn test_secondary_differs_from_primary() {
    let service = heuristic_service();
    let clips = [
        testgen::sine(220.0, 1.0, 22050, 0.3),
        testgen::chirp(100.0, 4000.0, 1.5, 22050, 0.5),
        testgen::noise(1.0, 22050, 0.7, 5),
        energetic_clip(22050),
        subdued_clip(22050),
    ];
    for samples in clips {
        let p = service.analyze_waveform(&Waveform::new(samples, 22050));
        if let Some(secondary) = p.secondary() {
            assert_ne!(secondary, p.primary());
        }
    }
}

#[test]
fn test_intensity_in_unit_range() {
    let service = heuristic_service();
    let clips = [
        testgen::sine(440.0, 1.0, 22050, 1.0),
        testgen::noise(2.0, 22050, 1.0, 8),
        energetic_clip(22050),
        subdued_clip(22050),
        testgen::chirp(50.0, 10000.0, 2.0, 22050, 0.9),
    ];
    for samples in clips {
        let p = service.analyze_waveform(&Waveform::new(samples, 22050));
        assert!((0.0..=1.0).contains(&p.intensity()), "intensity {}", p.intensity());
        assert!((0.0..=1.0).contains(&p.confidence()));
    }
}

#[test]
fn test_model_artifact_from_disk() {
    // Zero weights with log-probability biases reproduce the target vector
    let target = [0.1f32, 0.05, 0.05, 0.6, 0.1, 0.05, 0.05];
    let input_len = PipelineConfig::default().feature_vector_len();
    let artifact = serde_json::json!({
        "labels": EmotionLabel::ALL.iter().map(|l| l.name()).collect::<Vec<_>>(),
        "input_len": input_len,
        "weights": vec![vec![0.0f32; input_len]; 7],
        "bias": target.iter().map(|p| p.ln()).collect::<Vec<_>>(),
    });
    let dir = fixture_dir("model");
    let model_path = dir.join("emotion_model.json");
    std::fs::write(&model_path, artifact.to_string()).unwrap();

    let service = ServiceBuilder::new().model_path(&model_path).build().unwrap();
    assert_eq!(service.classifier_kind(), ClassifierKind::Model);

    let path = write_fixture(&dir, "tone.wav", &testgen::sine(300.0, 2.0, 22050, 0.4), 22050, 1);
    let p = service.analyze_path(&path);
    assert_eq!(p.primary(), EmotionLabel::Joy);
    assert!((p.confidence() - 0.6).abs() < 1e-4);
    assert_eq!(p.secondary(), Some(EmotionLabel::Anger));
    assert!((p.secondary_confidence().unwrap() - 0.1).abs() < 1e-4);
    assert!((p.duration_seconds() - 2.0).abs() < 0.05);
    assert!(p.spectral().is_some());
}

#[test]
fn test_corrupt_artifact_falls_back_to_heuristic() {
    let dir = fixture_dir("bad-model");
    let model_path = dir.join("emotion_model.json");
    std::fs::write(&model_path, "{\"labels\": []}").unwrap();
    let service = EmotionDetectionService::new(Some(&model_path)).unwrap();
    assert_eq!(service.classifier_kind(), ClassifierKind::Heuristic);
}

#[test]
fn test_stereo_44k_input() {
    let dir = fixture_dir("stereo");
    let path = write_fixture(&dir, "stereo.wav", &testgen::sine(330.0, 3.0, 44100, 0.5), 44100, 2);

    let analysis = heuristic_service().analyze_path_with_diagnostics(&path);
    assert!(!analysis.diagnostics.degraded, "{:?}", analysis.diagnostics.failure);
    assert!((analysis.prediction.duration_seconds() - 3.0).abs() < 0.05);
}

#[test]
fn test_bytes_match_path() {
    let dir = fixture_dir("bytes");
    let path = write_fixture(&dir, "chirp.wav", &testgen::chirp(200.0, 2000.0, 1.0, 22050, 0.5), 22050, 1);
    let service = heuristic_service();

    let from_path = service.analyze_path(&path);
    let from_bytes = service.analyze_bytes(std::fs::read(&path).unwrap());
    assert_eq!(from_path, from_bytes);
}

#[test]
fn test_corrupt_bytes_are_degraded() {
    let service = heuristic_service();
    let mut bytes = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
    bytes.extend(std::iter::repeat(0xAB).take(64));
    let analysis = service.analyze_bytes_with_diagnostics(bytes);
    assert_eq!(analysis.prediction, Prediction::degraded(0.0));
    assert!(analysis.diagnostics.failure.is_some());
}

#[test]
fn test_timeout_wrapper_matches_direct_call() {
    let dir = fixture_dir("timeout");
    let path = write_fixture(&dir, "tone.wav", &testgen::sine(250.0, 1.0, 22050, 0.3), 22050, 1);
    let service = Arc::new(heuristic_service());

    let direct = service.analyze_path_with_diagnostics(&path);
    let bounded = service.analyze_path_with_timeout(&path, Duration::from_secs(60));
    assert_eq!(direct, bounded);
}
