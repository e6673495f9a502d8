//! Output formatting for CLI results

use colorful::{Color, Colorful};
use serde::Serialize;
use std::path::Path;

use crate::core::Diagnostics;
use crate::detection::{EmotionLabel, EmotionSummary, Prediction};

/// One analyzed file as emitted in JSON mode
#[derive(Debug, Serialize)]
pub struct FileRecord<'a> {
    pub path: String,
    #[serde(flatten)]
    pub prediction: &'a Prediction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<&'a Diagnostics>,
}

fn label_color(label: EmotionLabel) -> Color {
    match label {
        EmotionLabel::Anger => Color::Red,
        EmotionLabel::Disgust => Color::Green,
        EmotionLabel::Fear => Color::Magenta,
        EmotionLabel::Joy => Color::Yellow,
        EmotionLabel::Sadness => Color::Blue,
        EmotionLabel::Surprise => Color::Cyan,
        EmotionLabel::Calm => Color::White,
    }
}

fn percent(value: f32) -> String {
    format!("{:.0}%", value * 100.0)
}

/// Text report for one file
pub fn format_prediction(path: &Path, prediction: &Prediction, diagnostics: Option<&Diagnostics>) -> String {
    let mut output = String::new();

    let primary = prediction.primary();
    output.push_str(&format!(
        "{}\n  {} {} ({})",
        path.display().to_string().bold(),
        "Emotion:".dim(),
        primary.name().color(label_color(primary)).bold(),
        percent(prediction.confidence())
    ));

    if let (Some(secondary), Some(conf)) = (prediction.secondary(), prediction.secondary_confidence()) {
        output.push_str(&format!(
            ", then {} ({})",
            secondary.name().color(label_color(secondary)),
            percent(conf)
        ));
    }
    output.push('\n');

    output.push_str(&format!(
        "  {} {}   {} {:.2}s\n",
        "Intensity:".dim(),
        percent(prediction.intensity()),
        "Duration:".dim(),
        prediction.duration_seconds()
    ));

    if let Some(diag) = diagnostics {
        output.push_str(&format!("  {} {}", "Classifier:".dim(), diag.classifier));
        if diag.degraded {
            output.push_str(&format!("  {}", "DEGRADED".yellow()));
        }
        output.push('\n');

        if let Some(failure) = &diag.failure {
            output.push_str(&format!("  {} {}\n", "Failure:".dim(), failure.as_str().red()));
        }
        if let Some(scores) = &diag.scores {
            let line: Vec<String> = EmotionLabel::ALL
                .iter()
                .map(|&l| format!("{} {:.3}", l, scores.get(l)))
                .collect();
            output.push_str(&format!("  {} {}\n", "Scores:".dim(), line.join(", ")));
        }
        if let Some(s) = prediction.spectral() {
            output.push_str(&format!(
                "  {} centroid {:.4}, contrast {:.4}, rolloff {:.4}\n",
                "Spectral:".dim(),
                s.centroid,
                s.contrast,
                s.rolloff
            ));
        }
    }

    output
}

/// Aggregate report over a batch
pub fn format_summary(summary: &EmotionSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", "Summary".bold().underlined()));
    output.push_str(&format!("  Files analyzed: {}\n", summary.total));

    for (name, tally) in &summary.by_emotion {
        let colored = match name.parse::<EmotionLabel>() {
            Ok(label) => name.as_str().color(label_color(label)).to_string(),
            Err(_) => name.clone(),
        };
        output.push_str(&format!(
            "  {:<10} {:>4}  avg confidence {}  avg intensity {}\n",
            colored,
            tally.count,
            percent(tally.mean_confidence),
            percent(tally.mean_intensity)
        ));
    }

    if let Some(dominant) = summary.dominant() {
        output.push_str(&format!("  Dominant emotion: {}\n", dominant));
    }
    if summary.degraded > 0 {
        output.push_str(&format!(
            "  {}\n",
            format!("{} degraded result(s)", summary.degraded).yellow()
        ));
    }

    output
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ClassifierKind;

    fn sample() -> Prediction {
        Prediction::new(
            (EmotionLabel::Joy, 0.6),
            Some((EmotionLabel::Anger, 0.1)),
            0.7,
            2.5,
            None,
        )
    }

    #[test]
    fn test_record_json_is_flat() {
        let p = sample();
        let record = FileRecord {
            path: "clip.wav".into(),
            prediction: &p,
            diagnostics: None,
        };
        let json: serde_json::Value = serde_json::from_str(&to_json(&record).unwrap()).unwrap();
        assert_eq!(json["path"], "clip.wav");
        assert_eq!(json["primary_emotion"], "Joy");
        assert_eq!(json["secondary_emotion"], "Anger");
        assert!(json.get("diagnostics").is_none());
    }

    #[test]
    fn test_text_mentions_labels() {
        let p = sample();
        let diag = Diagnostics {
            classifier: ClassifierKind::Heuristic,
            degraded: false,
            failure: None,
            scores: None,
        };
        let text = format_prediction(Path::new("clip.wav"), &p, Some(&diag));
        assert!(text.contains("Joy"));
        assert!(text.contains("Anger"));
        assert!(text.contains("heuristic"));
        assert!(text.contains("2.50s"));
    }

    #[test]
    fn test_summary_lists_degraded() {
        let mut summary = EmotionSummary::default();
        summary.add(&sample(), false);
        summary.add(&Prediction::degraded(0.0), true);
        let text = format_summary(&summary);
        assert!(text.contains("Files analyzed: 2"));
        assert!(text.contains("1 degraded"));
    }
}
