//! Emotion label set

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of emotions the pipeline can report.
///
/// Declaration order is the fixed label ordering of a classifier artifact's
/// output vector: `[Anger, Disgust, Fear, Joy, Sadness, Surprise, Calm]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionLabel {
    Anger,
    Disgust,
    Fear,
    Joy,
    Sadness,
    Surprise,
    Calm,
}

impl EmotionLabel {
    pub const COUNT: usize = 7;

    /// All labels in artifact order
    pub const ALL: [EmotionLabel; Self::COUNT] = [
        EmotionLabel::Anger,
        EmotionLabel::Disgust,
        EmotionLabel::Fear,
        EmotionLabel::Joy,
        EmotionLabel::Sadness,
        EmotionLabel::Surprise,
        EmotionLabel::Calm,
    ];

    /// Position in the artifact output vector
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            EmotionLabel::Anger => "Anger",
            EmotionLabel::Disgust => "Disgust",
            EmotionLabel::Fear => "Fear",
            EmotionLabel::Joy => "Joy",
            EmotionLabel::Sadness => "Sadness",
            EmotionLabel::Surprise => "Surprise",
            EmotionLabel::Calm => "Calm",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EmotionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown emotion label: {}", s))
    }
}
