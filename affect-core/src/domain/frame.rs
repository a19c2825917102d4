//! Frame domain types

use serde::{Deserialize, Serialize};

/// A single (label, score) emotion intensity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emotion {
    pub name: String,
    pub score: f64,
}

/// One sampled instant of input
///
/// Scores are independent per-label intensities and need not sum to 1.
/// Label order is the order the provider emitted them in, which is what
/// dominant-label tie-breaking relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub emotions: Vec<Emotion>,
}

impl Frame {
    pub fn new(emotions: Vec<Emotion>) -> Self {
        Self { emotions }
    }

    pub fn is_empty(&self) -> bool {
        self.emotions.is_empty()
    }

    /// Highest-scoring emotion; the first one wins on ties
    pub fn dominant(&self) -> Option<&Emotion> {
        let mut best: Option<&Emotion> = None;
        for emotion in &self.emotions {
            match best {
                Some(current) if emotion.score <= current.score => {}
                _ => best = Some(emotion),
            }
        }
        best
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Frame {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Frame::new(
            iter.into_iter()
                .map(|(name, score)| Emotion {
                    name: name.into(),
                    score,
                })
                .collect(),
        )
    }
}
