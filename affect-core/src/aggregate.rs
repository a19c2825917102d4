//! Score aggregation
//!
//! Reduces an ordered sequence of frames into the summary report. The
//! reduction is incremental: each frame is observed once and dropped, so the
//! same [`Aggregate`] serves both in-memory payloads and streamed ones.

use std::borrow::Borrow;

use crate::domain::frame::Frame;
use crate::domain::report::{AnalysisReport, Metric, round2};
use crate::error::AggregationError;
use crate::frames::FrameSink;
use crate::groups::ScoreGroups;

/// Label reported when no frame produced a dominant emotion
pub const NEUTRAL_LABEL: &str = "Neutral";

/// Running state of one aggregation
///
/// Owned by a single request. Finalizing consumes it.
#[derive(Debug, Clone)]
pub struct Aggregate {
    groups: ScoreGroups,
    confidence_sum: f64,
    nervousness_sum: f64,
    /// Dominant-label counts in first-seen order
    emotion_counts: Vec<(String, u64)>,
    previous_dominant: Option<String>,
    switches: u64,
    frame_count: u64,
}

impl Aggregate {
    pub fn new(groups: ScoreGroups) -> Self {
        Self {
            groups,
            confidence_sum: 0.0,
            nervousness_sum: 0.0,
            emotion_counts: Vec::new(),
            previous_dominant: None,
            switches: 0,
            frame_count: 0,
        }
    }

    /// Number of non-empty frames observed so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Folds one frame into the running state; empty frames are ignored
    pub fn observe(&mut self, frame: &Frame) {
        let Some(dominant) = frame.dominant() else {
            return;
        };
        let label = dominant.name.as_str();

        match self.emotion_counts.iter_mut().find(|(name, _)| name == label) {
            Some((_, count)) => *count += 1,
            None => self.emotion_counts.push((label.to_string(), 1)),
        }

        match &self.previous_dominant {
            Some(previous) if previous == label => {}
            Some(_) => {
                self.switches += 1;
                self.previous_dominant = Some(label.to_string());
            }
            None => self.previous_dominant = Some(label.to_string()),
        }

        self.confidence_sum += self.groups.confidence_mean(frame);
        self.nervousness_sum += self.groups.nervousness_mean(frame);
        self.frame_count += 1;
    }

    /// Produces the report, or `NoValidFrames` if nothing was observed
    pub fn finish(self) -> Result<AnalysisReport, AggregationError> {
        if self.frame_count == 0 {
            return Err(AggregationError::NoValidFrames);
        }

        let frames = self.frame_count as f64;
        let confidence = Metric::new(round2(self.confidence_sum / frames));
        let nervousness = Metric::new(round2(self.nervousness_sum / frames));
        let engagement = if self.frame_count >= 2 {
            Metric::new(round2(self.switches as f64 / (frames - 1.0)))
        } else {
            Metric::new(0.0)
        };

        Ok(AnalysisReport::new(
            confidence,
            nervousness,
            engagement,
            top_emotion(&self.emotion_counts),
        ))
    }
}

impl Default for Aggregate {
    fn default() -> Self {
        Self::new(ScoreGroups::default())
    }
}

impl FrameSink for Aggregate {
    fn accept(&mut self, frame: Frame) {
        self.observe(&frame);
    }
}

/// Aggregates a finite frame sequence with the given score groups
pub fn aggregate<I>(frames: I, groups: &ScoreGroups) -> Result<AnalysisReport, AggregationError>
where
    I: IntoIterator,
    I::Item: Borrow<Frame>,
{
    let mut state = Aggregate::new(groups.clone());
    for frame in frames {
        state.observe(frame.borrow());
    }
    state.finish()
}

fn top_emotion(counts: &[(String, u64)]) -> String {
    let mut best: Option<&(String, u64)> = None;
    for entry in counts {
        match best {
            Some((_, count)) if entry.1 <= *count => {}
            _ => best = Some(entry),
        }
    }
    best.map(|(name, _)| name.clone())
        .unwrap_or_else(|| NEUTRAL_LABEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::Level;

    fn frame(emotions: &[(&str, f64)]) -> Frame {
        emotions.iter().copied().collect()
    }

    fn run(frames: &[Frame]) -> Result<AnalysisReport, AggregationError> {
        aggregate(frames, &ScoreGroups::default())
    }

    #[test]
    fn test_calm_then_nervous_scenario() {
        let frames = vec![frame(&[("calm", 0.8)]), frame(&[("nervous", 0.9)])];
        let report = run(&frames).unwrap();

        assert_eq!(report.confidence_score, 0.4);
        assert_eq!(report.confidence_level, Level::Moderate);
        assert_eq!(report.nervousness_score, 0.45);
        assert_eq!(report.nervousness_level, Level::Moderate);
        assert_eq!(report.engagement_score, 1.0);
        assert_eq!(report.engagement_level, Level::High);
        assert_eq!(report.top_emotion, "calm");
    }

    #[test]
    fn test_engagement_counts_adjacent_switches() {
        let frames = vec![
            frame(&[("X", 0.9), ("Y", 0.1)]),
            frame(&[("X", 0.8)]),
            frame(&[("X", 0.1), ("Y", 0.7)]),
            frame(&[("X", 0.6)]),
        ];
        let report = run(&frames).unwrap();
        assert_eq!(report.engagement_score, 0.67);
        assert_eq!(report.top_emotion, "X");
    }

    #[test]
    fn test_single_frame_has_zero_engagement() {
        let report = run(&[frame(&[("tense", 0.9)])]).unwrap();
        assert_eq!(report.engagement_score, 0.0);
        assert_eq!(report.engagement_level, Level::Low);
        assert_eq!(report.nervousness_score, 0.9);
        assert_eq!(report.nervousness_level, Level::High);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(run(&[]), Err(AggregationError::NoValidFrames)));
        assert!(matches!(
            run(&[Frame::default(), Frame::default()]),
            Err(AggregationError::NoValidFrames)
        ));
    }

    #[test]
    fn test_empty_frames_are_skipped() {
        let frames = vec![
            frame(&[("calm", 0.5)]),
            Frame::default(),
            frame(&[("calm", 0.7)]),
            Frame::default(),
        ];
        let mut state = Aggregate::default();
        for f in &frames {
            state.observe(f);
        }
        assert_eq!(state.frame_count(), 2);

        let report = state.finish().unwrap();
        // Skipped frames do not break the run of identical dominant labels
        assert_eq!(report.engagement_score, 0.0);
        assert_eq!(report.confidence_score, 0.6);
    }

    #[test]
    fn test_frames_without_group_labels_still_count() {
        let frames = vec![frame(&[("calm", 0.9)]), frame(&[("Joy", 0.9)])];
        let report = run(&frames).unwrap();
        assert_eq!(report.confidence_score, 0.45);
        assert_eq!(report.nervousness_score, 0.0);
    }

    #[test]
    fn test_group_mean_within_frame() {
        let frames = vec![frame(&[("calm", 0.9), ("focused", 0.3), ("worried", 0.2)])];
        let report = run(&frames).unwrap();
        assert_eq!(report.confidence_score, 0.6);
        assert_eq!(report.nervousness_score, 0.2);
        assert_eq!(report.top_emotion, "calm");
    }

    #[test]
    fn test_top_emotion_tie_first_seen_wins() {
        let frames = vec![
            frame(&[("B", 0.9)]),
            frame(&[("A", 0.9)]),
            frame(&[("A", 0.9)]),
            frame(&[("B", 0.9)]),
        ];
        assert_eq!(run(&frames).unwrap().top_emotion, "B");
    }

    #[test]
    fn test_top_emotion_defaults_to_neutral() {
        assert_eq!(top_emotion(&[]), NEUTRAL_LABEL);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let frames = vec![
            frame(&[("calm", 0.3), ("tense", 0.4)]),
            frame(&[("content", 0.8), ("worried", 0.1)]),
            frame(&[("nervous", 0.6)]),
        ];
        assert_eq!(run(&frames).unwrap(), run(&frames).unwrap());
    }

    #[test]
    fn test_accepts_owned_frames() {
        let owned = vec![frame(&[("calm", 0.8)]), frame(&[("calm", 0.6)])];
        let report = aggregate(owned.into_iter(), &ScoreGroups::default()).unwrap();
        assert_eq!(report.confidence_score, 0.7);
        assert_eq!(report.confidence_level, Level::High);
    }

    #[test]
    fn test_custom_groups() {
        let groups = ScoreGroups::from_csv("Determination,Pride", "Anxiety,Doubt");
        let frames = vec![frame(&[("Pride", 0.5), ("Doubt", 0.2), ("calm", 0.9)])];
        let report = aggregate(&frames, &groups).unwrap();
        assert_eq!(report.confidence_score, 0.5);
        assert_eq!(report.nervousness_score, 0.2);
    }
}
