//! Materialized payload reader

use serde::de::{self, Deserializer, IgnoredAny, SeqAccess, Visitor};
use serde::Deserialize;

use crate::domain::frame::Frame;
use crate::error::AggregationError;

/// A fully parsed batch prediction payload
///
/// Only the first batch entry is kept; later entries are skipped unparsed.
#[derive(Debug, Clone)]
pub struct PredictionBatch {
    first: BatchEntry,
}

#[derive(Debug, Clone, Deserialize)]
struct BatchEntry {
    results: BatchResults,
}

#[derive(Debug, Clone, Deserialize)]
struct BatchResults {
    predictions: Vec<SourcePrediction>,
}

#[derive(Debug, Clone, Deserialize)]
struct SourcePrediction {
    models: Models,
}

#[derive(Debug, Clone, Deserialize)]
struct Models {
    face: FaceModel,
}

#[derive(Debug, Clone, Deserialize)]
struct FaceModel {
    grouped_predictions: Vec<GroupedPrediction>,
}

#[derive(Debug, Clone, Deserialize)]
struct GroupedPrediction {
    predictions: Vec<Frame>,
}

impl<'de> Deserialize<'de> for PredictionBatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FirstEntry;

        impl<'de> Visitor<'de> for FirstEntry {
            type Value = PredictionBatch;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a non-empty prediction batch")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let first = seq
                    .next_element::<BatchEntry>()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(PredictionBatch { first })
            }
        }

        deserializer.deserialize_seq(FirstEntry)
    }
}

impl PredictionBatch {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AggregationError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn parse(body: &str) -> Result<Self, AggregationError> {
        Self::from_slice(body.as_bytes())
    }

    /// Frames of the first batch entry, in document order
    pub fn frames(&self) -> impl Iterator<Item = &Frame> + '_ {
        self.first
            .results
            .predictions
            .iter()
            .flat_map(|prediction| prediction.models.face.grouped_predictions.iter())
            .flat_map(|group| group.predictions.iter())
    }
}
