//! Streaming payload reader
//!
//! Walks the payload along a fixed path of object keys and array steps. Only
//! one frame is deserialized at a time; everything off the path is skipped
//! with [`IgnoredAny`].

use std::fmt;
use std::io::Read;

use serde::Deserialize;
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

use super::FrameSink;
use crate::domain::frame::Frame;
use crate::error::AggregationError;

#[derive(Debug, Clone, Copy)]
enum Step {
    /// Descend into the first array element, skip the rest
    First,
    /// Descend into every array element
    Each,
    /// Descend into an object member, which must be present
    Key(&'static str),
}

const FRAME_PATH: &[Step] = &[
    Step::First,
    Step::Key("results"),
    Step::Key("predictions"),
    Step::Each,
    Step::Key("models"),
    Step::Key("face"),
    Step::Key("grouped_predictions"),
    Step::Each,
    Step::Key("predictions"),
    Step::Each,
];

/// Streams every frame of a batch payload into `sink`
///
/// Frames already pushed stay in the sink when an error surfaces later in the
/// document; callers that need all-or-nothing semantics discard the sink on
/// error.
pub fn stream_frames<R, S>(reader: R, sink: &mut S) -> Result<(), AggregationError>
where
    R: Read,
    S: FrameSink + ?Sized,
{
    let mut deserializer = serde_json::Deserializer::from_reader(reader);
    PathSeed {
        path: FRAME_PATH,
        sink,
    }
    .deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(())
}

/// Streams frames from an in-memory body
pub fn stream_frames_from_str<S>(body: &str, sink: &mut S) -> Result<(), AggregationError>
where
    S: FrameSink + ?Sized,
{
    let mut deserializer = serde_json::Deserializer::from_str(body);
    PathSeed {
        path: FRAME_PATH,
        sink,
    }
    .deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(())
}

struct PathSeed<'s, S: ?Sized> {
    path: &'static [Step],
    sink: &'s mut S,
}

impl<'de, S> DeserializeSeed<'de> for PathSeed<'_, S>
where
    S: FrameSink + ?Sized,
{
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        match self.path.first() {
            None => {
                let frame = Frame::deserialize(deserializer)?;
                self.sink.accept(frame);
                Ok(())
            }
            Some(Step::Key(_)) => deserializer.deserialize_map(self),
            Some(Step::First | Step::Each) => deserializer.deserialize_seq(self),
        }
    }
}

impl<'de, S> Visitor<'de> for PathSeed<'_, S>
where
    S: FrameSink + ?Sized,
{
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path.first() {
            Some(Step::Key(key)) => write!(f, "an object with a `{}` member", key),
            Some(Step::First) => f.write_str("a non-empty array"),
            Some(Step::Each) => f.write_str("an array"),
            None => f.write_str("a frame"),
        }
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        let Some((Step::Key(wanted), rest)) = self.path.split_first() else {
            return Err(de::Error::invalid_type(de::Unexpected::Map, &self));
        };

        let mut found = false;
        while let Some(key) = map.next_key::<String>()? {
            if !found && key == *wanted {
                map.next_value_seed(PathSeed {
                    path: rest,
                    sink: &mut *self.sink,
                })?;
                found = true;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        if found {
            Ok(())
        } else {
            Err(de::Error::missing_field(wanted))
        }
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        match self.path.split_first() {
            Some((Step::First, rest)) => {
                let first = seq.next_element_seed(PathSeed {
                    path: rest,
                    sink: &mut *self.sink,
                })?;
                if first.is_none() {
                    return Err(de::Error::invalid_length(0, &self));
                }
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(())
            }
            Some((Step::Each, rest)) => {
                while seq
                    .next_element_seed(PathSeed {
                        path: rest,
                        sink: &mut *self.sink,
                    })?
                    .is_some()
                {}
                Ok(())
            }
            _ => Err(de::Error::invalid_type(de::Unexpected::Seq, &self)),
        }
    }
}
