//! Frame sources
//!
//! Two readers over the provider's batch prediction payload:
//!
//! - [`PredictionBatch`]: parses the payload into typed structs and exposes a
//!   lazy iterator over its frames
//! - [`stream_frames`]: walks the JSON from a reader and pushes frames one at a
//!   time into a [`FrameSink`], without building the tree
//!
//! Both read only the first batch entry and flatten every prediction and
//! every face group in document order.

mod batch;
mod stream;

pub use batch::PredictionBatch;
pub use stream::{stream_frames, stream_frames_from_str};

use crate::domain::frame::Frame;

/// Consumer of frames produced by a streaming source
pub trait FrameSink {
    /// Receives the next frame in document order
    fn accept(&mut self, frame: Frame);
}

impl FrameSink for Vec<Frame> {
    fn accept(&mut self, frame: Frame) {
        self.push(frame);
    }
}
