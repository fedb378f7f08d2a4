use std::path::Path;

use crate::error::Result;
use crate::frame::Frame;
use crate::io::ser::SerReader;

/// A video decode capability.
///
/// Every call is self-contained: `decode_frame` opens its own handle on the
/// source, reads a single frame and releases the handle before returning.
/// That keeps parallel reads over the same file free of shared mutable
/// decode state, at the cost of re-opening per read.
pub trait VideoDecoder: Send + Sync {
    /// Total number of frames in the source.
    fn frame_count(&self, path: &Path) -> Result<usize>;

    /// Decode the frame at `index`.
    fn decode_frame(&self, path: &Path, index: usize) -> Result<Frame>;
}

/// Decoder for SER capture files.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerDecoder;

impl VideoDecoder for SerDecoder {
    fn frame_count(&self, path: &Path) -> Result<usize> {
        Ok(SerReader::open(path)?.frame_count())
    }

    fn decode_frame(&self, path: &Path, index: usize) -> Result<Frame> {
        SerReader::open(path)?.read_frame(index)
    }
}
