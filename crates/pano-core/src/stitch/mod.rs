pub mod adaptive;
pub mod translation;

pub use adaptive::{stitch_adaptive, StitchPolicy};
pub use translation::TranslationStitcher;

use crate::frame::Frame;

/// Unified result of one stitch invocation.
///
/// Stitcher implementations report every internal problem as `Failure`;
/// callers never need to distinguish fault kinds, because the retry policy
/// treats them all the same.
#[derive(Debug)]
pub enum StitchOutcome {
    Success(Frame),
    Failure(String),
}

/// A panorama-composition capability: given an ordered frame sequence,
/// produce a single composed image or report failure.
pub trait Stitcher: Sync {
    fn stitch(&self, frames: &[Frame]) -> StitchOutcome;
}
