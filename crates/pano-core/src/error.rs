use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Source unreadable: {0}")]
    SourceUnreadable(PathBuf),

    #[error("No usable frames extracted from any source")]
    NoUsableFrames,

    #[error("Only {count} frame(s) available, need at least {floor} to stitch")]
    TooFewFrames { count: usize, floor: usize },

    #[error("Stitching failed after {attempts} attempt(s)")]
    RetriesExhausted { attempts: u32 },

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

pub type Result<T> = std::result::Result<T, PanoError>;
