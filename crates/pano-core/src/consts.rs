/// Default sampling interval: keep every Nth frame of a source.
pub const DEFAULT_SAMPLE_STEP: usize = 100;

/// Default upper bound on frames handed to the stitcher.
pub const DEFAULT_MAX_FRAMES: usize = 800;

/// Default number of stitch attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Minimum frame count below which stitching is not attempted.
pub const MIN_STITCH_FRAMES: usize = 10;

/// Phase-correlation peak response below which two frames are treated
/// as having no reliable overlap.
pub const MIN_CORRELATION_RESPONSE: f32 = 0.01;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;
