pub mod phase_correlation;

pub use phase_correlation::{phase_correlate, Shift};
