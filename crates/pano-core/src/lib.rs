pub mod error;
pub mod consts;
pub mod frame;
pub mod io;
pub mod decode;
pub mod sample;
pub mod align;
pub mod stitch;
pub mod pipeline;
