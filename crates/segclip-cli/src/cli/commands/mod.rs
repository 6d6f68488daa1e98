//! CLI command handlers, one file per command.

mod channels;
mod clip;
mod range;

pub use channels::run_channels;
pub use clip::{run_clip, ClipOptions};
pub use range::run_range;
