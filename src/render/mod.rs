//! Rendering output
//!
//! Frames are described as draw commands; painting is the host's job.

pub mod color;
pub mod draw;

pub use color::{Rgba, colors};
pub use draw::{DrawCmd, DrawList};
