//! GPU point rendering for regviz using wgpu
//!
//! Backends own a `PointRenderer` and drive it one frame at a time through
//! `begin_frame` / `draw_points` / `finish_frame`, which lets them append
//! their own render passes (the panel backend appends an egui pass) before
//! presenting.

pub mod device;
pub mod points;
pub mod shaders;

pub use device::*;
pub use points::*;
