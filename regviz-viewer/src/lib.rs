//! Frame-stepping viewer for point cloud registration pipelines
//!
//! A registration pipeline calls [`Visualizer::update`] once per processed
//! frame; the viewer renders the frame cloud, keypoints, local map and
//! trajectory, then blocks until the user steps, toggles free-run playback,
//! or quits. Two windowed backends implement the same renderer capability:
//! an immediate-mode control panel (`panel` feature) and a raw keystroke
//! dispatch table (`keys` feature). [`StubVisualizer`] covers headless runs.

pub mod backend;
pub mod camera;
pub mod controller;
pub mod events;
pub mod pipeline;
pub mod playback;
pub mod scene;
pub mod view_state;
pub mod visualizer;
pub mod window;

#[cfg(feature = "keys")]
pub mod keys;
#[cfg(feature = "panel")]
pub mod panel;

#[cfg(test)]
mod test_support;

pub use backend::{BackendKind, RenderBackend};
pub use events::{GeometryId, RenderStyle, ViewerEvent};
pub use playback::{Playback, PlaybackMode};
pub use view_state::{Palette, ViewState};
pub use visualizer::{RegistrationVisualizer, StubVisualizer, Visualizer};
