//! The renderer capability consumed by the controller
//!
//! Everything in `pipeline` and `controller` is expressed against this trait
//! so the control logic stays backend-agnostic and unit-testable without a
//! windowing system.

use crate::events::{GeometryId, RenderStyle, ViewerEvent};
use regviz_core::{Matrix4, Point3f, Pose, Result, Rgb};

/// Which backend implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Immediate-mode control panel (egui side panel)
    Panel,
    /// Raw keystroke dispatch table
    Keys,
}

/// A swappable rendering backend
///
/// One `poll_events` call is a single non-blocking tick of the backend's
/// native event loop: it redraws, drains input, and returns the discrete
/// user actions that occurred. Implementations must never block inside a
/// tick.
pub trait RenderBackend {
    /// Register or replace a named point geometry
    fn register_points(
        &mut self,
        id: GeometryId,
        points: &[Point3f],
        color: Rgb,
        style: RenderStyle,
        size: f32,
    ) -> Result<()>;

    /// Set the world transform of a registered geometry
    fn set_transform(&mut self, id: GeometryId, transform: Matrix4<f32>);

    /// Show or hide a registered geometry
    fn set_enabled(&mut self, id: GeometryId, enabled: bool);

    /// Push the accumulated trajectory for the latest frame
    ///
    /// The panel backend re-registers the trajectory as one point cloud; the
    /// keys backend appends a pose marker per frame instead.
    fn update_trajectory(
        &mut self,
        positions: &[Point3f],
        latest_pose: &Pose,
        color: Rgb,
    ) -> Result<()>;

    /// Show or hide the trajectory representation as a whole batch
    fn set_trajectory_visible(&mut self, visible: bool);

    /// Change the clear color
    fn set_background(&mut self, color: Rgb);

    /// Reset the camera to frame the visible geometry
    fn center_view(&mut self);

    /// One non-blocking event-pump tick; returns drained user actions
    fn poll_events(&mut self) -> Vec<ViewerEvent>;

    /// Whether frame-cloud and keypoints visibility are mutually exclusive
    /// on this backend
    fn exclusive_frame_keypoints(&self) -> bool {
        false
    }

    /// Release backend resources ahead of process exit
    fn teardown(&mut self);
}
