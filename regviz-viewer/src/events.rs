//! Discrete UI events shared by all backends
//!
//! Backends translate their native input mechanism (panel widgets or raw
//! keystrokes) into these events; the controller applies them to the view
//! state and playback state between event-pump ticks. Event application
//! never blocks.

use regviz_core::Rgb;

/// Identifies one of the named geometries the viewer manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryId {
    /// The raw input cloud of the current frame
    Frame,
    /// The subsampled keypoints used for registration
    Keypoints,
    /// The accumulated local map
    LocalMap,
    /// The trajectory history (panel backend representation)
    Trajectory,
}

/// How a geometry's points are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    Quad,
    Sphere,
}

/// A discrete user action delivered by a backend's event pump
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    /// Toggle free-run playback on/off
    TogglePlay,
    /// Advance exactly one frame (effective only while paused)
    Step,
    /// Reset the camera to frame the visible geometry
    CenterView,
    /// Toggle visibility of the current frame cloud
    ToggleFrame,
    /// Toggle visibility of the keypoints cloud
    ToggleKeypoints,
    /// Toggle visibility of the local map
    ToggleMap,
    /// Toggle trajectory display (effective only in global view)
    ToggleTrajectory,
    /// Switch between ego and global reference mode
    ToggleGlobalView,
    /// Change the background color
    SetBackground(Rgb),
    /// Tear down the viewer and terminate the process
    Quit,
}
