//! Per-frame geometry update pipeline
//!
//! For each incoming frame the pipeline decides inclusion per geometry,
//! applies the transform rule for the current reference mode, and appends
//! one trajectory entry. The transform rule:
//!
//! - ego view: frame/keypoints identity, map `inverse(pose)` (the map lives
//!   in the previous global frame and is pulled into the new ego frame);
//! - global view: frame/keypoints `pose`, map identity (the map is already
//!   accumulated in global coordinates).

use crate::backend::RenderBackend;
use crate::events::{GeometryId, RenderStyle};
use crate::view_state::{Palette, ViewState};
use regviz_core::{Error, Matrix4, PointCloud, Point3f, Pose, Result};

/// World-unit point radii, per geometry
pub const FRAME_POINT_SIZE: f32 = 0.2;
pub const KEYPOINTS_POINT_SIZE: f32 = 0.3;
pub const MAP_POINT_SIZE: f32 = 0.1;
pub const TRAJECTORY_POINT_SIZE: f32 = 0.5;

/// The world transforms of the three point geometries for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryTransforms {
    pub frame: Matrix4<f32>,
    pub keypoints: Matrix4<f32>,
    pub map: Matrix4<f32>,
}

/// Compute the per-geometry transforms for the given reference mode
pub fn geometry_transforms(global_view: bool, pose: &Pose) -> GeometryTransforms {
    if global_view {
        GeometryTransforms {
            frame: *pose.matrix(),
            keypoints: *pose.matrix(),
            map: Matrix4::identity(),
        }
    } else {
        GeometryTransforms {
            frame: Matrix4::identity(),
            keypoints: Matrix4::identity(),
            map: *pose.inverse().matrix(),
        }
    }
}

/// Validate one incoming frame before touching the renderer
///
/// The pose must be rigid and the source cloud non-empty. Keypoints and map
/// may legitimately be empty (the map is empty before the first frame is
/// integrated), so only their pose handling is checked downstream.
pub fn validate_frame(source: &PointCloud<Point3f>, pose: &Pose) -> Result<()> {
    if !pose.is_rigid(1e-3) {
        return Err(Error::InvalidData(
            "frame pose is not a rigid transform".to_string(),
        ));
    }
    if source.is_empty() {
        return Err(Error::InvalidData("source cloud is empty".to_string()));
    }
    Ok(())
}

/// Push one processed frame to the backend and record its pose
///
/// Points are re-uploaded only for geometries whose toggle is on; transforms
/// and enabled flags are pushed for all of them so a toggled-off geometry
/// reappears consistently. The trajectory entry is appended unconditionally;
/// only its display is gated by the view mode.
pub fn update_geometries<B: RenderBackend + ?Sized>(
    state: &mut ViewState,
    backend: &mut B,
    palette: &Palette,
    source: &PointCloud<Point3f>,
    keypoints: &PointCloud<Point3f>,
    map: &PointCloud<Point3f>,
    pose: &Pose,
) -> Result<()> {
    validate_frame(source, pose)?;

    let transforms = geometry_transforms(state.global_view, pose);

    if state.show_frame {
        backend.register_points(
            GeometryId::Frame,
            &source.points,
            palette.frame,
            RenderStyle::Quad,
            FRAME_POINT_SIZE,
        )?;
    }
    backend.set_transform(GeometryId::Frame, transforms.frame);
    backend.set_enabled(GeometryId::Frame, state.show_frame);

    if state.show_keypoints {
        backend.register_points(
            GeometryId::Keypoints,
            &keypoints.points,
            palette.keypoints,
            RenderStyle::Quad,
            KEYPOINTS_POINT_SIZE,
        )?;
    }
    backend.set_transform(GeometryId::Keypoints, transforms.keypoints);
    backend.set_enabled(GeometryId::Keypoints, state.show_keypoints);

    if state.show_map {
        backend.register_points(
            GeometryId::LocalMap,
            &map.points,
            palette.map,
            RenderStyle::Quad,
            MAP_POINT_SIZE,
        )?;
    }
    backend.set_transform(GeometryId::LocalMap, transforms.map);
    backend.set_enabled(GeometryId::LocalMap, state.show_map);

    state.push_pose(pose);
    backend.update_trajectory(&state.trajectory, pose, palette.trajectory)?;
    backend.set_trajectory_visible(state.trajectory_visible());

    Ok(())
}
