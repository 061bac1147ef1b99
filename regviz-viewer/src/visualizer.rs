//! The viewer facade called once per pipeline frame
//!
//! `update` pushes one processed frame to the renderer, then blocks the
//! calling thread until the playback controller permits return. The
//! contract is "render and block appropriately, or exit the process":
//! no partial or error result ever reaches the caller.

use crate::backend::{BackendKind, RenderBackend};
use crate::controller::{apply_events, EventOutcome};
use crate::pipeline;
use crate::playback::Playback;
use crate::view_state::{Palette, ViewState};
use regviz_core::{LocalMap, PointCloud, Point3f, Pose, Result};

/// The single entry point a registration pipeline drives once per frame
pub trait Visualizer {
    /// Render one processed frame and block until the user advances
    ///
    /// `source` and `keypoints` are in the sensor/ego frame; `pose` maps ego
    /// coordinates into the global frame.
    fn update(
        &mut self,
        source: &PointCloud<Point3f>,
        keypoints: &PointCloud<Point3f>,
        local_map: &dyn LocalMap,
        pose: &Pose,
    );
}

/// No-op visualizer for headless operation
///
/// Polymorphic with the real facade over the same `update` signature; it
/// never blocks and has no side effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubVisualizer;

impl Visualizer for StubVisualizer {
    fn update(
        &mut self,
        _source: &PointCloud<Point3f>,
        _keypoints: &PointCloud<Point3f>,
        _local_map: &dyn LocalMap,
        _pose: &Pose,
    ) {
    }
}

/// The interactive viewer: view state, playback controller, and a backend
pub struct RegistrationVisualizer {
    backend: Box<dyn RenderBackend>,
    state: ViewState,
    playback: Playback,
    palette: Palette,
}

impl RegistrationVisualizer {
    /// Construct the viewer with the requested backend
    ///
    /// A visualizer with no backend has no meaningful fallback: any
    /// construction failure prints a remediation hint and terminates the
    /// process with a non-zero status.
    pub fn new(kind: BackendKind) -> Self {
        let (backend, palette) = create_backend(kind);
        Self::assemble(backend, palette)
    }

    /// Construct the viewer around a caller-supplied backend
    pub fn with_backend(backend: Box<dyn RenderBackend>, palette: Palette) -> Self {
        Self::assemble(backend, palette)
    }

    fn assemble(backend: Box<dyn RenderBackend>, palette: Palette) -> Self {
        let mut state = ViewState::new();
        // Under the exclusive policy only one of frame/keypoints starts
        // visible; the raw input cloud wins.
        if backend.exclusive_frame_keypoints() {
            state.show_keypoints = false;
        }
        Self {
            backend,
            state,
            playback: Playback::new(),
            palette,
        }
    }

    /// Current view state (toggles, reference mode, trajectory history)
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Fallible update used internally and by tests
    pub fn try_update(
        &mut self,
        source: &PointCloud<Point3f>,
        keypoints: &PointCloud<Point3f>,
        local_map: &dyn LocalMap,
        pose: &Pose,
    ) -> Result<()> {
        let map_cloud = local_map.point_cloud();
        pipeline::update_geometries(
            &mut self.state,
            self.backend.as_mut(),
            &self.palette,
            source,
            keypoints,
            &map_cloud,
            pose,
        )?;
        self.wait_for_advance();
        Ok(())
    }

    /// Block until the playback controller permits return
    ///
    /// Paused: pump the backend until a step is consumed or play turns on.
    /// Playing: pump exactly once and return. Each tick's events are applied
    /// atomically before the wait condition is re-checked.
    fn wait_for_advance(&mut self) {
        loop {
            let events = self.backend.poll_events();
            let outcome = apply_events(
                &mut self.state,
                &mut self.playback,
                self.backend.as_mut(),
                events,
            );
            if outcome == EventOutcome::Quit {
                // The controller has already torn the backend down
                std::process::exit(0);
            }
            if self.playback.is_playing() || self.playback.take_step() {
                break;
            }
        }
    }
}

impl Visualizer for RegistrationVisualizer {
    fn update(
        &mut self,
        source: &PointCloud<Point3f>,
        keypoints: &PointCloud<Point3f>,
        local_map: &dyn LocalMap,
        pose: &Pose,
    ) {
        if let Err(e) = self.try_update(source, keypoints, local_map, pose) {
            eprintln!("regviz: {}", e);
            std::process::exit(1);
        }
    }
}

fn create_backend(kind: BackendKind) -> (Box<dyn RenderBackend>, Palette) {
    match kind {
        BackendKind::Panel => {
            #[cfg(feature = "panel")]
            {
                match crate::panel::PanelBackend::new() {
                    Ok(backend) => (Box::new(backend) as Box<dyn RenderBackend>, Palette::panel()),
                    Err(e) => fatal(&format!("failed to initialize the panel backend: {}", e)),
                }
            }
            #[cfg(not(feature = "panel"))]
            {
                fatal(
                    "the panel backend is not compiled in, \
                     rebuild with `--features regviz-viewer/panel`",
                )
            }
        }
        BackendKind::Keys => {
            #[cfg(feature = "keys")]
            {
                match crate::keys::KeysBackend::new() {
                    Ok(backend) => (Box::new(backend) as Box<dyn RenderBackend>, Palette::keys()),
                    Err(e) => fatal(&format!("failed to initialize the keys backend: {}", e)),
                }
            }
            #[cfg(not(feature = "keys"))]
            {
                fatal(
                    "the keys backend is not compiled in, \
                     rebuild with `--features regviz-viewer/keys`",
                )
            }
        }
    }
}

fn fatal(message: &str) -> ! {
    eprintln!("regviz: {}", message);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{GeometryId, ViewerEvent};
    use crate::test_support::ScriptedBackend;
    use approx::assert_relative_eq;
    use regviz_core::{Matrix4, Vector3f};

    fn cloud(points: &[[f32; 3]]) -> PointCloud<Point3f> {
        PointCloud::from_points(
            points
                .iter()
                .map(|p| Point3f::new(p[0], p[1], p[2]))
                .collect(),
        )
    }

    fn three_point_cloud() -> PointCloud<Point3f> {
        cloud(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
    }

    #[test]
    fn test_stub_update_is_a_pure_noop() {
        let mut stub = StubVisualizer;
        let empty = PointCloud::new();
        // No blocking, no panic, nothing to observe
        stub.update(&empty, &empty, &empty, &Pose::identity());
    }

    #[test]
    fn test_paused_update_blocks_until_step() {
        // Two empty ticks, then a step: update must poll three times
        let backend = ScriptedBackend::new(vec![vec![], vec![], vec![ViewerEvent::Step]]);
        let recorder = backend.recorder.clone();
        let mut viewer =
            RegistrationVisualizer::with_backend(Box::new(backend), Palette::panel());

        viewer.try_update(
            &three_point_cloud(),
            &three_point_cloud(),
            &three_point_cloud(),
            &Pose::identity(),
        )
        .unwrap();

        assert_eq!(recorder.borrow().polls, 3);
    }

    #[test]
    fn test_playing_update_polls_exactly_once() {
        let backend = ScriptedBackend::new(vec![
            vec![ViewerEvent::TogglePlay],
            vec![],
            vec![],
            vec![],
        ]);
        let recorder = backend.recorder.clone();
        let mut viewer =
            RegistrationVisualizer::with_backend(Box::new(backend), Palette::panel());

        let source = three_point_cloud();
        // First update consumes the play toggle, the next two free-run
        for _ in 0..3 {
            viewer
                .try_update(&source, &source, &source, &Pose::identity())
                .unwrap();
        }

        assert_eq!(recorder.borrow().polls, 3);
    }

    #[test]
    fn test_trajectory_grows_one_entry_per_update() {
        let backend = ScriptedBackend::new(vec![
            vec![ViewerEvent::Step],
            vec![ViewerEvent::Step],
        ]);
        let mut viewer =
            RegistrationVisualizer::with_backend(Box::new(backend), Palette::panel());

        let source = three_point_cloud();
        let pose1 = Pose::identity();
        let pose2 = Pose::from_translation(Vector3f::new(1.0, 0.0, 0.0));
        viewer.try_update(&source, &source, &source, &pose1).unwrap();
        viewer.try_update(&source, &source, &source, &pose2).unwrap();

        let trajectory = &viewer.state().trajectory;
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory[0], Point3f::origin());
        assert_eq!(trajectory[1], Point3f::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ego_view_map_transform_follows_latest_pose() {
        let backend = ScriptedBackend::new(vec![
            vec![ViewerEvent::Step],
            vec![ViewerEvent::Step],
        ]);
        let recorder = backend.recorder.clone();
        let mut viewer =
            RegistrationVisualizer::with_backend(Box::new(backend), Palette::panel());

        let source = three_point_cloud();
        let pose2 = Pose::from_translation(Vector3f::new(1.0, 0.0, 0.0));
        viewer
            .try_update(&source, &source, &source, &Pose::identity())
            .unwrap();
        viewer.try_update(&source, &source, &source, &pose2).unwrap();

        let recorder = recorder.borrow();
        let map_tf = recorder.last_transform(GeometryId::LocalMap).unwrap();
        assert_relative_eq!((map_tf - pose2.inverse().matrix()).norm(), 0.0, epsilon = 1e-5);
        let frame_tf = recorder.last_transform(GeometryId::Frame).unwrap();
        assert_relative_eq!((frame_tf - Matrix4::identity()).norm(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_global_toggle_after_identity_pose_rebakes_identity() {
        // First frame with identity pose, then the user toggles global view:
        // the re-baked frame transform equals last_pose = identity, and the
        // map transform becomes identity as well.
        let backend = ScriptedBackend::new(vec![vec![
            ViewerEvent::ToggleGlobalView,
            ViewerEvent::Step,
        ]]);
        let recorder = backend.recorder.clone();
        let mut viewer =
            RegistrationVisualizer::with_backend(Box::new(backend), Palette::panel());

        let source = three_point_cloud();
        viewer
            .try_update(&source, &source, &source, &Pose::identity())
            .unwrap();

        assert_eq!(viewer.state().trajectory, vec![Point3f::origin()]);
        assert!(viewer.state().global_view);

        let recorder = recorder.borrow();
        let frame_tf = recorder.last_transform(GeometryId::Frame).unwrap();
        let map_tf = recorder.last_transform(GeometryId::LocalMap).unwrap();
        assert_relative_eq!((frame_tf - Matrix4::identity()).norm(), 0.0, epsilon = 1e-5);
        assert_relative_eq!((map_tf - Matrix4::identity()).norm(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_exclusive_backend_starts_without_keypoints() {
        let backend = ScriptedBackend::new(vec![]).with_exclusive_toggles();
        let viewer = RegistrationVisualizer::with_backend(Box::new(backend), Palette::keys());
        assert!(viewer.state().show_frame);
        assert!(!viewer.state().show_keypoints);
    }

    #[test]
    fn test_update_rejects_empty_source() {
        let backend = ScriptedBackend::new(vec![]);
        let mut viewer =
            RegistrationVisualizer::with_backend(Box::new(backend), Palette::panel());
        let empty = PointCloud::new();
        assert!(viewer
            .try_update(&empty, &empty, &empty, &Pose::identity())
            .is_err());
    }
}
