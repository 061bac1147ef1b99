//! Applies drained events to the view and playback state
//!
//! Events collected by one `poll_events` tick are applied here before the
//! next tick, so all state mutation is synchronous message handling rather
//! than nested callback mutation. None of these handlers block.

use crate::backend::RenderBackend;
use crate::events::{GeometryId, ViewerEvent};
use crate::pipeline::geometry_transforms;
use crate::playback::Playback;
use crate::view_state::ViewState;

/// Result of applying one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Continue,
    /// Quit is terminal: the backend has been torn down and the facade exits
    Quit,
}

/// Apply a single event to the shared state and the backend
pub fn apply_event<B: RenderBackend + ?Sized>(
    state: &mut ViewState,
    playback: &mut Playback,
    backend: &mut B,
    event: ViewerEvent,
) -> EventOutcome {
    match event {
        ViewerEvent::TogglePlay => playback.toggle_play(),
        ViewerEvent::Step => playback.request_step(),
        ViewerEvent::CenterView => backend.center_view(),
        ViewerEvent::ToggleFrame => {
            state.toggle_frame(backend.exclusive_frame_keypoints());
            backend.set_enabled(GeometryId::Frame, state.show_frame);
            backend.set_enabled(GeometryId::Keypoints, state.show_keypoints);
        }
        ViewerEvent::ToggleKeypoints => {
            state.toggle_keypoints(backend.exclusive_frame_keypoints());
            backend.set_enabled(GeometryId::Frame, state.show_frame);
            backend.set_enabled(GeometryId::Keypoints, state.show_keypoints);
        }
        ViewerEvent::ToggleMap => {
            state.toggle_map();
            backend.set_enabled(GeometryId::LocalMap, state.show_map);
        }
        ViewerEvent::ToggleTrajectory => {
            state.toggle_trajectory();
            backend.set_trajectory_visible(state.trajectory_visible());
        }
        ViewerEvent::ToggleGlobalView => {
            state.toggle_global_view();
            // Re-bake the new reference mode into the registered geometry
            // using the cached pose of the last accepted frame.
            let transforms = geometry_transforms(state.global_view, &state.last_pose);
            backend.set_transform(GeometryId::Frame, transforms.frame);
            backend.set_transform(GeometryId::Keypoints, transforms.keypoints);
            backend.set_transform(GeometryId::LocalMap, transforms.map);
            backend.set_trajectory_visible(state.trajectory_visible());
            backend.center_view();
        }
        ViewerEvent::SetBackground(color) => {
            state.background = color;
            backend.set_background(color);
        }
        ViewerEvent::Quit => {
            backend.teardown();
            return EventOutcome::Quit;
        }
    }
    EventOutcome::Continue
}

/// Apply a batch of events drained from one pump tick
pub fn apply_events<B, I>(
    state: &mut ViewState,
    playback: &mut Playback,
    backend: &mut B,
    events: I,
) -> EventOutcome
where
    B: RenderBackend + ?Sized,
    I: IntoIterator<Item = ViewerEvent>,
{
    for event in events {
        if apply_event(state, playback, backend, event) == EventOutcome::Quit {
            return EventOutcome::Quit;
        }
    }
    EventOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedBackend;
    use approx::assert_relative_eq;
    use regviz_core::{Matrix4, Pose, Vector3f};

    #[test]
    fn test_toggle_play_flips_mode() {
        let mut state = ViewState::new();
        let mut playback = Playback::new();
        let mut backend = ScriptedBackend::new(vec![]);

        apply_event(&mut state, &mut playback, &mut backend, ViewerEvent::TogglePlay);
        assert!(playback.is_playing());
    }

    #[test]
    fn test_toggle_map_pushes_enabled_flag() {
        let mut state = ViewState::new();
        let mut playback = Playback::new();
        let mut backend = ScriptedBackend::new(vec![]);

        apply_event(&mut state, &mut playback, &mut backend, ViewerEvent::ToggleMap);
        assert!(!state.show_map);
        assert_eq!(
            backend.recorder.borrow().last_enabled(GeometryId::LocalMap),
            Some(false)
        );
    }

    #[test]
    fn test_global_view_toggle_rebakes_last_pose() {
        let mut state = ViewState::new();
        let mut playback = Playback::new();
        let mut backend = ScriptedBackend::new(vec![]);
        let pose = Pose::from_translation(Vector3f::new(2.0, 0.0, 1.0));
        state.push_pose(&pose);

        apply_event(
            &mut state,
            &mut playback,
            &mut backend,
            ViewerEvent::ToggleGlobalView,
        );
        assert!(state.global_view);

        let recorder = backend.recorder.borrow();
        let frame_tf = recorder.last_transform(GeometryId::Frame).unwrap();
        let map_tf = recorder.last_transform(GeometryId::LocalMap).unwrap();
        assert_relative_eq!((frame_tf - pose.matrix()).norm(), 0.0, epsilon = 1e-5);
        assert_relative_eq!((map_tf - Matrix4::identity()).norm(), 0.0, epsilon = 1e-5);
        assert_eq!(recorder.trajectory_visible.last(), Some(&true));
        assert_eq!(recorder.centers, 1);
    }

    #[test]
    fn test_back_to_ego_applies_inverse_to_map() {
        let mut state = ViewState::new();
        let mut playback = Playback::new();
        let mut backend = ScriptedBackend::new(vec![]);
        let pose = Pose::from_translation(Vector3f::new(0.0, 3.0, 0.0));
        state.push_pose(&pose);

        apply_event(
            &mut state,
            &mut playback,
            &mut backend,
            ViewerEvent::ToggleGlobalView,
        );
        apply_event(
            &mut state,
            &mut playback,
            &mut backend,
            ViewerEvent::ToggleGlobalView,
        );
        assert!(!state.global_view);

        let recorder = backend.recorder.borrow();
        let frame_tf = recorder.last_transform(GeometryId::Frame).unwrap();
        let map_tf = recorder.last_transform(GeometryId::LocalMap).unwrap();
        assert_relative_eq!((frame_tf - Matrix4::identity()).norm(), 0.0, epsilon = 1e-5);
        assert_relative_eq!((map_tf - pose.inverse().matrix()).norm(), 0.0, epsilon = 1e-5);
        assert_eq!(recorder.trajectory_visible.last(), Some(&false));
    }

    #[test]
    fn test_quit_is_terminal() {
        let mut state = ViewState::new();
        let mut playback = Playback::new();
        let mut backend = ScriptedBackend::new(vec![]);

        let outcome = apply_events(
            &mut state,
            &mut playback,
            &mut backend,
            vec![ViewerEvent::Quit, ViewerEvent::ToggleMap],
        );
        assert_eq!(outcome, EventOutcome::Quit);
        // Events after quit are never applied, and the backend is released
        assert!(state.show_map);
        assert!(backend.recorder.borrow().torn_down);
    }

    #[test]
    fn test_set_background_updates_state_and_backend() {
        let mut state = ViewState::new();
        let mut playback = Playback::new();
        let mut backend = ScriptedBackend::new(vec![]);

        apply_event(
            &mut state,
            &mut playback,
            &mut backend,
            ViewerEvent::SetBackground([1.0, 1.0, 1.0]),
        );
        assert_eq!(state.background, [1.0, 1.0, 1.0]);
        assert_eq!(backend.recorder.borrow().backgrounds.last(), Some(&[1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_exclusive_backend_swaps_frame_and_keypoints() {
        let mut state = ViewState::new();
        state.show_keypoints = false;
        let mut playback = Playback::new();
        let mut backend = ScriptedBackend::new(vec![]).with_exclusive_toggles();

        apply_event(
            &mut state,
            &mut playback,
            &mut backend,
            ViewerEvent::ToggleKeypoints,
        );
        assert!(state.show_keypoints);
        assert!(!state.show_frame);

        let recorder = backend.recorder.borrow();
        assert_eq!(recorder.last_enabled(GeometryId::Frame), Some(false));
        assert_eq!(recorder.last_enabled(GeometryId::Keypoints), Some(true));
    }
}
