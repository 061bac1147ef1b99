//! Shared rendering state mutated by user toggles

use regviz_core::{Point3f, Pose, Rgb};

/// Default background color
pub const BACKGROUND_COLOR: Rgb = [0.0, 0.0, 0.0];

/// Per-geometry color palette
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub frame: Rgb,
    pub keypoints: Rgb,
    pub map: Rgb,
    pub trajectory: Rgb,
}

impl Palette {
    /// Palette used by the panel backend
    pub fn panel() -> Self {
        Self {
            frame: [0.1412, 0.4823, 0.6274],
            keypoints: [0.8470, 0.0667, 0.3490],
            map: [0.7647, 0.6981, 0.6000],
            trajectory: [0.9647, 0.9372, 0.6509],
        }
    }

    /// Palette used by the keystroke backend
    pub fn keys() -> Self {
        Self {
            frame: [0.24, 0.898, 1.0],
            keypoints: [0.24, 0.898, 1.0],
            map: [0.4, 0.4, 0.4],
            trajectory: [0.4, 0.5, 0.9],
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::panel()
    }
}

/// Visibility toggles, reference mode, and accumulated history
///
/// Exactly one reference mode (ego or global) is baked into the on-screen
/// transforms at any time; the transforms themselves are computed by the
/// update pipeline from `global_view` and `last_pose`.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub show_frame: bool,
    pub show_keypoints: bool,
    pub show_map: bool,
    pub show_trajectory: bool,
    pub global_view: bool,
    pub background: Rgb,
    pub last_pose: Pose,
    /// One position per accepted frame, append-only, never truncated
    pub trajectory: Vec<Point3f>,
}

impl ViewState {
    /// Create the initial view state: everything visible, ego view
    pub fn new() -> Self {
        Self {
            show_frame: true,
            show_keypoints: true,
            show_map: true,
            show_trajectory: true,
            global_view: false,
            background: BACKGROUND_COLOR,
            last_pose: Pose::identity(),
            trajectory: Vec::new(),
        }
    }

    /// Record one accepted frame: append the pose translation to the
    /// trajectory and cache the pose for reference-mode switches.
    ///
    /// Called unconditionally on every update, regardless of view mode or
    /// toggle state.
    pub fn push_pose(&mut self, pose: &Pose) {
        self.trajectory.push(pose.position());
        self.last_pose = *pose;
    }

    /// Toggle frame-cloud visibility
    ///
    /// Under the exclusive policy, enabling the frame cloud while keypoints
    /// are shown swaps the two instead of showing both.
    pub fn toggle_frame(&mut self, exclusive: bool) {
        if exclusive && self.show_keypoints {
            self.show_keypoints = false;
            self.show_frame = true;
        } else {
            self.show_frame = !self.show_frame;
        }
    }

    /// Toggle keypoints visibility, mirroring `toggle_frame`
    pub fn toggle_keypoints(&mut self, exclusive: bool) {
        if exclusive && self.show_frame {
            self.show_frame = false;
            self.show_keypoints = true;
        } else {
            self.show_keypoints = !self.show_keypoints;
        }
    }

    /// Toggle local-map visibility
    pub fn toggle_map(&mut self) {
        self.show_map = !self.show_map;
    }

    /// Toggle trajectory display; a no-op outside global view
    pub fn toggle_trajectory(&mut self) {
        if self.global_view {
            self.show_trajectory = !self.show_trajectory;
        }
    }

    /// Flip the reference mode
    pub fn toggle_global_view(&mut self) {
        self.global_view = !self.global_view;
    }

    /// Whether the trajectory should currently be drawn
    pub fn trajectory_visible(&self) -> bool {
        self.global_view && self.show_trajectory
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regviz_core::Vector3f;

    #[test]
    fn test_push_pose_appends_translation() {
        let mut state = ViewState::new();
        state.push_pose(&Pose::identity());
        state.push_pose(&Pose::from_translation(Vector3f::new(1.0, 0.0, 0.0)));
        assert_eq!(state.trajectory.len(), 2);
        assert_eq!(state.trajectory[0], Point3f::origin());
        assert_eq!(state.trajectory[1], Point3f::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_exclusive_toggle_swaps() {
        let mut state = ViewState::new();
        state.show_frame = true;
        state.show_keypoints = false;

        // Enabling keypoints under the exclusive policy disables the frame
        state.toggle_keypoints(true);
        assert!(state.show_keypoints);
        assert!(!state.show_frame);

        // And vice versa
        state.toggle_frame(true);
        assert!(state.show_frame);
        assert!(!state.show_keypoints);
    }

    #[test]
    fn test_exclusive_toggle_pair_is_idempotent() {
        let mut state = ViewState::new();
        state.show_frame = true;
        state.show_keypoints = false;

        state.toggle_keypoints(true);
        state.toggle_frame(true);
        assert!(state.show_frame);
        assert!(!state.show_keypoints);
    }

    #[test]
    fn test_exclusive_leaves_exactly_one_visible() {
        let mut state = ViewState::new();
        state.show_frame = true;
        state.show_keypoints = true;

        state.toggle_keypoints(true);
        assert_eq!(
            [state.show_frame, state.show_keypoints]
                .iter()
                .filter(|v| **v)
                .count(),
            1
        );
    }

    #[test]
    fn test_non_exclusive_toggle_is_independent() {
        let mut state = ViewState::new();
        state.show_frame = true;
        state.show_keypoints = true;

        state.toggle_keypoints(false);
        assert!(state.show_frame);
        assert!(!state.show_keypoints);
    }

    #[test]
    fn test_trajectory_toggle_requires_global_view() {
        let mut state = ViewState::new();
        assert!(!state.global_view);
        state.toggle_trajectory();
        assert!(state.show_trajectory);

        state.toggle_global_view();
        state.toggle_trajectory();
        assert!(!state.show_trajectory);
        assert!(!state.trajectory_visible());
    }

    #[test]
    fn test_trajectory_visible_only_in_global_view() {
        let mut state = ViewState::new();
        assert!(!state.trajectory_visible());
        state.toggle_global_view();
        assert!(state.trajectory_visible());
    }
}
