//! Keystroke-driven backend
//!
//! Controls are a raw key dispatch table, frame/keypoints visibility is
//! mutually exclusive, and the trajectory is a history of per-frame pose
//! markers shown or hidden as one batch.

use crate::backend::RenderBackend;
use crate::events::{GeometryId, RenderStyle, ViewerEvent};
use crate::scene::Scene;
use crate::window::{ViewerWindow, WindowSignal};
use regviz_core::{Matrix4, Point3f, Pose, Result, Rgb};
use winit::keyboard::{Key, NamedKey};

/// World-space radius of one pose marker
pub const MARKER_SIZE: f32 = 0.2;

/// Windowed backend with raw keystroke dispatch
pub struct KeysBackend {
    window: ViewerWindow,
    scene: Scene,
    centered: bool,
}

impl KeysBackend {
    /// Open the viewer window and print the control listing
    pub fn new() -> Result<Self> {
        let window = ViewerWindow::new("regviz viewer")?;

        println!(
            "regviz viewer initialized. Press:\n\
             \t[SPACE] to pause/start\n\
             \t  [ESC] to exit\n\
             \t    [N] to step\n\
             \t    [F] to toggle on/off the input cloud to the pipeline\n\
             \t    [K] to toggle on/off the subsampled frame\n\
             \t    [M] to toggle on/off the local map\n\
             \t    [V] to toggle ego/global viewpoint\n\
             \t    [T] to toggle the trajectory view (only available in global view)\n\
             \t    [C] to center the viewpoint\n\
             \t    [W] to toggle a white background\n\
             \t    [B] to toggle a black background"
        );

        Ok(Self {
            window,
            scene: Scene::new(),
            centered: false,
        })
    }

    fn translate(key: &Key) -> Option<ViewerEvent> {
        match key {
            Key::Named(NamedKey::Space) => Some(ViewerEvent::TogglePlay),
            Key::Named(NamedKey::Escape) => Some(ViewerEvent::Quit),
            Key::Character(c) => match c.as_str().to_ascii_lowercase().as_str() {
                "n" => Some(ViewerEvent::Step),
                "v" => Some(ViewerEvent::ToggleGlobalView),
                "c" => Some(ViewerEvent::CenterView),
                "f" => Some(ViewerEvent::ToggleFrame),
                "k" => Some(ViewerEvent::ToggleKeypoints),
                "m" => Some(ViewerEvent::ToggleMap),
                "t" => Some(ViewerEvent::ToggleTrajectory),
                "b" => Some(ViewerEvent::SetBackground([0.0, 0.0, 0.0])),
                "w" => Some(ViewerEvent::SetBackground([1.0, 1.0, 1.0])),
                "q" => Some(ViewerEvent::Quit),
                _ => None,
            },
            _ => None,
        }
    }
}

impl RenderBackend for KeysBackend {
    fn register_points(
        &mut self,
        id: GeometryId,
        points: &[Point3f],
        color: Rgb,
        style: RenderStyle,
        size: f32,
    ) -> Result<()> {
        self.scene.register(id, points, color, style, size);
        Ok(())
    }

    fn set_transform(&mut self, id: GeometryId, transform: Matrix4<f32>) {
        self.scene.set_transform(id, transform);
    }

    fn set_enabled(&mut self, id: GeometryId, enabled: bool) {
        self.scene.set_enabled(id, enabled);
    }

    fn update_trajectory(
        &mut self,
        _positions: &[Point3f],
        latest_pose: &Pose,
        color: Rgb,
    ) -> Result<()> {
        self.scene
            .add_marker(latest_pose.position(), color, MARKER_SIZE);
        if !self.centered {
            self.window.center_on(&self.scene);
            self.centered = true;
        }
        Ok(())
    }

    fn set_trajectory_visible(&mut self, visible: bool) {
        self.scene.set_markers_visible(visible);
    }

    fn set_background(&mut self, color: Rgb) {
        self.window.renderer.set_background(color);
    }

    fn center_view(&mut self) {
        self.window.center_on(&self.scene);
    }

    fn poll_events(&mut self) -> Vec<ViewerEvent> {
        let signals = self.window.pump();

        let mut events = Vec::new();
        for signal in &signals {
            match signal {
                WindowSignal::CloseRequested => events.push(ViewerEvent::Quit),
                WindowSignal::KeyPressed(key) => {
                    if let Some(event) = Self::translate(key) {
                        events.push(event);
                    }
                }
                _ => {}
            }
        }

        self.window.apply_camera_input(&signals);
        if let Err(e) = self.window.draw(&self.scene) {
            eprintln!("Render error: {}", e);
        }

        events
    }

    fn exclusive_frame_keypoints(&self) -> bool {
        true
    }

    fn teardown(&mut self) {
        println!("Destroying visualizer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_dispatch_table() {
        assert_eq!(
            KeysBackend::translate(&Key::Named(NamedKey::Space)),
            Some(ViewerEvent::TogglePlay)
        );
        assert_eq!(
            KeysBackend::translate(&Key::Character("n".into())),
            Some(ViewerEvent::Step)
        );
        assert_eq!(
            KeysBackend::translate(&Key::Character("V".into())),
            Some(ViewerEvent::ToggleGlobalView)
        );
        assert_eq!(
            KeysBackend::translate(&Key::Character("w".into())),
            Some(ViewerEvent::SetBackground([1.0, 1.0, 1.0]))
        );
        assert_eq!(
            KeysBackend::translate(&Key::Named(NamedKey::Escape)),
            Some(ViewerEvent::Quit)
        );
        assert_eq!(KeysBackend::translate(&Key::Character("x".into())), None);
    }
}
