//! winit window glue shared by the windowed backends
//!
//! `pump` runs one non-blocking tick of the event loop and returns the raw
//! input signals that occurred; each backend translates those into
//! `ViewerEvent`s through its own native mechanism (panel widgets or a
//! keystroke dispatch table).

use crate::camera::Camera;
use crate::scene::Scene;
use regviz_core::{Error, Result};
use regviz_gpu::{PointRenderer, RenderConfig};
use std::sync::Arc;
use std::time::Duration;
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::EventLoop,
    keyboard::Key,
    platform::pump_events::EventLoopExtPumpEvents,
    window::{Window, WindowBuilder},
};

/// Raw input drained from one pump tick
#[derive(Debug, Clone, PartialEq)]
pub enum WindowSignal {
    KeyPressed(Key),
    CloseRequested,
    PointerMoved(f32, f32),
    PointerButton { primary: bool, pressed: bool },
    Scroll(f32),
}

/// A winit window with an attached point renderer and orbit camera
pub struct ViewerWindow {
    event_loop: EventLoop<()>,
    pub window: Arc<Window>,
    pub renderer: PointRenderer,
    pub camera: Camera,
    cursor: Option<(f32, f32)>,
    dragging: bool,
}

impl ViewerWindow {
    /// Open a window and initialize the GPU renderer
    pub fn new(title: &str) -> Result<Self> {
        let event_loop = EventLoop::new()
            .map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;

        let window = Arc::new(
            WindowBuilder::new()
                .with_title(title)
                .with_inner_size(LogicalSize::new(1280.0, 720.0))
                .build(&event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let renderer =
            pollster::block_on(PointRenderer::new(window.clone(), RenderConfig::default()))?;

        let mut camera = Camera::default();
        let size = window.inner_size();
        if size.height > 0 {
            camera.aspect_ratio = size.width as f32 / size.height as f32;
        }

        Ok(Self {
            event_loop,
            window,
            renderer,
            camera,
            cursor: None,
            dragging: false,
        })
    }

    /// One non-blocking event-pump tick; resizes are handled internally
    pub fn pump(&mut self) -> Vec<WindowSignal> {
        let mut signals = Vec::new();
        let Self {
            event_loop,
            renderer,
            camera,
            ..
        } = self;

        let _ = event_loop.pump_events(Some(Duration::ZERO), |event, _| {
            if let Event::WindowEvent { event, .. } = event {
                match event {
                    WindowEvent::CloseRequested => signals.push(WindowSignal::CloseRequested),
                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        if new_size.height > 0 {
                            camera.aspect_ratio = new_size.width as f32 / new_size.height as f32;
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state == ElementState::Pressed && !event.repeat {
                            signals.push(WindowSignal::KeyPressed(event.logical_key));
                        }
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        signals.push(WindowSignal::PointerButton {
                            primary: button == MouseButton::Left,
                            pressed: state == ElementState::Pressed,
                        });
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        signals.push(WindowSignal::PointerMoved(
                            position.x as f32,
                            position.y as f32,
                        ));
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let scroll = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                        };
                        signals.push(WindowSignal::Scroll(scroll));
                    }
                    _ => {}
                }
            }
        });

        signals
    }

    /// Drive the orbit camera from pointer signals
    pub fn apply_camera_input(&mut self, signals: &[WindowSignal]) {
        for signal in signals {
            match signal {
                WindowSignal::PointerButton { primary: true, pressed } => {
                    self.dragging = *pressed;
                }
                WindowSignal::PointerMoved(x, y) => {
                    if let Some((last_x, last_y)) = self.cursor {
                        if self.dragging {
                            self.camera.orbit((x - last_x) * 0.01, (y - last_y) * 0.01);
                        }
                    }
                    self.cursor = Some((*x, *y));
                }
                WindowSignal::Scroll(delta) => {
                    self.camera.zoom(delta * 0.1);
                }
                _ => {}
            }
        }
    }

    /// Push the current camera matrices to the renderer
    pub fn upload_camera(&mut self) {
        self.renderer.update_camera(
            self.camera.view_matrix(),
            self.camera.projection_matrix(),
            self.camera.position.coords,
        );
    }

    /// Render one frame of the scene
    pub fn draw(&mut self, scene: &Scene) -> Result<()> {
        self.upload_camera();
        self.renderer.render(&scene.vertices())
    }

    /// Re-home the camera onto the currently visible geometry
    pub fn center_on(&mut self, scene: &Scene) {
        match scene.bounding_box() {
            Some((min, max)) => self.camera.frame_bounds(min, max),
            None => self.camera.reset(),
        }
    }
}
