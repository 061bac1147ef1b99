//! Immediate-mode control panel backend
//!
//! Controls live in an egui side panel (buttons and checkboxes); pointer
//! input is routed to the panel first, the orbit camera only receives drags
//! the panel does not claim. Frame/keypoints toggles are independent here.

use crate::backend::RenderBackend;
use crate::events::{GeometryId, RenderStyle, ViewerEvent};
use crate::pipeline::TRAJECTORY_POINT_SIZE;
use crate::scene::Scene;
use crate::view_state::BACKGROUND_COLOR;
use crate::window::{ViewerWindow, WindowSignal};
use regviz_core::{Matrix4, Point3f, Pose, Result, Rgb};

/// Windowed backend with an egui control panel
pub struct PanelBackend {
    window: ViewerWindow,
    scene: Scene,
    ctx: egui::Context,
    egui_renderer: egui_wgpu::Renderer,
    pointer: egui::Pos2,
    show_frame: bool,
    show_keypoints: bool,
    show_map: bool,
    background: Rgb,
    /// Mirrors the playback mode; play toggles only originate from this
    /// panel, so flipping on each emitted toggle keeps it in sync
    playing: bool,
    centered: bool,
}

impl PanelBackend {
    /// Open the viewer window and set up the panel renderer
    pub fn new() -> Result<Self> {
        let window = ViewerWindow::new("regviz viewer")?;

        let egui_renderer = egui_wgpu::Renderer::new(
            &window.renderer.gpu_context.device,
            window.renderer.surface_config.format,
            None,
            1,
        );

        Ok(Self {
            window,
            scene: Scene::new(),
            ctx: egui::Context::default(),
            egui_renderer,
            pointer: egui::Pos2::ZERO,
            show_frame: true,
            show_keypoints: true,
            show_map: true,
            background: BACKGROUND_COLOR,
            playing: false,
            centered: false,
        })
    }

    /// Translate raw window signals into egui input
    fn raw_input(&mut self, signals: &[WindowSignal]) -> egui::RawInput {
        let mut raw = egui::RawInput::default();
        let size = self.window.window.inner_size();
        raw.screen_rect = Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(size.width as f32, size.height as f32),
        ));

        for signal in signals {
            match signal {
                WindowSignal::PointerMoved(x, y) => {
                    self.pointer = egui::pos2(*x, *y);
                    raw.events.push(egui::Event::PointerMoved(self.pointer));
                }
                WindowSignal::PointerButton { primary, pressed } => {
                    raw.events.push(egui::Event::PointerButton {
                        pos: self.pointer,
                        button: if *primary {
                            egui::PointerButton::Primary
                        } else {
                            egui::PointerButton::Secondary
                        },
                        pressed: *pressed,
                        modifiers: egui::Modifiers::default(),
                    });
                }
                WindowSignal::Scroll(delta) => {
                    raw.events.push(egui::Event::MouseWheel {
                        unit: egui::MouseWheelUnit::Line,
                        delta: egui::vec2(0.0, *delta),
                        modifiers: egui::Modifiers::default(),
                    });
                }
                _ => {}
            }
        }

        raw
    }

    /// Whether the panel offers the single-frame step control; stepping is
    /// only meaningful while paused
    fn offers_step(playing: bool) -> bool {
        !playing
    }

    /// Run the panel UI for one tick and collect triggered events
    fn run_panel(&mut self, raw: egui::RawInput, events: &mut Vec<ViewerEvent>) -> egui::FullOutput {
        let mut show_frame = self.show_frame;
        let mut show_keypoints = self.show_keypoints;
        let mut show_map = self.show_map;
        let mut background = self.background;
        let mut playing = self.playing;

        let full_output = self.ctx.run(raw, |ctx| {
            egui::SidePanel::left("controls").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("START/PAUSE").clicked() {
                        events.push(ViewerEvent::TogglePlay);
                        playing = !playing;
                    }
                    if Self::offers_step(playing) && ui.button("NEXT FRAME").clicked() {
                        events.push(ViewerEvent::Step);
                    }
                });
                if ui.button("CENTER VIEWPOINT").clicked() {
                    events.push(ViewerEvent::CenterView);
                }
                ui.separator();
                if ui.checkbox(&mut show_frame, "Frame Cloud").changed() {
                    events.push(ViewerEvent::ToggleFrame);
                }
                if ui.checkbox(&mut show_keypoints, "Keypoints").changed() {
                    events.push(ViewerEvent::ToggleKeypoints);
                }
                if ui.checkbox(&mut show_map, "Local Map").changed() {
                    events.push(ViewerEvent::ToggleMap);
                }
                ui.separator();
                ui.horizontal(|ui| {
                    ui.label("Background Color");
                    if ui.color_edit_button_rgb(&mut background).changed() {
                        events.push(ViewerEvent::SetBackground(background));
                    }
                });
                if ui.button("GLOBAL VIEW").clicked() {
                    events.push(ViewerEvent::ToggleGlobalView);
                }
                ui.separator();
                if ui.button("QUIT").clicked() {
                    events.push(ViewerEvent::Quit);
                }
            });
        });

        self.playing = playing;
        full_output
    }

    fn draw(&mut self, full_output: egui::FullOutput) -> Result<()> {
        self.window.upload_camera();

        let renderer = &self.window.renderer;
        let mut frame = renderer.begin_frame()?;
        renderer.draw_points(&mut frame, &self.scene.vertices());

        // Panel pass on top of the point pass
        let device = &renderer.gpu_context.device;
        let queue = &renderer.gpu_context.queue;
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [renderer.surface_config.width, renderer.surface_config.height],
            pixels_per_point: 1.0,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, delta);
        }
        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        self.egui_renderer
            .update_buffers(device, queue, &mut frame.encoder, &paint_jobs, &screen);

        {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Panel Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer.render(&mut pass, &paint_jobs, &screen);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        renderer.finish_frame(frame);
        Ok(())
    }
}

impl RenderBackend for PanelBackend {
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
        // Keep the checkbox mirrors in sync with the controller's state
        match id {
            GeometryId::Frame => self.show_frame = enabled,
            GeometryId::Keypoints => self.show_keypoints = enabled,
            GeometryId::LocalMap => self.show_map = enabled,
            GeometryId::Trajectory => {}
        }
        self.scene.set_enabled(id, enabled);
    }

    fn update_trajectory(
        &mut self,
        positions: &[Point3f],
        _latest_pose: &Pose,
        color: Rgb,
    ) -> Result<()> {
        self.scene.register(
            GeometryId::Trajectory,
            positions,
            color,
            RenderStyle::Sphere,
            TRAJECTORY_POINT_SIZE,
        );
        if !self.centered {
            self.window.center_on(&self.scene);
            self.centered = true;
        }
        Ok(())
    }

    fn set_trajectory_visible(&mut self, visible: bool) {
        self.scene.set_enabled(GeometryId::Trajectory, visible);
    }

    fn set_background(&mut self, color: Rgb) {
        self.background = color;
        self.window.renderer.set_background(color);
    }

    fn center_view(&mut self) {
        self.window.center_on(&self.scene);
    }

    fn poll_events(&mut self) -> Vec<ViewerEvent> {
        let signals = self.window.pump();

        let mut events: Vec<ViewerEvent> = signals
            .iter()
            .filter_map(|signal| match signal {
                WindowSignal::CloseRequested => Some(ViewerEvent::Quit),
                _ => None,
            })
            .collect();

        let raw = self.raw_input(&signals);
        let full_output = self.run_panel(raw, &mut events);

        if !self.ctx.wants_pointer_input() {
            self.window.apply_camera_input(&signals);
        }

        if let Err(e) = self.draw(full_output) {
            eprintln!("Render error: {}", e);
        }

        events
    }

    fn teardown(&mut self) {
        println!("Destroying visualizer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_control_only_offered_while_paused() {
        assert!(PanelBackend::offers_step(false));
        assert!(!PanelBackend::offers_step(true));
    }
}
