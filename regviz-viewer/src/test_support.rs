//! Scripted fake backend for controller tests

use crate::backend::RenderBackend;
use crate::events::{GeometryId, RenderStyle, ViewerEvent};
use regviz_core::{Matrix4, Point3f, Pose, Result, Rgb};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Everything the fake backend observed, shared with the test body
#[derive(Debug, Default)]
pub struct Recorder {
    pub registered: Vec<(GeometryId, usize, Rgb, RenderStyle, f32)>,
    pub transforms: Vec<(GeometryId, Matrix4<f32>)>,
    pub enabled: Vec<(GeometryId, bool)>,
    pub trajectory_lengths: Vec<usize>,
    pub trajectory_visible: Vec<bool>,
    pub backgrounds: Vec<Rgb>,
    pub centers: usize,
    pub polls: usize,
    pub torn_down: bool,
}

impl Recorder {
    pub fn last_transform(&self, id: GeometryId) -> Option<Matrix4<f32>> {
        self.transforms
            .iter()
            .rev()
            .find(|(tid, _)| *tid == id)
            .map(|(_, tf)| *tf)
    }

    pub fn last_enabled(&self, id: GeometryId) -> Option<bool> {
        self.enabled
            .iter()
            .rev()
            .find(|(tid, _)| *tid == id)
            .map(|(_, e)| *e)
    }
}

/// Backend fake that replays a queued script of event-pump ticks
pub struct ScriptedBackend {
    pub recorder: Rc<RefCell<Recorder>>,
    script: VecDeque<Vec<ViewerEvent>>,
    exclusive: bool,
}

impl ScriptedBackend {
    /// One inner `Vec` per expected `poll_events` tick
    pub fn new(script: Vec<Vec<ViewerEvent>>) -> Self {
        Self {
            recorder: Rc::new(RefCell::new(Recorder::default())),
            script: script.into(),
            exclusive: false,
        }
    }

    pub fn with_exclusive_toggles(mut self) -> Self {
        self.exclusive = true;
        self
    }
}

impl RenderBackend for ScriptedBackend {
    fn register_points(
        &mut self,
        id: GeometryId,
        points: &[Point3f],
        color: Rgb,
        style: RenderStyle,
        size: f32,
    ) -> Result<()> {
        self.recorder
            .borrow_mut()
            .registered
            .push((id, points.len(), color, style, size));
        Ok(())
    }

    fn set_transform(&mut self, id: GeometryId, transform: Matrix4<f32>) {
        self.recorder.borrow_mut().transforms.push((id, transform));
    }

    fn set_enabled(&mut self, id: GeometryId, enabled: bool) {
        self.recorder.borrow_mut().enabled.push((id, enabled));
    }

    fn update_trajectory(
        &mut self,
        positions: &[Point3f],
        _latest_pose: &Pose,
        _color: Rgb,
    ) -> Result<()> {
        self.recorder
            .borrow_mut()
            .trajectory_lengths
            .push(positions.len());
        Ok(())
    }

    fn set_trajectory_visible(&mut self, visible: bool) {
        self.recorder.borrow_mut().trajectory_visible.push(visible);
    }

    fn set_background(&mut self, color: Rgb) {
        self.recorder.borrow_mut().backgrounds.push(color);
    }

    fn center_view(&mut self) {
        self.recorder.borrow_mut().centers += 1;
    }

    fn poll_events(&mut self) -> Vec<ViewerEvent> {
        self.recorder.borrow_mut().polls += 1;
        self.script
            .pop_front()
            .expect("scripted backend ran out of event ticks")
    }

    fn exclusive_frame_keypoints(&self) -> bool {
        self.exclusive
    }

    fn teardown(&mut self) {
        self.recorder.borrow_mut().torn_down = true;
    }
}
