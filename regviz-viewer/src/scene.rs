//! Named geometry store shared by the windowed backends
//!
//! The scene owns what the renderer draws: per-geometry points, color,
//! style, world transform and enabled flag, plus the batch of per-frame
//! pose markers used by the keys backend. Vertices are rebuilt from it on
//! every redraw, with transforms applied on the CPU.

use crate::events::{GeometryId, RenderStyle};
use regviz_core::{Matrix4, Point3f, Rgb};
use regviz_gpu::PointVertex;
use std::collections::HashMap;

/// One registered geometry
#[derive(Debug, Clone)]
pub struct SceneGeometry {
    pub points: Vec<Point3f>,
    pub color: Rgb,
    pub style: RenderStyle,
    pub size: f32,
    pub transform: Matrix4<f32>,
    pub enabled: bool,
}

impl SceneGeometry {
    fn empty() -> Self {
        Self {
            points: Vec::new(),
            color: [1.0, 1.0, 1.0],
            style: RenderStyle::Quad,
            size: 0.1,
            transform: Matrix4::identity(),
            enabled: true,
        }
    }
}

/// The complete drawable state of one viewer window
#[derive(Debug, Default)]
pub struct Scene {
    geometries: HashMap<GeometryId, SceneGeometry>,
    markers: Vec<SceneGeometry>,
    markers_visible: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the points of a named geometry, preserving its
    /// current transform and enabled flag
    pub fn register(
        &mut self,
        id: GeometryId,
        points: &[Point3f],
        color: Rgb,
        style: RenderStyle,
        size: f32,
    ) {
        let geometry = self.geometries.entry(id).or_insert_with(SceneGeometry::empty);
        geometry.points = points.to_vec();
        geometry.color = color;
        geometry.style = style;
        geometry.size = size;
    }

    pub fn set_transform(&mut self, id: GeometryId, transform: Matrix4<f32>) {
        self.geometries
            .entry(id)
            .or_insert_with(SceneGeometry::empty)
            .transform = transform;
    }

    pub fn set_enabled(&mut self, id: GeometryId, enabled: bool) {
        self.geometries
            .entry(id)
            .or_insert_with(SceneGeometry::empty)
            .enabled = enabled;
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&SceneGeometry> {
        self.geometries.get(&id)
    }

    /// Append one pose marker to the history batch
    pub fn add_marker(&mut self, position: Point3f, color: Rgb, size: f32) {
        self.markers.push(SceneGeometry {
            points: vec![position],
            color,
            style: RenderStyle::Sphere,
            size,
            transform: Matrix4::identity(),
            enabled: true,
        });
    }

    /// Show or hide the whole marker batch at once
    pub fn set_markers_visible(&mut self, visible: bool) {
        self.markers_visible = visible;
    }

    pub fn markers_visible(&self) -> bool {
        self.markers_visible
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    fn drawn_geometries(&self) -> impl Iterator<Item = &SceneGeometry> {
        let markers_visible = self.markers_visible;
        self.geometries
            .values()
            .filter(|g| g.enabled)
            .chain(self.markers.iter().filter(move |_| markers_visible))
    }

    /// Axis-aligned bounds of everything currently drawn, in world space
    pub fn bounding_box(&self) -> Option<(Point3f, Point3f)> {
        let mut bounds: Option<(Point3f, Point3f)> = None;
        for geometry in self.drawn_geometries() {
            for point in &geometry.points {
                let world = transform_point(&geometry.transform, point);
                let (min, max) = bounds.get_or_insert((world, world));
                min.x = min.x.min(world.x);
                min.y = min.y.min(world.y);
                min.z = min.z.min(world.z);
                max.x = max.x.max(world.x);
                max.y = max.y.max(world.y);
                max.z = max.z.max(world.z);
            }
        }
        bounds
    }

    /// Build the vertex list for one redraw
    pub fn vertices(&self) -> Vec<PointVertex> {
        let mut vertices = Vec::new();
        for geometry in self.drawn_geometries() {
            let half = geometry.size / 2.0;
            for point in &geometry.points {
                let world = transform_point(&geometry.transform, point);
                match geometry.style {
                    RenderStyle::Quad => {
                        push_quad(&mut vertices, world, geometry.color, half, Plane::Xy);
                    }
                    RenderStyle::Sphere => {
                        // Three crossed quads read as a blob from any angle
                        push_quad(&mut vertices, world, geometry.color, half, Plane::Xy);
                        push_quad(&mut vertices, world, geometry.color, half, Plane::Xz);
                        push_quad(&mut vertices, world, geometry.color, half, Plane::Yz);
                    }
                }
            }
        }
        vertices
    }
}

fn transform_point(matrix: &Matrix4<f32>, point: &Point3f) -> Point3f {
    Point3f::from_homogeneous(matrix * point.to_homogeneous()).unwrap_or(*point)
}

#[derive(Clone, Copy)]
enum Plane {
    Xy,
    Xz,
    Yz,
}

fn push_quad(out: &mut Vec<PointVertex>, center: Point3f, color: Rgb, half: f32, plane: Plane) {
    let (u, v) = match plane {
        Plane::Xy => (
            nalgebra::Vector3::new(half, 0.0, 0.0),
            nalgebra::Vector3::new(0.0, half, 0.0),
        ),
        Plane::Xz => (
            nalgebra::Vector3::new(half, 0.0, 0.0),
            nalgebra::Vector3::new(0.0, 0.0, half),
        ),
        Plane::Yz => (
            nalgebra::Vector3::new(0.0, half, 0.0),
            nalgebra::Vector3::new(0.0, 0.0, half),
        ),
    };

    let v1 = PointVertex::from_point(&(center - u - v), color);
    let v2 = PointVertex::from_point(&(center + u - v), color);
    let v3 = PointVertex::from_point(&(center + u + v), color);
    let v4 = PointVertex::from_point(&(center - u + v), color);

    // Two triangles per quad
    out.extend_from_slice(&[v1, v2, v3, v1, v3, v4]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_preserves_transform() {
        let mut scene = Scene::new();
        let shift = Matrix4::new_translation(&nalgebra::Vector3::new(5.0, 0.0, 0.0));
        scene.set_transform(GeometryId::Frame, shift);
        scene.register(
            GeometryId::Frame,
            &[Point3f::origin()],
            [1.0, 0.0, 0.0],
            RenderStyle::Quad,
            0.2,
        );
        let geometry = scene.geometry(GeometryId::Frame).unwrap();
        assert_eq!(geometry.transform, shift);
    }

    #[test]
    fn test_disabled_geometry_is_not_drawn() {
        let mut scene = Scene::new();
        scene.register(
            GeometryId::Frame,
            &[Point3f::origin()],
            [1.0, 0.0, 0.0],
            RenderStyle::Quad,
            0.2,
        );
        assert_eq!(scene.vertices().len(), 6);
        scene.set_enabled(GeometryId::Frame, false);
        assert!(scene.vertices().is_empty());
    }

    #[test]
    fn test_markers_toggle_as_a_batch() {
        let mut scene = Scene::new();
        scene.add_marker(Point3f::origin(), [0.4, 0.5, 0.9], 0.2);
        scene.add_marker(Point3f::new(1.0, 0.0, 0.0), [0.4, 0.5, 0.9], 0.2);
        assert_eq!(scene.marker_count(), 2);
        assert!(!scene.markers_visible());
        assert!(scene.vertices().is_empty());

        scene.set_markers_visible(true);
        assert!(scene.markers_visible());
        // Two markers, three quads each, six vertices per quad
        assert_eq!(scene.vertices().len(), 2 * 3 * 6);

        scene.set_markers_visible(false);
        // Hiding the batch does not discard the history
        assert_eq!(scene.marker_count(), 2);
        assert!(scene.vertices().is_empty());
    }

    #[test]
    fn test_bounding_box_applies_transform() {
        let mut scene = Scene::new();
        scene.register(
            GeometryId::Frame,
            &[Point3f::origin()],
            [1.0, 1.0, 1.0],
            RenderStyle::Quad,
            0.2,
        );
        scene.set_transform(
            GeometryId::Frame,
            Matrix4::new_translation(&nalgebra::Vector3::new(0.0, 7.0, 0.0)),
        );
        let (min, max) = scene.bounding_box().unwrap();
        assert_eq!(min, Point3f::new(0.0, 7.0, 0.0));
        assert_eq!(max, min);
    }
}
