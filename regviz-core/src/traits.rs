//! Core traits for regviz

use crate::point::Point3f;
use crate::point_cloud::PointCloud;

/// The seam through which a registration pipeline hands its accumulated map
/// to the viewer: anything that can flatten itself to a point list.
pub trait LocalMap {
    /// Flatten the map to a plain point cloud
    fn point_cloud(&self) -> PointCloud<Point3f>;
}

/// A plain accumulated cloud can act as the local map directly
impl LocalMap for PointCloud<Point3f> {
    fn point_cloud(&self) -> PointCloud<Point3f> {
        self.clone()
    }
}

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f;
}

impl Drawable for PointCloud<Point3f> {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        if self.is_empty() {
            return (Point3f::origin(), Point3f::origin());
        }

        let mut min = self.points[0];
        let mut max = self.points[0];

        for p in &self.points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);

            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        (min, max)
    }

    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_map_flattens_cloud() {
        let cloud = PointCloud::from_points(vec![
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ]);
        let map: &dyn LocalMap = &cloud;
        assert_eq!(map.point_cloud().len(), 2);
    }

    #[test]
    fn test_bounding_box_and_center() {
        let cloud = PointCloud::from_points(vec![
            Point3f::new(-1.0, -2.0, -3.0),
            Point3f::new(3.0, 2.0, 1.0),
        ]);
        let (min, max) = cloud.bounding_box();
        assert_eq!(min, Point3f::new(-1.0, -2.0, -3.0));
        assert_eq!(max, Point3f::new(3.0, 2.0, 1.0));
        assert_eq!(cloud.center(), Point3f::new(1.0, 0.0, -1.0));
    }
}
