//! Core traits for reconview

use crate::{point::*, point_cloud::*, mesh::*};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point3f,
    pub max: Point3f,
}

impl Bounds {
    /// An inverted box that any point will expand
    pub fn empty() -> Self {
        Self {
            min: Point3f::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3f::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Bounds of a set of points; `Bounds::empty()` when there are none
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3f>,
    {
        let mut bounds = Self::empty();
        for p in points {
            bounds.expand(p);
        }
        bounds
    }

    /// Grow the box to contain `p`
    pub fn expand(&mut self, p: &Point3f) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Union of two boxes
    pub fn merge(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn center(&self) -> Point3f {
        nalgebra::center(&self.min, &self.max)
    }

    /// Length of the box diagonal
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).norm()
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounds(&self) -> Bounds;

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        self.bounds().center()
    }
}

impl Drawable for PointCloud<Point3f> {
    fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.points)
    }
}

impl Drawable for TriangleMesh {
    fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bounds_invalid() {
        let cloud = PointCloud::<Point3f>::new();
        assert!(!cloud.bounds().is_valid());
    }

    #[test]
    fn test_bounds_center_and_diagonal() {
        let cloud = PointCloud::from_points(vec![
            Point3f::new(-1.0, -1.0, -1.0),
            Point3f::new(1.0, 1.0, 1.0),
            Point3f::new(0.2, 0.3, -0.4),
        ]);
        let b = cloud.bounds();
        assert!(b.is_valid());
        assert_eq!(b.center(), Point3f::origin());
        assert!((b.diagonal() - 12.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_merge_with_empty_is_identity() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(2.0, 1.0, 0.0), Point3f::new(0.0, 3.0, 1.0)],
            vec![[0, 1, 2]],
        );
        let merged = Bounds::empty().merge(&mesh.bounds());
        assert_eq!(merged, mesh.bounds());
        assert_eq!(mesh.center(), Point3f::new(1.0, 1.5, 0.5));
    }
}
