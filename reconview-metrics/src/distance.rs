//! Point-to-surface and point-to-cloud distances

use rayon::prelude::*;
use reconview_core::{Point3f, PointCloud, TriangleMesh};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A mesh face stored in the R*-tree together with its corner positions
#[derive(Debug, Clone)]
struct IndexedTriangle {
    corners: [Point3f; 3],
}

impl RTreeObject for IndexedTriangle {
    type Envelope = AABB<[f32; 3]>;

    fn envelope(&self) -> Self::Envelope {
        let [a, b, c] = self.corners;
        let min = a.inf(&b).inf(&c);
        let max = a.sup(&b).sup(&c);
        AABB::from_corners([min.x, min.y, min.z], [max.x, max.y, max.z])
    }
}

impl PointDistance for IndexedTriangle {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let p = Point3f::new(point[0], point[1], point[2]);
        let [a, b, c] = self.corners;
        (closest_point_on_triangle(&p, &a, &b, &c) - p).norm_squared()
    }
}

/// Closest point to `p` on triangle `abc`, including its edges and corners.
///
/// Voronoi-region walk from Ericson, *Real-Time Collision Detection* §5.1.5.
/// Degenerate triangles fall through to the nearest corner or edge.
pub fn closest_point_on_triangle(p: &Point3f, a: &Point3f, b: &Point3f, c: &Point3f) -> Point3f {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return *a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return *a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return *b + (c - b) * w;
    }

    let denom = va + vb + vc;
    if denom.abs() <= f32::EPSILON {
        // Zero-area triangle that still reached the interior branch
        return *a;
    }
    let v = vb / denom;
    let w = vc / denom;
    *a + ab * v + ac * w
}

/// Summary of a set of unsigned distances
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceStats {
    pub mean: f32,
    pub rms: f32,
    pub max: f32,
    pub count: usize,
}

impl DistanceStats {
    /// `None` for an empty slice
    pub fn from_distances(distances: &[f32]) -> Option<Self> {
        if distances.is_empty() {
            return None;
        }
        let n = distances.len() as f64;
        let sum: f64 = distances.iter().map(|&d| d as f64).sum();
        let sum_sq: f64 = distances.iter().map(|&d| (d as f64) * (d as f64)).sum();
        let max = distances.iter().copied().fold(0.0f32, f32::max);

        Some(Self {
            mean: (sum / n) as f32,
            rms: (sum_sq / n).sqrt() as f32,
            max,
            count: distances.len(),
        })
    }
}

/// Spatial index over a mesh surface for closest-point queries
pub struct SurfaceDistance {
    tree: RTree<IndexedTriangle>,
}

impl SurfaceDistance {
    pub fn new(mesh: &TriangleMesh) -> Self {
        let triangles = (0..mesh.face_count())
            .map(|i| IndexedTriangle {
                corners: mesh.triangle(i),
            })
            .collect();

        Self {
            tree: RTree::bulk_load(triangles),
        }
    }

    /// Distance from `p` to the closest point on the surface
    pub fn distance(&self, p: &Point3f) -> Option<f32> {
        let query = [p.x, p.y, p.z];
        self.tree
            .nearest_neighbor(&query)
            .map(|tri| tri.distance_2(&query).sqrt())
    }

    /// Distances from every point of `cloud` to the surface, in cloud order
    pub fn distances(&self, cloud: &PointCloud<Point3f>) -> Vec<f32> {
        cloud
            .points
            .par_iter()
            .filter_map(|p| self.distance(p))
            .collect()
    }
}

/// Distances from each of `queries` to its nearest point in `cloud`
pub fn nearest_point_distances(queries: &[Point3f], cloud: &PointCloud<Point3f>) -> Vec<f32> {
    let tree: RTree<[f32; 3]> = RTree::bulk_load(
        cloud.points.iter().map(|p| [p.x, p.y, p.z]).collect(),
    );

    queries
        .par_iter()
        .filter_map(|q| {
            let query = [q.x, q.y, q.z];
            tree.nearest_neighbor(&query)
                .map(|nearest| nearest.distance_2(&query).sqrt())
        })
        .collect()
}
