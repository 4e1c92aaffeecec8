//! Per-triangle shape quality

use reconview_core::{Point3f, TriangleMesh};

const SQRT_3: f32 = 1.732_050_8;

/// Shape measures of a single non-degenerate triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleShape {
    /// Longest edge over `2·√3·inradius`; 1.0 for an equilateral triangle
    pub aspect_ratio: f32,
    /// Smallest interior angle over 60°, in [0, 1]
    pub angular_quality: f32,
    /// Shortest altitude over longest edge; √3/2 for an equilateral triangle
    pub hmin_lmax: f32,
    pub area: f32,
}

/// Shape of triangle `abc`, or `None` when it is degenerate
pub fn triangle_quality(a: &Point3f, b: &Point3f, c: &Point3f) -> Option<TriangleShape> {
    let la = (c - b).norm();
    let lb = (a - c).norm();
    let lc = (b - a).norm();
    let lmax = la.max(lb).max(lc);
    let perimeter = la + lb + lc;

    let area = (b - a).cross(&(c - a)).norm() * 0.5;
    if lmax <= f32::EPSILON || area <= f32::EPSILON * lmax * lmax {
        return None;
    }

    let inradius = 2.0 * area / perimeter;
    let aspect_ratio = lmax / (2.0 * SQRT_3 * inradius);

    let angle_at = |p: &Point3f, q: &Point3f, r: &Point3f| (q - p).angle(&(r - p));
    let min_angle = angle_at(a, b, c)
        .min(angle_at(b, c, a))
        .min(angle_at(c, a, b));
    let angular_quality = (min_angle / std::f32::consts::FRAC_PI_3).clamp(0.0, 1.0);

    let hmin = 2.0 * area / lmax;

    Some(TriangleShape {
        aspect_ratio,
        angular_quality,
        hmin_lmax: hmin / lmax,
        area,
    })
}

/// Mesh-wide averages of the triangle shape measures
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QualityStats {
    pub mean_aspect_ratio: Option<f32>,
    pub mean_angular_quality: Option<f32>,
    pub mean_hmin_lmax: Option<f32>,
    pub worst_aspect_ratio: Option<f32>,
    pub total_area: f32,
    pub degenerate_triangles: usize,
}

impl QualityStats {
    /// Averages exclude degenerate triangles, which are only counted.
    pub fn compute(mesh: &TriangleMesh) -> Self {
        let mut sum_aspect = 0.0f64;
        let mut sum_angular = 0.0f64;
        let mut sum_hl = 0.0f64;
        let mut worst = 0.0f32;
        let mut total_area = 0.0f64;
        let mut valid = 0usize;
        let mut degenerate = 0usize;

        for i in 0..mesh.face_count() {
            let [a, b, c] = mesh.triangle(i);
            match triangle_quality(&a, &b, &c) {
                Some(shape) => {
                    sum_aspect += shape.aspect_ratio as f64;
                    sum_angular += shape.angular_quality as f64;
                    sum_hl += shape.hmin_lmax as f64;
                    worst = worst.max(shape.aspect_ratio);
                    total_area += shape.area as f64;
                    valid += 1;
                }
                None => degenerate += 1,
            }
        }

        if degenerate > 0 {
            log::debug!("{} degenerate triangles excluded from shape averages", degenerate);
        }

        let mean = |sum: f64| (valid > 0).then(|| (sum / valid as f64) as f32);
        Self {
            mean_aspect_ratio: mean(sum_aspect),
            mean_angular_quality: mean(sum_angular),
            mean_hmin_lmax: mean(sum_hl),
            worst_aspect_ratio: (valid > 0).then_some(worst),
            total_area: total_area as f32,
            degenerate_triangles: degenerate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn equilateral() -> [Point3f; 3] {
        [
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.5, SQRT_3 / 2.0, 0.0),
        ]
    }

    #[test]
    fn test_equilateral_is_ideal() {
        let [a, b, c] = equilateral();
        let q = triangle_quality(&a, &b, &c).unwrap();
        assert_relative_eq!(q.aspect_ratio, 1.0, epsilon = 1e-5);
        assert_relative_eq!(q.angular_quality, 1.0, epsilon = 1e-5);
        assert_relative_eq!(q.hmin_lmax, SQRT_3 / 2.0, epsilon = 1e-5);
        assert_relative_eq!(q.area, SQRT_3 / 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_right_isoceles() {
        let q = triangle_quality(
            &Point3f::new(0.0, 0.0, 0.0),
            &Point3f::new(1.0, 0.0, 0.0),
            &Point3f::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        // Smallest angle is 45°
        assert_relative_eq!(q.angular_quality, 0.75, epsilon = 1e-5);
        // hmin = 2·0.5/√2, lmax = √2
        assert_relative_eq!(q.hmin_lmax, 0.5, epsilon = 1e-5);
        assert!(q.aspect_ratio > 1.0);
    }

    #[test]
    fn test_collinear_is_degenerate() {
        assert!(triangle_quality(
            &Point3f::new(0.0, 0.0, 0.0),
            &Point3f::new(1.0, 0.0, 0.0),
            &Point3f::new(2.0, 0.0, 0.0),
        )
        .is_none());
    }

    #[test]
    fn test_stats_skip_degenerate() {
        let [a, b, c] = equilateral();
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![a, b, c, Point3f::new(2.0, 0.0, 0.0)],
            vec![[0, 1, 2], [0, 1, 3]],
        );
        let stats = QualityStats::compute(&mesh);
        assert_eq!(stats.degenerate_triangles, 1);
        assert_relative_eq!(stats.mean_aspect_ratio.unwrap(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(stats.total_area, SQRT_3 / 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_all_degenerate_has_no_means() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![Point3f::origin(), Point3f::new(1.0, 0.0, 0.0), Point3f::new(2.0, 0.0, 0.0)],
            vec![[0, 1, 2]],
        );
        let stats = QualityStats::compute(&mesh);
        assert!(stats.mean_aspect_ratio.is_none());
        assert!(stats.worst_aspect_ratio.is_none());
        assert_eq!(stats.degenerate_triangles, 1);
    }
}
