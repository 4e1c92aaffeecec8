//! The combined metrics report shown next to a reconstruction

use crate::distance::{nearest_point_distances, DistanceStats, SurfaceDistance};
use crate::quality::QualityStats;
use crate::topology::TopologyStats;
use reconview_core::{Error, Point3f, PointCloud, Result, TriangleMesh};
use serde::Serialize;
use std::fmt;

/// Everything the metrics panel lists for one reconstruction.
///
/// Distance fields are `None` when no source point cloud was available.
/// Shape fields are `None` when every triangle is degenerate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub name: String,
    pub mean_error: Option<f32>,
    pub rms: Option<f32>,
    pub hausdorff: Option<f32>,
    pub aspect_ratio: Option<f32>,
    pub angular_quality: Option<f32>,
    pub area: f32,
    pub hmin_lmax: Option<f32>,
    pub mean_valence: f32,
    pub holes: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub degenerate_triangles: usize,
    pub boundary_edges: usize,
    pub non_manifold_edges: usize,
    pub cloud_points: Option<usize>,
}

impl MetricsReport {
    pub fn compute(
        name: impl Into<String>,
        mesh: &TriangleMesh,
        cloud: Option<&PointCloud<Point3f>>,
    ) -> Result<Self> {
        if mesh.is_empty() {
            return Err(Error::InvalidData(
                "cannot compute metrics for an empty mesh".to_string(),
            ));
        }
        mesh.validate()?;

        let quality = QualityStats::compute(mesh);
        let topology = TopologyStats::compute(mesh);

        let cloud = cloud.filter(|c| !c.is_empty());
        let (to_mesh, to_cloud) = match cloud {
            Some(cloud) => {
                let surface = SurfaceDistance::new(mesh);
                let forward = DistanceStats::from_distances(&surface.distances(cloud));
                let backward =
                    DistanceStats::from_distances(&nearest_point_distances(&mesh.vertices, cloud));
                (forward, backward)
            }
            None => (None, None),
        };

        let hausdorff = match (to_mesh, to_cloud) {
            (Some(f), Some(b)) => Some(f.max.max(b.max)),
            (Some(f), None) => Some(f.max),
            _ => None,
        };

        Ok(Self {
            name: name.into(),
            mean_error: to_mesh.map(|s| s.mean),
            rms: to_mesh.map(|s| s.rms),
            hausdorff,
            aspect_ratio: quality.mean_aspect_ratio,
            angular_quality: quality.mean_angular_quality,
            area: quality.total_area,
            hmin_lmax: quality.mean_hmin_lmax,
            mean_valence: topology.mean_valence,
            holes: topology.holes,
            vertices: mesh.vertex_count(),
            triangles: mesh.face_count(),
            degenerate_triangles: quality.degenerate_triangles,
            boundary_edges: topology.boundary_edges,
            non_manifold_edges: topology.non_manifold_edges,
            cloud_points: cloud.map(|c| c.len()),
        })
    }

    /// Label/value pairs in display order, captioned as on the metrics panel
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let opt = |v: Option<f32>, precision: usize| match v {
            Some(v) => format!("{:.*}", precision, v),
            None => "n/a".to_string(),
        };

        vec![
            ("Error mitjà", opt(self.mean_error, 6)),
            ("RMS", opt(self.rms, 6)),
            ("Hausdorff", opt(self.hausdorff, 6)),
            ("Aspect ratio", opt(self.aspect_ratio, 4)),
            ("Qualitat angular", opt(self.angular_quality, 4)),
            ("Àrea", format!("{:.4}", self.area)),
            ("hmin/lmax", opt(self.hmin_lmax, 4)),
            ("València mitjana", format!("{:.3}", self.mean_valence)),
            ("#Forats", self.holes.to_string()),
            ("#Vèrtexs", self.vertices.to_string()),
            ("#Triangles", self.triangles.to_string()),
        ]
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for (label, value) in self.rows() {
            writeln!(f, "  {:<16} {}", label, value)?;
        }
        Ok(())
    }
}
