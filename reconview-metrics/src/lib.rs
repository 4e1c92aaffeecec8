//! # reconview metrics
//!
//! Quality metrics for a surface reconstruction, measured against the point
//! cloud it was built from:
//!
//! - **Distance**: mean error, RMS and symmetric Hausdorff distance between
//!   the source points and the mesh surface
//! - **Triangle quality**: aspect ratio, angular quality, altitude/edge ratio
//!   and total area
//! - **Topology**: mean valence and the number of holes (boundary loops)
//!
//! ```rust
//! use reconview_core::{Point3f, PointCloud, TriangleMesh};
//! use reconview_metrics::MetricsReport;
//!
//! let mesh = TriangleMesh::from_vertices_and_faces(
//!     vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0), Point3f::new(0.0, 1.0, 0.0)],
//!     vec![[0, 1, 2]],
//! );
//! let cloud = PointCloud::from_points(vec![Point3f::new(0.25, 0.25, 0.5)]);
//! let report = MetricsReport::compute("triangle", &mesh, Some(&cloud)).unwrap();
//! assert!((report.mean_error.unwrap() - 0.5).abs() < 1e-6);
//! assert_eq!(report.holes, 1);
//! ```

pub mod distance;
pub mod quality;
pub mod topology;
pub mod report;

pub use distance::{closest_point_on_triangle, DistanceStats, SurfaceDistance};
pub use quality::{triangle_quality, QualityStats, TriangleShape};
pub use topology::TopologyStats;
pub use report::MetricsReport;
