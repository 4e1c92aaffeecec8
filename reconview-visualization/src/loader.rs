//! Background loading of meshes, source clouds and their metrics

use anyhow::{Context, Result};
use reconview_core::{Point3f, PointCloud, TriangleMesh};
use reconview_metrics::MetricsReport;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub key: String,
    pub mesh_path: PathBuf,
    /// `None` when no cloud file exists for the key
    pub cloud_path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct LoadedModel {
    pub key: String,
    pub mesh: TriangleMesh,
    pub cloud: Option<PointCloud<Point3f>>,
    pub metrics: Option<MetricsReport>,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Box<LoadedModel>),
    Failed { key: String, error: String },
}

impl LoadOutcome {
    pub fn key(&self) -> &str {
        match self {
            LoadOutcome::Loaded(model) => &model.key,
            LoadOutcome::Failed { key, .. } => key,
        }
    }
}

/// Read the mesh and optional cloud for `request` and measure them.
///
/// Only a mesh failure is an error. An unreadable cloud is logged and
/// treated as absent, and failed metrics leave `metrics` empty.
pub fn load_model(request: &LoadRequest) -> Result<LoadedModel> {
    let start = Instant::now();

    let mesh = reconview_io::read_mesh(&request.mesh_path)
        .with_context(|| format!("Failed to load mesh {}", request.mesh_path.display()))?;
    if mesh.is_empty() {
        anyhow::bail!("Mesh {} has no faces", request.mesh_path.display());
    }

    let cloud = match &request.cloud_path {
        Some(path) => match reconview_io::read_point_cloud(path) {
            Ok(cloud) if cloud.is_empty() => {
                log::warn!("Point cloud {} is empty", path.display());
                None
            }
            Ok(cloud) => Some(cloud),
            Err(e) => {
                log::warn!("Ignoring point cloud {}: {}", path.display(), e);
                None
            }
        },
        None => {
            log::info!("No source point cloud for '{}'", request.key);
            None
        }
    };

    let metrics = match MetricsReport::compute(&request.key, &mesh, cloud.as_ref()) {
        Ok(report) => Some(report),
        Err(e) => {
            log::warn!("Metrics unavailable for '{}': {}", request.key, e);
            None
        }
    };

    Ok(LoadedModel {
        key: request.key.clone(),
        mesh,
        cloud,
        metrics,
        elapsed: start.elapsed(),
    })
}

/// A worker thread serving load requests in order
pub struct Loader {
    requests: flume::Sender<LoadRequest>,
    outcomes: flume::Receiver<LoadOutcome>,
}

impl Loader {
    /// The worker exits once the `Loader` is dropped
    pub fn spawn() -> Result<Self> {
        let (request_tx, request_rx) = flume::unbounded::<LoadRequest>();
        let (outcome_tx, outcome_rx) = flume::unbounded::<LoadOutcome>();

        thread::Builder::new()
            .name("reconview-loader".to_string())
            .spawn(move || {
                for request in request_rx.iter() {
                    log::info!("Loading '{}' from {}", request.key, request.mesh_path.display());
                    let outcome = match load_model(&request) {
                        Ok(model) => {
                            log::info!(
                                "Loaded '{}' ({} vertices, {} triangles) in {:.2?}",
                                model.key,
                                model.mesh.vertex_count(),
                                model.mesh.face_count(),
                                model.elapsed
                            );
                            LoadOutcome::Loaded(Box::new(model))
                        }
                        Err(e) => LoadOutcome::Failed {
                            key: request.key.clone(),
                            error: format!("{:#}", e),
                        },
                    };
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
                log::debug!("Loader thread exiting");
            })
            .context("Failed to spawn loader thread")?;

        Ok(Self {
            requests: request_tx,
            outcomes: outcome_rx,
        })
    }

    pub fn request(&self, request: LoadRequest) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|_| anyhow::anyhow!("Loader thread has stopped"))
    }

    /// Next finished load, if any, without blocking
    pub fn poll(&self) -> Option<LoadOutcome> {
        self.outcomes.try_recv().ok()
    }

    /// Block up to `timeout` for the next finished load
    pub fn wait(&self, timeout: Duration) -> Option<LoadOutcome> {
        self.outcomes.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconview_io::write_mesh;

    fn write_tetrahedron(path: &std::path::Path) {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        );
        write_mesh(&mesh, path).unwrap();
    }

    #[test]
    fn test_load_with_cloud() {
        let dir = tempfile::tempdir().unwrap();
        let mesh_path = dir.path().join("poisson.obj");
        let cloud_path = dir.path().join("sphere_points.xyz");
        write_tetrahedron(&mesh_path);
        std::fs::write(&cloud_path, "0 0 0\n1 0 0\n0.2 0.2 0.2\n").unwrap();

        let model = load_model(&LoadRequest {
            key: "poisson".to_string(),
            mesh_path,
            cloud_path: Some(cloud_path),
        })
        .unwrap();

        assert_eq!(model.mesh.face_count(), 4);
        assert_eq!(model.cloud.as_ref().map(|c| c.len()), Some(3));
        let metrics = model.metrics.unwrap();
        assert_eq!(metrics.holes, 0);
        assert_eq!(metrics.cloud_points, Some(3));
        assert!(metrics.mean_error.is_some());
    }

    #[test]
    fn test_missing_cloud_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mesh_path = dir.path().join("Bunny500.obj");
        write_tetrahedron(&mesh_path);

        let model = load_model(&LoadRequest {
            key: "Bunny500".to_string(),
            mesh_path,
            cloud_path: None,
        })
        .unwrap();
        assert!(model.cloud.is_none());
        assert!(model.metrics.unwrap().mean_error.is_none());
    }

    #[test]
    fn test_unreadable_cloud_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mesh_path = dir.path().join("poisson.obj");
        let cloud_path = dir.path().join("poisson.xyz");
        write_tetrahedron(&mesh_path);
        std::fs::write(&cloud_path, "1 2 3\nnot numbers here\n").unwrap();

        let model = load_model(&LoadRequest {
            key: "poisson".to_string(),
            mesh_path,
            cloud_path: Some(cloud_path),
        })
        .unwrap();
        assert!(model.cloud.is_none());
    }

    #[test]
    fn test_missing_mesh_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model(&LoadRequest {
            key: "marching_cubes".to_string(),
            mesh_path: dir.path().join("marching_cubes.obj"),
            cloud_path: None,
        })
        .unwrap_err();
        assert!(format!("{:#}", err).contains("marching_cubes.obj"));
    }

    #[test]
    fn test_worker_reports_outcomes_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mesh_path = dir.path().join("poisson.obj");
        write_tetrahedron(&mesh_path);

        let loader = Loader::spawn().unwrap();
        loader
            .request(LoadRequest {
                key: "missing".to_string(),
                mesh_path: dir.path().join("missing.obj"),
                cloud_path: None,
            })
            .unwrap();
        loader
            .request(LoadRequest {
                key: "poisson".to_string(),
                mesh_path,
                cloud_path: None,
            })
            .unwrap();

        let first = loader.wait(Duration::from_secs(10)).unwrap();
        assert!(matches!(first, LoadOutcome::Failed { ref key, .. } if key == "missing"));

        let second = loader.wait(Duration::from_secs(10)).unwrap();
        assert_eq!(second.key(), "poisson");
        assert!(matches!(second, LoadOutcome::Loaded(_)));

        assert!(loader.poll().is_none());
    }
}
