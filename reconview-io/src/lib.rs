//! I/O operations for point clouds and meshes
//!
//! This crate reads the reconstruction outputs (OBJ, PLY) and the raw input
//! point clouds (PLY, XYZ, vertex-only OBJ) that the viewer compares.

pub mod ply;
pub mod obj;
pub mod xyz;
pub mod error;

pub use error::*;

use reconview_core::{PointCloud, TriangleMesh, Result, Point3f};
use std::path::Path;

/// Trait for reading point clouds from files
pub trait PointCloudReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>>;
}

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(IoError::FileNotFound { path: path.display().to_string() }.into())
    }
}

/// Auto-detect format and read point cloud
pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>> {
    let path = path.as_ref();
    ensure_exists(path)?;
    match extension_of(path).as_deref() {
        Some("ply") => ply::PlyReader::read_point_cloud(path),
        Some("xyz") | Some("txt") | Some("csv") => xyz::XyzReader::read_point_cloud(path),
        Some("obj") => obj::ObjReader::read_point_cloud(path),
        _ => Err(reconview_core::Error::UnsupportedFormat(
            format!("Unsupported point cloud format: {:?}", path.extension())
        )),
    }
}

/// Auto-detect format and read mesh; vertex normals are always recomputed
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    ensure_exists(path)?;
    let mut mesh = match extension_of(path).as_deref() {
        Some("obj") => obj::ObjReader::read_mesh(path)?,
        Some("ply") => ply::PlyReader::read_mesh(path)?,
        _ => {
            return Err(reconview_core::Error::UnsupportedFormat(
                format!("Unsupported mesh format: {:?}", path.extension())
            ))
        }
    };
    mesh.validate()?;
    mesh.compute_vertex_normals();
    log::debug!(
        "Read mesh {}: {} vertices, {} faces",
        path.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

/// Auto-detect format and write mesh
pub fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match extension_of(path).as_deref() {
        Some("obj") => obj::ObjWriter::write_mesh(mesh, path),
        _ => Err(reconview_core::Error::UnsupportedFormat(
            format!("Unsupported mesh output format: {:?}", path.extension())
        )),
    }
}

/// Split a polygon into a triangle fan around its first corner.
pub(crate) fn fan_triangulate(indices: &[usize]) -> impl Iterator<Item = [usize; 3]> + '_ {
    let first = indices.first().copied().unwrap_or_default();
    indices
        .windows(2)
        .skip(1)
        .map(move |w| [first, w[0], w[1]])
}
