//! OBJ format support

use crate::{fan_triangulate, IoError, MeshReader, MeshWriter, PointCloudReader};
use obj::ObjData;
use reconview_core::{Point3f, PointCloud, Result, TriangleMesh};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub struct ObjReader;
pub struct ObjWriter;

impl ObjReader {
    /// Parse OBJ data from any reader into a triangle mesh.
    pub fn read_mesh_from<R: Read>(input: R) -> Result<TriangleMesh> {
        let data = ObjData::load_buf(input).map_err(IoError::from)?;

        let vertices: Vec<Point3f> = data
            .position
            .iter()
            .map(|p| Point3f::new(p[0], p[1], p[2]))
            .collect();

        let mut faces = Vec::new();
        let mut skipped = 0usize;
        for object in &data.objects {
            for group in &object.groups {
                for poly in &group.polys {
                    let corners: Vec<usize> = poly.0.iter().map(|tuple| tuple.0).collect();
                    if corners.len() < 3 {
                        skipped += 1;
                        continue;
                    }
                    faces.extend(fan_triangulate(&corners));
                }
            }
        }

        if skipped > 0 {
            log::warn!("Skipped {} OBJ polygons with fewer than three corners", skipped);
        }

        Ok(TriangleMesh::from_vertices_and_faces(vertices, faces))
    }
}

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let file = File::open(path)?;
        Self::read_mesh_from(BufReader::new(file))
    }
}

impl PointCloudReader for ObjReader {
    /// Only the `v` records are used; faces are ignored.
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>> {
        let mesh = Self::read_mesh(path)?;
        Ok(PointCloud::from_points(mesh.vertices))
    }
}

impl ObjWriter {
    /// Serialize a mesh as OBJ text into any writer.
    pub fn write_mesh_to<W: Write>(mesh: &TriangleMesh, mut out: W) -> Result<()> {
        writeln!(out, "# reconview export")?;
        for v in &mesh.vertices {
            writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
        }
        if let Some(normals) = &mesh.normals {
            for n in normals {
                writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
            }
        }
        let with_normals = mesh.normals.is_some();
        for face in &mesh.faces {
            // OBJ indices are 1-based
            let [a, b, c] = face.map(|i| i + 1);
            if with_normals {
                writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
            } else {
                writeln!(out, "f {a} {b} {c}")?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let file = File::create(path)?;
        Self::write_mesh_to(mesh, BufWriter::new(file))
    }
}
