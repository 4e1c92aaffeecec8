//! PLY format support

use crate::{fan_triangulate, MeshReader, PointCloudReader};
use reconview_core::{Error, Point3f, PointCloud, Result, TriangleMesh};
use ply_rs::{
    parser::Parser,
    ply::{DefaultElement, Ply, Property},
};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub struct PlyReader;

impl PlyReader {
    fn parse<R: Read>(input: R) -> Result<Ply<DefaultElement>> {
        let mut reader = BufReader::new(input);
        let parser = Parser::<DefaultElement>::new();
        Ok(parser.read_ply(&mut reader)?)
    }

    fn vertices(ply: &Ply<DefaultElement>) -> Result<Vec<Point3f>> {
        let Some(vertex_element) = ply.payload.get("vertex") else {
            return Ok(Vec::new());
        };

        vertex_element
            .iter()
            .map(|vertex| {
                let x = extract_property_value(vertex, "x")?;
                let y = extract_property_value(vertex, "y")?;
                let z = extract_property_value(vertex, "z")?;
                Ok(Point3f::new(x, y, z))
            })
            .collect()
    }

    /// Parse PLY data from any reader into a point cloud.
    pub fn read_point_cloud_from<R: Read>(input: R) -> Result<PointCloud<Point3f>> {
        let ply = Self::parse(input)?;
        Ok(PointCloud::from_points(Self::vertices(&ply)?))
    }

    /// Parse PLY data from any reader into a triangle mesh.
    pub fn read_mesh_from<R: Read>(input: R) -> Result<TriangleMesh> {
        let ply = Self::parse(input)?;
        let vertices = Self::vertices(&ply)?;

        let mut faces = Vec::new();
        if let Some(face_element) = ply.payload.get("face") {
            for face in face_element {
                let indices = extract_face_indices(face)?;
                faces.extend(fan_triangulate(&indices));
            }
        }

        Ok(TriangleMesh::from_vertices_and_faces(vertices, faces))
    }
}

impl PointCloudReader for PlyReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>> {
        Self::read_point_cloud_from(File::open(path)?)
    }
}

impl MeshReader for PlyReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        Self::read_mesh_from(File::open(path)?)
    }
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        _ => Err(Error::InvalidData(
            format!("Property '{}' not found or invalid type", name)
        )),
    }
}

/// Extract face indices from a PLY face element
fn extract_face_indices(element: &DefaultElement) -> Result<Vec<usize>> {
    match element.get("vertex_indices").or_else(|| element.get("vertex_index")) {
        Some(Property::ListInt(indices)) => {
            Ok(indices.iter().map(|&idx| idx as usize).collect())
        }
        Some(Property::ListUInt(indices)) => {
            Ok(indices.iter().map(|&idx| idx as usize).collect())
        }
        Some(Property::ListUShort(indices)) => {
            Ok(indices.iter().map(|&idx| idx as usize).collect())
        }
        Some(Property::ListUChar(indices)) => {
            Ok(indices.iter().map(|&idx| idx as usize).collect())
        }
        _ => Err(Error::InvalidData(
            "Face indices not found".to_string()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_PLY: &str = "ply
format ascii 1.0
comment unit square
element vertex 4
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
0 1 0
4 0 1 2 3
";

    #[test]
    fn test_ascii_point_cloud() {
        let cloud = PlyReader::read_point_cloud_from(SQUARE_PLY.as_bytes()).unwrap();
        assert_eq!(cloud.len(), 4);
        assert_eq!(cloud[2], Point3f::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_ascii_mesh_with_quad_face() {
        let mesh = PlyReader::read_mesh_from(SQUARE_PLY.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_missing_coordinate_is_error() {
        let src = "ply
format ascii 1.0
element vertex 1
property float x
property float y
end_header
0 0
";
        assert!(PlyReader::read_point_cloud_from(src.as_bytes()).is_err());
    }
}
