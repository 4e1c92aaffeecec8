//! Connectivity measures: valence, boundary edges and holes

use reconview_core::TriangleMesh;
use std::collections::HashMap;

/// Minimal union-find over vertex indices
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TopologyStats {
    /// Mean number of edge-neighbours over vertices referenced by a face
    pub mean_valence: f32,
    /// Edges used by exactly one face
    pub boundary_edges: usize,
    /// Edges shared by more than two faces
    pub non_manifold_edges: usize,
    /// Connected groups of boundary edges
    pub holes: usize,
}

impl TopologyStats {
    pub fn compute(mesh: &TriangleMesh) -> Self {
        let mut edge_faces: HashMap<(usize, usize), u32> = HashMap::with_capacity(mesh.face_count() * 3);
        for face in &mesh.faces {
            // A collapsed face has no area and bounds nothing
            if face[0] == face[1] || face[1] == face[2] || face[2] == face[0] {
                continue;
            }
            for (a, b) in [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
                let key = if a < b { (a, b) } else { (b, a) };
                *edge_faces.entry(key).or_insert(0) += 1;
            }
        }

        // Every undirected edge adds one neighbour to each endpoint
        let mut valence = vec![0u32; mesh.vertex_count()];
        for &(a, b) in edge_faces.keys() {
            valence[a] += 1;
            valence[b] += 1;
        }
        let connected: Vec<u32> = valence.into_iter().filter(|&v| v > 0).collect();
        let mean_valence = if connected.is_empty() {
            0.0
        } else {
            connected.iter().map(|&v| v as f64).sum::<f64>() as f32 / connected.len() as f32
        };

        let mut sets = DisjointSet::new(mesh.vertex_count());
        let mut boundary_vertices = Vec::new();
        let mut boundary_edges = 0;
        let mut non_manifold_edges = 0;
        for (&(a, b), &count) in &edge_faces {
            match count {
                1 => {
                    boundary_edges += 1;
                    sets.union(a, b);
                    boundary_vertices.push(a);
                    boundary_vertices.push(b);
                }
                2 => {}
                _ => non_manifold_edges += 1,
            }
        }

        boundary_vertices.sort_unstable();
        boundary_vertices.dedup();
        let mut roots: Vec<usize> = boundary_vertices.iter().map(|&v| sets.find(v)).collect();
        roots.sort_unstable();
        roots.dedup();

        Self {
            mean_valence,
            boundary_edges,
            non_manifold_edges,
            holes: roots.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconview_core::Point3f;

    fn tetrahedron() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.5, 1.0, 0.0),
                Point3f::new(0.5, 0.5, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
    }

    fn plane_grid(size: usize) -> TriangleMesh {
        let mut vertices = Vec::new();
        for y in 0..size {
            for x in 0..size {
                vertices.push(Point3f::new(x as f32, y as f32, 0.0));
            }
        }
        let mut faces = Vec::new();
        for y in 0..(size - 1) {
            for x in 0..(size - 1) {
                let tl = y * size + x;
                let tr = tl + 1;
                let bl = (y + 1) * size + x;
                let br = bl + 1;
                faces.push([tl, bl, tr]);
                faces.push([tr, bl, br]);
            }
        }
        TriangleMesh::from_vertices_and_faces(vertices, faces)
    }

    #[test]
    fn test_closed_tetrahedron_has_no_holes() {
        let stats = TopologyStats::compute(&tetrahedron());
        assert_eq!(stats.holes, 0);
        assert_eq!(stats.boundary_edges, 0);
        assert_eq!(stats.non_manifold_edges, 0);
        assert_eq!(stats.mean_valence, 3.0);
    }

    #[test]
    fn test_open_tetrahedron_has_one_hole() {
        let mut mesh = tetrahedron();
        mesh.faces.pop();
        let stats = TopologyStats::compute(&mesh);
        assert_eq!(stats.holes, 1);
        assert_eq!(stats.boundary_edges, 3);
    }

    #[test]
    fn test_grid_boundary() {
        let stats = TopologyStats::compute(&plane_grid(4));
        // A 4x4 vertex grid has 12 boundary edges and one outer loop
        assert_eq!(stats.boundary_edges, 12);
        assert_eq!(stats.holes, 1);
    }

    #[test]
    fn test_two_separate_openings() {
        // Two disjoint triangles: two independent boundary loops
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(5.0, 0.0, 0.0),
                Point3f::new(6.0, 0.0, 0.0),
                Point3f::new(5.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        );
        assert_eq!(TopologyStats::compute(&mesh).holes, 2);
    }

    #[test]
    fn test_isolated_vertices_ignored_for_valence() {
        let mut mesh = tetrahedron();
        mesh.add_vertex(Point3f::new(9.0, 9.0, 9.0));
        assert_eq!(TopologyStats::compute(&mesh).mean_valence, 3.0);
    }

    #[test]
    fn test_non_manifold_fin() {
        let mut mesh = tetrahedron();
        let extra = mesh.add_vertex(Point3f::new(0.5, -1.0, 0.5));
        // Third face on edge (0, 1)
        mesh.add_face([0, 1, extra]);
        let stats = TopologyStats::compute(&mesh);
        assert_eq!(stats.non_manifold_edges, 1);
    }

    #[test]
    fn test_collapsed_faces_do_not_count_as_incidences() {
        let mut closed = tetrahedron();
        closed.add_face([0, 0, 1]);
        let stats = TopologyStats::compute(&closed);
        assert_eq!(stats.non_manifold_edges, 0);
        assert_eq!(stats.boundary_edges, 0);
        assert_eq!(stats.holes, 0);

        let open = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 0, 1]],
        );
        let stats = TopologyStats::compute(&open);
        assert_eq!(stats.boundary_edges, 3);
        assert_eq!(stats.non_manifold_edges, 0);
        assert_eq!(stats.holes, 1);
    }
}
