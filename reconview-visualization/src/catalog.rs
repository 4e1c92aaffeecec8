//! The fixed set of reconstructions the viewer can show

use crate::loader::LoadRequest;
use std::path::{Path, PathBuf};

/// One selectable reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshOption {
    /// File stem under the assets directory
    pub key: &'static str,
    pub label: &'static str,
}

pub const SPHERE_OPTIONS: &[MeshOption] = &[
    MeshOption { key: "poisson", label: "Poisson Surface Reconstruction" },
    MeshOption { key: "marching_cubes", label: "Marching Cubes" },
    MeshOption { key: "marching_tetrahedra", label: "Marching Tetrahedra" },
    MeshOption { key: "poisson_simplified", label: "Poisson Surface Simplified" },
    MeshOption { key: "marching_cubes_simplified", label: "Marching Cubes Simplified" },
    MeshOption { key: "marching_tetrahedra_simplified", label: "Marching Tetrahedra Simplified" },
];

pub const BUNNY_OPTIONS: &[MeshOption] = &[
    MeshOption { key: "Bunny10m", label: "Bunny 10.000 points" },
    MeshOption { key: "Bunny5m", label: "Bunny 5.000 points" },
    MeshOption { key: "Bunny1m", label: "Bunny 1.000 points" },
    MeshOption { key: "Bunny500", label: "Bunny 500 points" },
];

/// The sample each reconstruction was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleGroup {
    Sphere,
    Bunny,
}

impl SampleGroup {
    pub const ALL: [SampleGroup; 2] = [SampleGroup::Sphere, SampleGroup::Bunny];

    pub fn options(&self) -> &'static [MeshOption] {
        match self {
            SampleGroup::Sphere => SPHERE_OPTIONS,
            SampleGroup::Bunny => BUNNY_OPTIONS,
        }
    }

    /// Selector caption
    pub fn title(&self) -> &'static str {
        match self {
            SampleGroup::Sphere => "Escull una esfera",
            SampleGroup::Bunny => "Escull un conill",
        }
    }

    /// File stem of the cloud shared by the whole group
    pub fn cloud_stem(&self) -> &'static str {
        match self {
            SampleGroup::Sphere => "sphere_points",
            SampleGroup::Bunny => "bunny_points",
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.options().iter().any(|o| o.key == key)
    }
}

/// Look up the group and option for `key`
pub fn find(key: &str) -> Option<(SampleGroup, &'static MeshOption)> {
    SampleGroup::ALL.iter().find_map(|&group| {
        group
            .options()
            .iter()
            .find(|o| o.key == key)
            .map(|option| (group, option))
    })
}

pub fn is_known(key: &str) -> bool {
    find(key).is_some()
}

/// Resolves catalog keys to files under an assets directory
#[derive(Debug, Clone)]
pub struct Catalog {
    assets_dir: PathBuf,
}

impl Catalog {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// `<assets>/<key>.obj`, whether or not it exists
    pub fn mesh_path(&self, key: &str) -> PathBuf {
        self.assets_dir.join(format!("{}.obj", key))
    }

    /// Candidate cloud files for `key`, most specific first
    pub fn cloud_candidates(&self, key: &str) -> Vec<PathBuf> {
        let mut candidates = vec![
            self.assets_dir.join(format!("{}.ply", key)),
            self.assets_dir.join(format!("{}.xyz", key)),
        ];
        if let Some((group, _)) = find(key) {
            candidates.push(self.assets_dir.join(format!("{}.ply", group.cloud_stem())));
            candidates.push(self.assets_dir.join(format!("{}.xyz", group.cloud_stem())));
        }
        candidates
    }

    /// First existing cloud file for `key`
    pub fn cloud_path(&self, key: &str) -> Option<PathBuf> {
        self.cloud_candidates(key).into_iter().find(|p| p.is_file())
    }

    /// Build a load request for a catalog key; unknown keys yield `None`
    pub fn request(&self, key: &str) -> Option<LoadRequest> {
        if !is_known(key) {
            return None;
        }
        Some(LoadRequest {
            key: key.to_string(),
            mesh_path: self.mesh_path(key),
            cloud_path: self.cloud_path(key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_and_labels() {
        assert_eq!(SPHERE_OPTIONS.len(), 6);
        assert_eq!(BUNNY_OPTIONS.len(), 4);
        assert_eq!(SampleGroup::Sphere.title(), "Escull una esfera");
        assert_eq!(SampleGroup::Bunny.title(), "Escull un conill");

        let (group, option) = find("Bunny10m").unwrap();
        assert_eq!(group, SampleGroup::Bunny);
        assert_eq!(option.label, "Bunny 10.000 points");

        let (group, _) = find("marching_tetrahedra_simplified").unwrap();
        assert_eq!(group, SampleGroup::Sphere);
    }

    #[test]
    fn test_keys_are_unique_across_groups() {
        let mut keys: Vec<_> = SPHERE_OPTIONS.iter().chain(BUNNY_OPTIONS).map(|o| o.key).collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[test]
    fn test_unknown_key() {
        assert!(find("teapot").is_none());
        assert!(!is_known("teapot"));
        assert!(Catalog::new("assets").request("teapot").is_none());
    }

    #[test]
    fn test_mesh_path() {
        let catalog = Catalog::new("public");
        assert_eq!(catalog.mesh_path("poisson"), PathBuf::from("public/poisson.obj"));
    }

    #[test]
    fn test_cloud_lookup_order() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(dir.path());
        assert!(catalog.cloud_path("poisson").is_none());

        std::fs::write(dir.path().join("sphere_points.xyz"), "0 0 0\n").unwrap();
        assert_eq!(catalog.cloud_path("poisson"), Some(dir.path().join("sphere_points.xyz")));

        std::fs::write(dir.path().join("sphere_points.ply"), "").unwrap();
        assert_eq!(catalog.cloud_path("poisson"), Some(dir.path().join("sphere_points.ply")));

        std::fs::write(dir.path().join("poisson.xyz"), "0 0 0\n").unwrap();
        assert_eq!(catalog.cloud_path("poisson"), Some(dir.path().join("poisson.xyz")));

        // The sphere cloud never serves a bunny key
        assert!(catalog.cloud_path("Bunny500").is_none());
    }

    #[test]
    fn test_request_without_cloud() {
        let dir = tempfile::tempdir().unwrap();
        let request = Catalog::new(dir.path()).request("Bunny1m").unwrap();
        assert_eq!(request.key, "Bunny1m");
        assert_eq!(request.mesh_path, dir.path().join("Bunny1m.obj"));
        assert!(request.cloud_path.is_none());
    }
}
