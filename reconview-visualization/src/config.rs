//! Viewer configuration loaded from RON

use anyhow::{bail, Context, Result};
use reconview_core::rgb_from_hex;
use reconview_gpu::RenderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Initial camera placement and projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [10.0, 10.0, 10.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// Everything the viewer reads at startup.
///
/// Colours are `0xRRGGBB` integers; RON accepts hex literals directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory holding `<key>.obj` meshes and their source clouds
    pub assets_dir: PathBuf,
    pub initial_selection: String,
    pub window_size: [u32; 2],
    pub background: u32,
    pub mesh_color: u32,
    pub wireframe_color: u32,
    pub point_color: u32,
    /// Point sprite diameter in pixels
    pub point_size: f32,
    pub show_wireframe: bool,
    pub show_point_cloud: bool,
    /// Headlight shading instead of a flat unlit surface
    pub shaded: bool,
    pub msaa_samples: u32,
    /// Re-aim the camera at each newly loaded model
    pub frame_on_load: bool,
    pub camera: CameraConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            initial_selection: "poisson".to_string(),
            window_size: [1280, 800],
            background: 0xf5f5f5,
            mesh_color: 0xc4c4c4,
            wireframe_color: 0x000000,
            point_color: 0x1f77b4,
            point_size: 3.0,
            show_wireframe: true,
            show_point_cloud: false,
            shaded: false,
            msaa_samples: 4,
            frame_on_load: true,
            camera: CameraConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a RON document; missing fields take their defaults
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).context("Invalid viewer configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_ron_str(&text)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize viewer configuration")
    }

    pub fn validate(&self) -> Result<()> {
        let cam = &self.camera;
        if !(cam.near > 0.0 && cam.far > cam.near) {
            bail!("camera planes must satisfy 0 < near < far (near {}, far {})", cam.near, cam.far);
        }
        if !(cam.fov_deg > 0.0 && cam.fov_deg < 180.0) {
            bail!("camera fov_deg must be in (0, 180), got {}", cam.fov_deg);
        }
        if !(self.point_size > 0.0) {
            bail!("point_size must be positive, got {}", self.point_size);
        }
        if self.window_size[0] == 0 || self.window_size[1] == 0 {
            bail!("window_size must be non-zero");
        }
        for (name, colour) in [
            ("background", self.background),
            ("mesh_color", self.mesh_color),
            ("wireframe_color", self.wireframe_color),
            ("point_color", self.point_color),
        ] {
            if colour > 0xff_ffff {
                bail!("{} must be a 0xRRGGBB value, got {:#x}", name, colour);
            }
        }
        Ok(())
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            background: rgb_from_hex(self.background),
            mesh_color: rgb_from_hex(self.mesh_color),
            wireframe_color: rgb_from_hex(self.wireframe_color),
            point_color: rgb_from_hex(self.point_color),
            point_size: self.point_size,
            shaded: self.shaded,
            msaa_samples: self.msaa_samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.initial_selection, "poisson");
        assert_eq!(config.background, 0xf5f5f5);
        assert!(config.show_wireframe);
        assert!(!config.show_point_cloud);
        assert_eq!(config.camera.position, [10.0, 10.0, 10.0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let config = ViewerConfig::from_ron_str(
            "(assets_dir: \"public\", mesh_color: 0xff0000, camera: (fov_deg: 60.0))",
        )
        .unwrap();
        assert_eq!(config.assets_dir, PathBuf::from("public"));
        assert_eq!(config.mesh_color, 0xff0000);
        assert_eq!(config.camera.fov_deg, 60.0);
        assert_eq!(config.camera.far, 1000.0);
        assert_eq!(config.initial_selection, "poisson");
    }

    #[test]
    fn test_ron_round_trip() {
        let mut config = ViewerConfig::default();
        config.show_point_cloud = true;
        config.point_size = 5.0;
        let text = config.to_ron_string().unwrap();
        assert_eq!(ViewerConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ViewerConfig::from_ron_str("(camera: (near: 10.0, far: 1.0))").is_err());
        assert!(ViewerConfig::from_ron_str("(point_size: 0.0)").is_err());
        assert!(ViewerConfig::from_ron_str("(background: 0x1000000)").is_err());
        assert!(ViewerConfig::from_ron_str("(not a config").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(initial_selection: \"Bunny500\", show_wireframe: false)").unwrap();
        let config = ViewerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.initial_selection, "Bunny500");
        assert!(!config.show_wireframe);

        let missing = ViewerConfig::from_file("/nonexistent/reconview.ron").unwrap_err();
        assert!(missing.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_render_config_conversion() {
        let render = ViewerConfig::default().render_config();
        assert_eq!(render.wireframe_color, [0.0, 0.0, 0.0]);
        assert_eq!(render.msaa_samples, 4);
    }
}
