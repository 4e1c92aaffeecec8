//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Convert a packed `0xRRGGBB` color into `[r, g, b]` in 0..1
pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(rgb_from_hex(0x000000), [0.0, 0.0, 0.0]);
        assert_eq!(rgb_from_hex(0xffffff), [1.0, 1.0, 1.0]);
        let grey = rgb_from_hex(0xc4c4c4);
        assert!((grey[0] - 196.0 / 255.0).abs() < 1e-6);
        assert_eq!(grey[0], grey[2]);
    }
}
