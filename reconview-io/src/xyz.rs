//! Plain XYZ point cloud format support
//!
//! One point per line, coordinates separated by whitespace, commas or
//! semicolons. Extra columns (normals, colors, intensity) are ignored.
//! Lines starting with `#` are comments and a single non-numeric header line
//! before the first point is skipped.

use crate::{IoError, PointCloudReader};
use reconview_core::{Point3f, PointCloud, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub struct XyzReader;

fn parse_coordinates(line: &str) -> Option<Point3f> {
    let mut fields = line
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|f| !f.is_empty());

    let x = fields.next()?.parse::<f32>().ok()?;
    let y = fields.next()?.parse::<f32>().ok()?;
    let z = fields.next()?.parse::<f32>().ok()?;
    Some(Point3f::new(x, y, z))
}

impl XyzReader {
    /// Parse XYZ text from any reader.
    pub fn read_point_cloud_from<R: Read>(input: R) -> Result<PointCloud<Point3f>> {
        let reader = BufReader::new(input);
        let mut cloud = PointCloud::new();
        let mut seen_content = false;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            match parse_coordinates(trimmed) {
                Some(point) => cloud.push(point),
                // A header is only tolerated before any data
                None if !seen_content => {
                    log::debug!("Skipping XYZ header line: {}", trimmed);
                }
                None => {
                    return Err(IoError::ParseError {
                        line: idx + 1,
                        message: format!("expected three coordinates, got '{}'", trimmed),
                    }
                    .into());
                }
            }
            seen_content = true;
        }

        Ok(cloud)
    }
}

impl PointCloudReader for XyzReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>> {
        Self::read_point_cloud_from(File::open(path)?)
    }
}
