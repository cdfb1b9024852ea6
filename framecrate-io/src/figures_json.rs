//! JSON "figures" annotation support
//!
//! Nested per-frame layout used by point-cloud labelling tools:
//!
//! ```json
//! {
//!   "frames": [
//!     { "index": 0,
//!       "figures": [
//!         { "objectKey": "car-1",
//!           "geometry": {
//!             "position":   { "x": 1.0, "y": 2.0, "z": 0.5 },
//!             "rotation":   { "x": 0.0, "y": 0.0, "z": 1.57 },
//!             "dimensions": { "x": 4.2, "y": 1.8, "z": 1.5 } } } ] } ]
//! }
//! ```
//!
//! `rotation.z` is the heading in radians and `dimensions` are full sizes.
//! Figures without a usable geometry are reported and skipped.

use crate::{BoxReadReport, BoxReader};
use framecrate_core::{BoxRecord, Error, MalformedRecord, Point3d, Result, Vector3d};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Annotation {
    #[serde(default)]
    frames: Vec<AnnotatedFrame>,
}

#[derive(Debug, Deserialize)]
struct AnnotatedFrame {
    index: i64,
    #[serde(default)]
    figures: Vec<Figure>,
}

#[derive(Debug, Deserialize)]
struct Figure {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    position: Xyz,
    #[serde(default)]
    rotation: Xyz,
    dimensions: Xyz,
}

#[derive(Debug, Default, Deserialize)]
struct Xyz {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    z: f64,
}

/// Reader for the nested JSON figures layout
pub struct FiguresJsonReader;

impl FiguresJsonReader {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<BoxReadReport> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    pub fn read_from<R: Read>(reader: R) -> Result<BoxReadReport> {
        let annotation: Annotation = serde_json::from_reader(reader)
            .map_err(|e| Error::InvalidData(format!("Invalid figures JSON: {}", e)))?;

        let mut report = BoxReadReport::default();
        let mut position = 0;
        for frame in annotation.frames {
            for figure in frame.figures {
                match figure.geometry {
                    Some(g) => report.records.push(BoxRecord::from_dimensions(
                        frame.index,
                        Point3d::new(g.position.x, g.position.y, g.position.z),
                        Vector3d::new(g.dimensions.x, g.dimensions.y, g.dimensions.z),
                        g.rotation.z,
                    )),
                    None => report.push_malformed(MalformedRecord::new(
                        position,
                        format!("figure in frame {} has no geometry", frame.index),
                    )),
                }
                position += 1;
            }
        }
        Ok(report)
    }
}

impl BoxReader for FiguresJsonReader {
    fn read_boxes(&self, path: &Path) -> Result<BoxReadReport> {
        Self::read(path)
    }

    fn can_read(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }

    fn format_name(&self) -> &'static str {
        "figures_json"
    }
}
