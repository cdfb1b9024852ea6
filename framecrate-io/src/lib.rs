//! Loaders for framecrate
//!
//! Everything here runs once, eagerly and on one thread, before playback
//! starts:
//! - natural-order listing of per-frame files
//! - PCD point clouds (ASCII and binary)
//! - camera images decoded to RGBA8
//! - box annotations from CSV rows or nested JSON "figures"

pub mod files;
pub mod pcd;
pub mod images;
pub mod box_csv;
pub mod figures_json;

pub use files::{list_files, natural_cmp};
pub use pcd::{read_pcd, load_point_clouds, PcdHeader, PcdDataFormat};
pub use images::{load_image, load_images, ImageFrame};
pub use box_csv::{BoxCsvReader, BoxCsvSchema, BoxColumn, Delimiter};
pub use figures_json::FiguresJsonReader;

use framecrate_core::{BoxRecord, Error, MalformedRecord, Result};
use log::{info, warn};
use std::path::Path;

/// Box records read from one annotation file, plus the rows that were dropped
#[derive(Debug, Clone, Default)]
pub struct BoxReadReport {
    pub records: Vec<BoxRecord>,
    pub malformed: Vec<MalformedRecord>,
}

impl BoxReadReport {
    pub(crate) fn push_malformed(&mut self, record: MalformedRecord) {
        warn!("Skipping box row: {}", record);
        self.malformed.push(record);
    }
}

/// Trait for box annotation readers
pub trait BoxReader {
    /// Read every box record from the given path
    fn read_boxes(&self, path: &Path) -> Result<BoxReadReport>;

    /// Check if this reader handles the given file
    fn can_read(&self, path: &Path) -> bool;

    /// Get the format name this reader handles
    fn format_name(&self) -> &'static str;
}

/// Read box annotations, picking the reader by file extension
pub fn read_boxes<P: AsRef<Path>>(path: P) -> Result<BoxReadReport> {
    let path = path.as_ref();
    let readers: [&dyn BoxReader; 2] = [&BoxCsvReader, &FiguresJsonReader];

    let reader = readers
        .into_iter()
        .find(|r| r.can_read(path))
        .ok_or_else(|| Error::UnsupportedFormat(format!("Unsupported box annotation format: {:?}", path.extension())))?;

    let report = reader.read_boxes(path)?;
    info!(
        "Read {} box records from {} ({}, {} malformed)",
        report.records.len(),
        path.display(),
        reader.format_name(),
        report.malformed.len()
    );
    Ok(report)
}
