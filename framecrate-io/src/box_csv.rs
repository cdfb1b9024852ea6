//! CSV box annotation support
//!
//! One row per box: `frame_id,x,y,z,dx,dy,dz,heading`, optionally with a
//! `bbox_id` column and any number of ignored extra columns. `dx,dy,dz` are
//! full box sizes; `heading` is the yaw in radians.
//! - Delimiter auto-detection (comma, tab, semicolon, space)
//! - Header aliases (`cx`, `length`, `yaw`, ...)
//! - Headerless files in the fixed column order, with or without `bbox_id`
//!
//! A row that does not parse is reported and skipped; the rest of the file
//! still loads.

use crate::{BoxReadReport, BoxReader};
use framecrate_core::{BoxRecord, Error, MalformedRecord, Point3d, Result, Vector3d};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Supported delimiters for box CSV files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
    Semicolon,
    Space,
}

impl Delimiter {
    /// Get the character representation of the delimiter
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Semicolon => ';',
            Delimiter::Space => ' ',
        }
    }

    /// Detect delimiter from a line of text
    pub fn detect_from_line(line: &str) -> Option<Self> {
        let counts = [
            (line.matches(',').count(), Delimiter::Comma),
            (line.matches('\t').count(), Delimiter::Tab),
            (line.matches(';').count(), Delimiter::Semicolon),
            (line.trim().matches(' ').count(), Delimiter::Space),
        ];

        // first maximum wins, so "1, 2, 3" is comma separated
        counts
            .iter()
            .fold(None, |best: Option<(usize, Delimiter)>, &(count, d)| match best {
                Some((c, _)) if c >= count => best,
                _ if count > 0 => Some((count, d)),
                _ => best,
            })
            .map(|(_, d)| d)
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Space => line.split_whitespace().collect(),
            d => line.split(d.as_char()).map(|s| s.trim()).collect(),
        }
    }
}

/// Column types that can appear in a box CSV file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxColumn {
    FrameId,
    BoxId,
    X,
    Y,
    Z,
    Dx,
    Dy,
    Dz,
    Heading,
    Unknown,
}

const REQUIRED: [BoxColumn; 8] = [
    BoxColumn::FrameId,
    BoxColumn::X,
    BoxColumn::Y,
    BoxColumn::Z,
    BoxColumn::Dx,
    BoxColumn::Dy,
    BoxColumn::Dz,
    BoxColumn::Heading,
];

impl BoxColumn {
    /// Parse column type from header name
    pub fn from_header(header: &str) -> Self {
        let lower = header.trim().to_lowercase();
        match lower.as_str() {
            "frame_id" | "frame" | "frame_index" | "frameid" => BoxColumn::FrameId,
            "bbox_id" | "box_id" | "id" | "track_id" => BoxColumn::BoxId,
            "x" | "cx" | "center_x" => BoxColumn::X,
            "y" | "cy" | "center_y" => BoxColumn::Y,
            "z" | "cz" | "center_z" => BoxColumn::Z,
            "dx" | "length" | "size_x" => BoxColumn::Dx,
            "dy" | "width" | "size_y" => BoxColumn::Dy,
            "dz" | "height" | "size_z" => BoxColumn::Dz,
            "heading" | "yaw" | "rotation_z" | "rot_z" => BoxColumn::Heading,
            _ => BoxColumn::Unknown,
        }
    }
}

/// Schema definition for parsing box CSV files
#[derive(Debug, Clone, PartialEq)]
pub struct BoxCsvSchema {
    pub columns: Vec<BoxColumn>,
    pub has_header: bool,
    pub delimiter: Delimiter,
}

/// Column positions of the required fields, resolved once per file
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    frame_id: usize,
    center: [usize; 3],
    size: [usize; 3],
    heading: usize,
}

impl BoxCsvSchema {
    /// Create a new schema
    pub fn new(columns: Vec<BoxColumn>, has_header: bool, delimiter: Delimiter) -> Self {
        Self {
            columns,
            has_header,
            delimiter,
        }
    }

    /// Detect the schema from the first non-empty line of a file
    pub fn detect(first_line: &str) -> Result<Self> {
        let delimiter = Delimiter::detect_from_line(first_line)
            .ok_or_else(|| Error::InvalidData("Could not detect delimiter".to_string()))?;
        let parts = delimiter.split(first_line.trim());

        let has_header = parts.iter().any(|p| p.parse::<f64>().is_err());
        let columns = if has_header {
            parts.iter().map(|h| BoxColumn::from_header(h)).collect()
        } else {
            Self::positional_columns(parts.len())?
        };

        let schema = Self::new(columns, has_header, delimiter);
        schema.column_map()?;
        Ok(schema)
    }

    fn positional_columns(count: usize) -> Result<Vec<BoxColumn>> {
        use BoxColumn::*;
        match count {
            8 => Ok(vec![FrameId, X, Y, Z, Dx, Dy, Dz, Heading]),
            9 => Ok(vec![FrameId, BoxId, X, Y, Z, Dx, Dy, Dz, Heading]),
            n => Err(Error::InvalidData(format!(
                "Headerless box CSV must have 8 or 9 columns, found {}",
                n
            ))),
        }
    }

    fn column_map(&self) -> Result<ColumnMap> {
        let find = |column: BoxColumn| {
            self.columns.iter().position(|c| *c == column).ok_or_else(|| {
                Error::InvalidData(format!("Box CSV is missing required column {:?}", column))
            })
        };
        for column in REQUIRED {
            find(column)?;
        }
        Ok(ColumnMap {
            frame_id: find(BoxColumn::FrameId)?,
            center: [find(BoxColumn::X)?, find(BoxColumn::Y)?, find(BoxColumn::Z)?],
            size: [find(BoxColumn::Dx)?, find(BoxColumn::Dy)?, find(BoxColumn::Dz)?],
            heading: find(BoxColumn::Heading)?,
        })
    }
}

/// Box CSV reader implementation
pub struct BoxCsvReader;

impl BoxCsvReader {
    /// Read boxes from a file, detecting the schema
    pub fn read<P: AsRef<Path>>(path: P) -> Result<BoxReadReport> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    /// Read boxes from any buffered source
    pub fn read_from<R: BufRead>(reader: R) -> Result<BoxReadReport> {
        let mut lines = reader
            .lines()
            .enumerate()
            .filter(|(_, line)| line.as_ref().map(|l| !l.trim().is_empty()).unwrap_or(true));

        let mut report = BoxReadReport::default();
        let Some((first_number, first_line)) = lines.next() else {
            return Ok(report);
        };
        let first_line = first_line?;

        let schema = BoxCsvSchema::detect(&first_line)?;
        let map = schema.column_map()?;

        // data rows are numbered from 0, skipping the header and blank lines
        let mut row = 0;
        if !schema.has_header {
            Self::push_row(&mut report, row, first_number, &first_line, &schema, &map);
            row += 1;
        }
        for (number, line) in lines {
            Self::push_row(&mut report, row, number, &line?, &schema, &map);
            row += 1;
        }

        Ok(report)
    }

    fn push_row(
        report: &mut BoxReadReport,
        row: usize,
        line_index: usize,
        line: &str,
        schema: &BoxCsvSchema,
        map: &ColumnMap,
    ) {
        match Self::parse_row(line, schema, map) {
            Ok(record) => report.records.push(record),
            Err(reason) => report.push_malformed(MalformedRecord::new(row, format!("line {}: {}", line_index + 1, reason))),
        }
    }

    /// Parse a single row into a box record
    fn parse_row(line: &str, schema: &BoxCsvSchema, map: &ColumnMap) -> std::result::Result<BoxRecord, String> {
        let parts = schema.delimiter.split(line.trim());
        if parts.len() < schema.columns.len() {
            return Err(format!(
                "expected {} columns, found {}",
                schema.columns.len(),
                parts.len()
            ));
        }

        let number = |index: usize, name: &str| -> std::result::Result<f64, String> {
            parts[index]
                .parse::<f64>()
                .map_err(|_| format!("invalid {} value '{}'", name, parts[index]))
        };

        let frame_id = parse_frame_id(parts[map.frame_id])?;
        let center = Point3d::new(
            number(map.center[0], "x")?,
            number(map.center[1], "y")?,
            number(map.center[2], "z")?,
        );
        let size = Vector3d::new(
            number(map.size[0], "dx")?,
            number(map.size[1], "dy")?,
            number(map.size[2], "dz")?,
        );
        let heading = number(map.heading, "heading")?;

        Ok(BoxRecord::from_dimensions(frame_id, center, size, heading))
    }
}

/// Frame ids must be integers; `"3.0"` is accepted, `"3.5"` is not
fn parse_frame_id(raw: &str) -> std::result::Result<i64, String> {
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        _ => Err(format!("frame id '{}' is not an integer", raw)),
    }
}

impl BoxReader for BoxCsvReader {
    fn read_boxes(&self, path: &Path) -> Result<BoxReadReport> {
        Self::read(path)
    }

    fn can_read(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).as_deref(),
            Some("csv") | Some("tsv") | Some("txt")
        )
    }

    fn format_name(&self) -> &'static str {
        "box_csv"
    }
}
