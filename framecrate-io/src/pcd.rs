//! PCD (Point Cloud Data) reading
//!
//! Supports the v0.7 header with ASCII and binary payloads. Only the x, y, z
//! fields are kept; any other field is skipped over.

use framecrate_core::{ColoredPoint3f, Error, Point3f, PointCloud, Result};
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Points reserved up front; larger clouds grow as they are read
const MAX_PREALLOCATED_POINTS: usize = 1 << 20;

/// Largest binary record accepted, in bytes
const MAX_RECORD_SIZE: usize = 1 << 16;

/// PCD data format variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcdDataFormat {
    Ascii,
    Binary,
    BinaryCompressed,
}

/// PCD field data types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcdFieldType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl PcdFieldType {
    fn parse(type_str: &str, size: usize) -> Result<Self> {
        match (type_str, size) {
            ("I", 1) => Ok(PcdFieldType::I8),
            ("I", 2) => Ok(PcdFieldType::I16),
            ("I", 4) => Ok(PcdFieldType::I32),
            ("U", 1) => Ok(PcdFieldType::U8),
            ("U", 2) => Ok(PcdFieldType::U16),
            ("U", 4) => Ok(PcdFieldType::U32),
            ("F", 4) => Ok(PcdFieldType::F32),
            ("F", 8) => Ok(PcdFieldType::F64),
            _ => Err(Error::InvalidData(format!(
                "Unknown field type/size combination: {}/{}",
                type_str, size
            ))),
        }
    }

    fn size(&self) -> usize {
        match self {
            PcdFieldType::I8 | PcdFieldType::U8 => 1,
            PcdFieldType::I16 | PcdFieldType::U16 => 2,
            PcdFieldType::I32 | PcdFieldType::U32 | PcdFieldType::F32 => 4,
            PcdFieldType::F64 => 8,
        }
    }

    fn decode_le(&self, bytes: &[u8]) -> f64 {
        match self {
            PcdFieldType::I8 => bytes[0] as i8 as f64,
            PcdFieldType::U8 => bytes[0] as f64,
            PcdFieldType::I16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64,
            PcdFieldType::U16 => u16::from_le_bytes([bytes[0], bytes[1]]) as f64,
            PcdFieldType::I32 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            PcdFieldType::U32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            PcdFieldType::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            PcdFieldType::F64 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&bytes[..8]);
                f64::from_le_bytes(buf)
            }
        }
    }
}

/// PCD field definition
#[derive(Debug, Clone)]
pub struct PcdField {
    pub name: String,
    pub field_type: PcdFieldType,
    pub count: usize,
}

/// PCD header information
#[derive(Debug, Clone)]
pub struct PcdHeader {
    pub version: String,
    pub fields: Vec<PcdField>,
    pub width: usize,
    pub height: usize,
    pub data_format: PcdDataFormat,
}

impl PcdHeader {
    /// `WIDTH * HEIGHT`; fails when the product overflows
    pub fn point_count(&self) -> Result<usize> {
        self.width.checked_mul(self.height).ok_or_else(|| {
            Error::InvalidData(format!(
                "WIDTH ({}) * HEIGHT ({}) overflows",
                self.width, self.height
            ))
        })
    }

    /// Value offset (in scalars) of a named field within one point
    fn value_offset(&self, name: &str) -> Result<(usize, PcdFieldType)> {
        let mut offset = 0;
        for field in &self.fields {
            if field.name == name {
                return field_at(field, offset);
            }
            offset += field.count;
        }
        Err(Error::InvalidData(format!("Missing {} field in PCD header", name)))
    }

    /// Byte offset of a named field within one binary record
    fn byte_offset(&self, name: &str) -> Result<(usize, PcdFieldType)> {
        let mut offset = 0;
        for field in &self.fields {
            if field.name == name {
                return field_at(field, offset);
            }
            offset += field.field_type.size() * field.count;
        }
        Err(Error::InvalidData(format!("Missing {} field in PCD header", name)))
    }

    fn record_size(&self) -> Result<usize> {
        let size = self
            .fields
            .iter()
            .try_fold(0usize, |total, f| {
                f.field_type.size().checked_mul(f.count).and_then(|bytes| total.checked_add(bytes))
            })
            .filter(|size| *size <= MAX_RECORD_SIZE)
            .ok_or_else(|| Error::InvalidData(format!("PCD record exceeds {} bytes", MAX_RECORD_SIZE)))?;
        Ok(size)
    }
}

fn field_at(field: &PcdField, offset: usize) -> Result<(usize, PcdFieldType)> {
    if field.count == 0 {
        return Err(Error::InvalidData(format!("PCD field {} has COUNT 0", field.name)));
    }
    Ok((offset, field.field_type))
}

/// Read a PCD file into a point cloud
pub fn read_pcd<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let header = read_header(&mut reader)?;
    read_points(&mut reader, &header)
}

/// Decode a sequence of PCD files, painting each cloud a uniform color
pub fn load_point_clouds<P: AsRef<Path>>(paths: &[P], color: [u8; 3]) -> Result<Vec<PointCloud<ColoredPoint3f>>> {
    let mut clouds = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let cloud = read_pcd(path).map_err(|e| Error::InvalidData(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded {} points from {}", cloud.len(), path.display());
        clouds.push(cloud.paint_uniform_color(color));
    }
    info!("Loaded {} point-cloud frames", clouds.len());
    Ok(clouds)
}

/// Read the PCD header up to and including the DATA line
pub fn read_header<R: BufRead>(reader: &mut R) -> Result<PcdHeader> {
    let mut version = None;
    let mut names: Vec<String> = Vec::new();
    let mut sizes: Vec<usize> = Vec::new();
    let mut types: Vec<String> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    let mut width = None;
    let mut height = None;
    let mut points = None;
    let data_format;

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(Error::InvalidData("Unexpected end of file in PCD header".to_string()));
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        let values = &parts[1..];
        match parts[0] {
            "VERSION" => version = values.first().map(|v| v.to_string()),
            "FIELDS" => names = values.iter().map(|v| v.to_string()).collect(),
            "SIZE" => sizes = parse_all(values, "SIZE")?,
            "TYPE" => types = values.iter().map(|v| v.to_string()).collect(),
            "COUNT" => counts = parse_all(values, "COUNT")?,
            "WIDTH" => width = Some(parse_one(values, "WIDTH")?),
            "HEIGHT" => height = Some(parse_one(values, "HEIGHT")?),
            "POINTS" => points = Some(parse_one(values, "POINTS")?),
            "DATA" => {
                data_format = match values.first().copied() {
                    Some("ascii") => PcdDataFormat::Ascii,
                    Some("binary") => PcdDataFormat::Binary,
                    Some("binary_compressed") => PcdDataFormat::BinaryCompressed,
                    other => {
                        return Err(Error::InvalidData(format!("Unknown PCD DATA format: {:?}", other)))
                    }
                };
                break;
            }
            // VIEWPOINT and unknown keys do not affect decoding
            _ => {}
        }
    }

    let version = version.ok_or_else(|| Error::InvalidData("Missing VERSION in PCD header".to_string()))?;
    let width = width.ok_or_else(|| Error::InvalidData("Missing WIDTH in PCD header".to_string()))?;
    let height = height.unwrap_or(1);

    if counts.is_empty() {
        counts = vec![1; names.len()];
    }
    if names.len() != sizes.len() || names.len() != types.len() || names.len() != counts.len() {
        return Err(Error::InvalidData(
            "Mismatch between FIELDS, SIZE, TYPE, and COUNT declarations".to_string(),
        ));
    }

    let mut fields = Vec::with_capacity(names.len());
    for (i, name) in names.into_iter().enumerate() {
        fields.push(PcdField {
            name,
            field_type: PcdFieldType::parse(&types[i], sizes[i])?,
            count: counts[i],
        });
    }

    for axis in ["x", "y", "z"] {
        if fields.iter().any(|f| f.name == axis && f.count == 0) {
            return Err(Error::InvalidData(format!("PCD field {} has COUNT 0", axis)));
        }
    }

    let header = PcdHeader {
        version,
        fields,
        width,
        height,
        data_format,
    };
    let point_count = header.point_count()?;
    if let Some(points) = points {
        if points != point_count {
            return Err(Error::InvalidData(format!(
                "POINTS ({}) doesn't match WIDTH * HEIGHT ({})",
                points, point_count
            )));
        }
    }

    Ok(header)
}

fn parse_one(values: &[&str], key: &str) -> Result<usize> {
    let value = values
        .first()
        .ok_or_else(|| Error::InvalidData(format!("Missing {} value", key)))?;
    value
        .parse::<usize>()
        .map_err(|_| Error::InvalidData(format!("Invalid {} value: {}", key, value)))
}

fn parse_all(values: &[&str], key: &str) -> Result<Vec<usize>> {
    values
        .iter()
        .map(|v| {
            v.parse::<usize>()
                .map_err(|_| Error::InvalidData(format!("Invalid {} value: {}", key, v)))
        })
        .collect()
}

/// Read point data based on header format
pub fn read_points<R: BufRead>(reader: &mut R, header: &PcdHeader) -> Result<PointCloud<Point3f>> {
    match header.data_format {
        PcdDataFormat::Ascii => read_ascii_points(reader, header),
        PcdDataFormat::Binary => read_binary_points(reader, header),
        PcdDataFormat::BinaryCompressed => Err(Error::UnsupportedFormat(
            "Binary compressed PCD format not supported".to_string(),
        )),
    }
}

fn read_ascii_points<R: BufRead>(reader: &mut R, header: &PcdHeader) -> Result<PointCloud<Point3f>> {
    let offsets = [header.value_offset("x")?, header.value_offset("y")?, header.value_offset("z")?];
    let point_count = header.point_count()?;
    let mut cloud = PointCloud::from_points(Vec::with_capacity(point_count.min(MAX_PREALLOCATED_POINTS)));

    let mut line = String::new();
    while cloud.len() < point_count {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(Error::InvalidData(format!(
                "PCD data ended after {} of {} points",
                cloud.len(),
                point_count
            )));
        }
        let values: Vec<&str> = line.split_whitespace().collect();
        if values.is_empty() {
            continue;
        }

        let mut xyz = [0.0f32; 3];
        for (axis, (offset, _)) in offsets.iter().enumerate() {
            let raw = values
                .get(*offset)
                .ok_or_else(|| Error::InvalidData("Not enough values in ASCII PCD line".to_string()))?;
            xyz[axis] = raw
                .parse::<f64>()
                .map_err(|_| Error::InvalidData(format!("Invalid coordinate value: {}", raw)))? as f32;
        }
        cloud.push(Point3f::new(xyz[0], xyz[1], xyz[2]));
    }

    Ok(cloud)
}

fn read_binary_points<R: Read>(reader: &mut R, header: &PcdHeader) -> Result<PointCloud<Point3f>> {
    let offsets = [header.byte_offset("x")?, header.byte_offset("y")?, header.byte_offset("z")?];
    let record_size = header.record_size()?;
    let point_count = header.point_count()?;
    let mut record = vec![0u8; record_size];
    let mut cloud = PointCloud::from_points(Vec::with_capacity(point_count.min(MAX_PREALLOCATED_POINTS)));

    for _ in 0..point_count {
        reader.read_exact(&mut record)?;
        let [x, y, z] = offsets.map(|(offset, field_type)| field_type.decode_le(&record[offset..]) as f32);
        cloud.push(Point3f::new(x, y, z));
    }

    Ok(cloud)
}
