//! Camera image decoding

use framecrate_core::{Error, Result};
use log::{debug, info};
use std::path::Path;

/// A decoded RGBA8 image, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageFrame {
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::InvalidData(format!(
                "RGBA buffer has {} bytes, expected {} for {}x{}",
                pixels.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self { width, height, pixels })
    }

    /// RGBA value at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }
}

/// Decode one image file
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageFrame> {
    let path = path.as_ref();
    let decoded = image::open(path)
        .map_err(|e| Error::InvalidData(format!("{}: {}", path.display(), e)))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    debug!("Decoded {}x{} image {}", width, height, path.display());
    ImageFrame::from_rgba8(width, height, decoded.into_raw())
}

/// Decode an ordered image sequence
pub fn load_images<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ImageFrame>> {
    let frames = paths.iter().map(load_image).collect::<Result<Vec<_>>>()?;
    info!("Loaded {} image frames", frames.len());
    Ok(frames)
}
