//! Per-frame asset streams and their alignment under one playback length

use crate::bbox::BoxRecord;
use crate::error::{Error, Result};
use crate::frame_index::FrameIndex;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Name under which the point-cloud stream is reported
pub const POINT_CLOUD_STREAM: &str = "pointcloud";

/// Name under which the box frames are reported
pub const BOX_STREAM: &str = "boxes";

/// One point-cloud stream plus any number of named image streams.
///
/// Assets are opaque to the player; they are decoded by the loader before
/// playback starts. Every stream is non-empty.
#[derive(Debug, Clone)]
pub struct StreamSet<P, I> {
    point_clouds: Vec<P>,
    images: Vec<(String, Vec<I>)>,
}

impl<P, I> StreamSet<P, I> {
    pub fn new(point_clouds: Vec<P>) -> Result<Self> {
        if point_clouds.is_empty() {
            return Err(Error::EmptyInput("point-cloud stream has no frames".to_string()));
        }
        Ok(Self {
            point_clouds,
            images: Vec::new(),
        })
    }

    /// Add a named image stream (one per camera)
    pub fn with_images(mut self, name: impl Into<String>, frames: Vec<I>) -> Result<Self> {
        let name = name.into();
        if frames.is_empty() {
            return Err(Error::EmptyInput(format!("image stream '{name}' has no frames")));
        }
        if name == POINT_CLOUD_STREAM || name == BOX_STREAM || self.images.iter().any(|(n, _)| *n == name) {
            return Err(Error::InvalidData(format!("duplicate stream name '{name}'")));
        }
        self.images.push((name, frames));
        Ok(self)
    }

    pub fn point_clouds(&self) -> &[P] {
        &self.point_clouds
    }

    pub fn image_stream_names(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(|(name, _)| name.as_str())
    }

    pub fn image_stream(&self, name: &str) -> Option<&[I]> {
        self.images
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, frames)| frames.as_slice())
    }

    /// `(name, length)` for every asset stream
    pub fn lengths(&self) -> Vec<(String, usize)> {
        std::iter::once((POINT_CLOUD_STREAM.to_string(), self.point_clouds.len()))
            .chain(self.images.iter().map(|(n, f)| (n.clone(), f.len())))
            .collect()
    }
}

/// What to do when streams disagree on their frame count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
    /// Play only the frames every stream has; log a warning.
    #[default]
    Shortest,
    /// Refuse to play.
    Strict,
}

/// Streams and box frames aligned under one playback length.
///
/// Every accessor rejects indices `>= len()`, so a single index drives all
/// streams in lockstep.
#[derive(Debug, Clone)]
pub struct Timeline<P, I> {
    frames: FrameIndex,
    streams: StreamSet<P, I>,
    len: usize,
}

/// Align box frames with the asset streams according to `policy`.
pub fn align<P, I>(frames: FrameIndex, streams: StreamSet<P, I>, policy: LengthPolicy) -> Result<Timeline<P, I>> {
    let mut lengths = streams.lengths();
    lengths.push((BOX_STREAM.to_string(), frames.len()));

    let playable = lengths.iter().map(|(_, len)| *len).min().unwrap_or(0);
    if playable == 0 {
        return Err(Error::EmptyInput("no frames to play".to_string()));
    }

    if lengths.iter().any(|(_, len)| *len != playable) {
        let mismatch = Error::StreamLengthMismatch { lengths, playable };
        match policy {
            LengthPolicy::Strict => return Err(mismatch),
            LengthPolicy::Shortest => warn!("{mismatch}"),
        }
    }

    info!(
        "Aligned {} image stream(s) with point clouds and boxes: {} playable frames",
        streams.images.len(),
        playable
    );

    Ok(Timeline {
        frames,
        streams,
        len: playable,
    })
}

impl<P, I> Timeline<P, I> {
    /// Playback length
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(Error::OutOfRangeFrame { index, len: self.len })
        }
    }

    pub fn point_cloud(&self, index: usize) -> Result<&P> {
        self.check(index)?;
        Ok(&self.streams.point_clouds[index])
    }

    pub fn image(&self, stream: &str, index: usize) -> Result<&I> {
        self.check(index)?;
        let frames = self
            .streams
            .image_stream(stream)
            .ok_or_else(|| Error::InvalidData(format!("unknown image stream '{stream}'")))?;
        Ok(&frames[index])
    }

    pub fn boxes(&self, index: usize) -> Result<&[BoxRecord]> {
        self.check(index)?;
        self.frames.boxes(index)
    }

    pub fn image_stream_names(&self) -> impl Iterator<Item = &str> {
        self.streams.image_stream_names()
    }

    pub fn frames(&self) -> &FrameIndex {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Point3d, Vector3d};

    fn frames(count: i64) -> FrameIndex {
        let records = (0..count).map(|i| {
            BoxRecord::new(i, Point3d::origin(), Vector3d::new(1.0, 1.0, 1.0), 0.0)
        });
        FrameIndex::build(records).unwrap()
    }

    #[test]
    fn test_equal_lengths_align_cleanly() {
        let streams = StreamSet::new(vec!["p0", "p1", "p2"])
            .unwrap()
            .with_images("camera1", vec![10, 11, 12])
            .unwrap();
        let timeline = align(frames(3), streams, LengthPolicy::Strict).unwrap();

        assert_eq!(timeline.len(), 3);
        assert_eq!(*timeline.point_cloud(2).unwrap(), "p2");
        assert_eq!(*timeline.image("camera1", 1).unwrap(), 11);
        assert_eq!(timeline.boxes(0).unwrap().len(), 1);
    }

    #[test]
    fn test_shortest_policy_clamps() {
        let streams = StreamSet::new(vec![0, 1, 2, 3, 4])
            .unwrap()
            .with_images("camera1", vec!['a', 'b', 'c', 'd'])
            .unwrap();
        let timeline = align(frames(5), streams, LengthPolicy::Shortest).unwrap();

        assert_eq!(timeline.len(), 4);
        assert!(timeline.point_cloud(3).is_ok());
        assert!(matches!(
            timeline.point_cloud(4),
            Err(Error::OutOfRangeFrame { index: 4, len: 4 })
        ));
    }

    #[test]
    fn test_box_frames_take_part_in_clamping() {
        let streams: StreamSet<u8, u8> = StreamSet::new(vec![0, 1, 2, 3]).unwrap();
        let timeline = align(frames(2), streams, LengthPolicy::Shortest).unwrap();
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_strict_policy_reports_mismatch() {
        let streams = StreamSet::new(vec![0, 1, 2])
            .unwrap()
            .with_images("camera1", vec![0, 1])
            .unwrap();
        match align(frames(3), streams, LengthPolicy::Strict) {
            Err(Error::StreamLengthMismatch { lengths, playable }) => {
                assert_eq!(playable, 2);
                assert!(lengths.contains(&("camera1".to_string(), 2)));
                assert!(lengths.contains(&(BOX_STREAM.to_string(), 3)));
            }
            other => panic!("expected mismatch, got {:?}", other.map(|t| t.len())),
        }
    }

    #[test]
    fn test_empty_streams_rejected() {
        assert!(matches!(StreamSet::<u8, u8>::new(Vec::new()), Err(Error::EmptyInput(_))));
        let streams = StreamSet::<u8, u8>::new(vec![1]).unwrap();
        assert!(matches!(streams.with_images("camera1", Vec::new()), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_duplicate_stream_names_rejected() {
        let streams = StreamSet::new(vec![1]).unwrap().with_images("front", vec![1]).unwrap();
        assert!(matches!(streams.with_images("front", vec![2]), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_unknown_image_stream() {
        let streams: StreamSet<u8, u8> = StreamSet::new(vec![1]).unwrap();
        let timeline = align(frames(1), streams, LengthPolicy::Strict).unwrap();
        assert!(timeline.image("rear", 0).is_err());
    }
}
