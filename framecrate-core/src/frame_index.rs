//! Grouping of box records into a dense, frame-indexed sequence

use crate::bbox::BoxRecord;
use crate::error::{Error, MalformedRecord, Result};
use log::{debug, warn};
use std::ops::Index;

/// Largest frame id accepted by [`FrameIndex::build`].
///
/// Frames are stored densely, so the id bounds the allocation. At ten frames
/// per second this covers about 19 days of recording.
pub const MAX_FRAME_ID: usize = (1 << 24) - 1;

/// Boxes that belong to one playback step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub boxes: Vec<BoxRecord>,
}

impl Frame {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            boxes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Dense sequence of frames `0..=max(frame_id)`.
///
/// Frames without any record own an empty box list. Records keep their input
/// order inside a frame.
#[derive(Debug, Clone, Default)]
pub struct FrameIndex {
    frames: Vec<Frame>,
    rejected: Vec<MalformedRecord>,
}

impl FrameIndex {
    /// Group `records` by frame id.
    ///
    /// Records with a negative frame id or invalid geometry are dropped and
    /// kept in [`FrameIndex::rejected`]; the rest of the batch continues.
    /// Fails with [`Error::EmptyInput`] when no usable record remains.
    pub fn build<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = BoxRecord>,
    {
        let mut accepted: Vec<(usize, BoxRecord)> = Vec::new();
        let mut rejected = Vec::new();

        for (position, record) in records.into_iter().enumerate() {
            match Self::check(&record) {
                Ok(frame_id) => accepted.push((frame_id, record)),
                Err(reason) => {
                    let malformed = MalformedRecord::new(position, reason);
                    warn!("Dropping box record: {}", malformed);
                    rejected.push(malformed);
                }
            }
        }

        let frame_count = match accepted.iter().map(|(id, _)| *id).max() {
            Some(max_id) => max_id + 1,
            None => {
                return Err(Error::EmptyInput(format!(
                    "no usable box records ({} rejected)",
                    rejected.len()
                )))
            }
        };

        let mut frames = allocate_frames(frame_count)?;
        for (frame_id, record) in accepted {
            frames[frame_id].boxes.push(record);
        }

        debug!(
            "Built frame index: {} frames, {} boxes, {} rejected",
            frames.len(),
            frames.iter().map(|f| f.boxes.len()).sum::<usize>(),
            rejected.len()
        );

        Ok(Self { frames, rejected })
    }

    /// Validate one record and return its frame slot
    fn check(record: &BoxRecord) -> std::result::Result<usize, String> {
        let frame_id = usize::try_from(record.frame_id)
            .map_err(|_| format!("frame id {} is not a valid frame index", record.frame_id))?;
        if frame_id > MAX_FRAME_ID {
            return Err(format!("frame id {} exceeds the limit of {}", frame_id, MAX_FRAME_ID));
        }
        record.validate()?;
        Ok(frame_id)
    }

    /// Number of frames (`max(frame_id) + 1`)
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false for a successfully built index
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Boxes of one frame, bounds-checked
    pub fn boxes(&self, index: usize) -> Result<&[BoxRecord]> {
        self.frames
            .get(index)
            .map(|frame| frame.boxes.as_slice())
            .ok_or(Error::OutOfRangeFrame {
                index,
                len: self.frames.len(),
            })
    }

    /// Records dropped while building the index
    pub fn rejected(&self) -> &[MalformedRecord] {
        &self.rejected
    }

    /// Largest number of boxes in any single frame
    pub fn max_boxes_per_frame(&self) -> usize {
        self.frames.iter().map(|f| f.boxes.len()).max().unwrap_or(0)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }
}

fn allocate_frames(frame_count: usize) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    frames
        .try_reserve_exact(frame_count)
        .map_err(|e| Error::InvalidData(format!("cannot allocate {} frames: {}", frame_count, e)))?;
    frames.extend((0..frame_count).map(Frame::new));
    Ok(frames)
}

impl Index<usize> for FrameIndex {
    type Output = Frame;

    fn index(&self, index: usize) -> &Self::Output {
        &self.frames[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Point3d, Vector3d};

    fn record(frame_id: i64, x: f64) -> BoxRecord {
        BoxRecord::new(frame_id, Point3d::new(x, 0.0, 0.0), Vector3d::new(1.0, 1.0, 1.0), 0.0)
    }

    #[test]
    fn test_groups_by_frame_id_with_gaps() {
        let index = FrameIndex::build(vec![record(0, 1.0), record(0, 2.0), record(2, 3.0)]).unwrap();

        assert_eq!(index.len(), 3);
        assert!(index[1].is_empty());
        assert_eq!(index[0].boxes.len(), 2);
        assert_eq!(index[0].boxes[0].center.x, 1.0);
        assert_eq!(index[0].boxes[1].center.x, 2.0);
        assert_eq!(index[2].boxes.len(), 1);
        assert_eq!(index[2].index, 2);
        assert!(index.rejected().is_empty());
    }

    #[test]
    fn test_unsorted_input_uses_max_frame_id() {
        // the last record is not the largest frame id
        let index = FrameIndex::build(vec![record(4, 0.0), record(1, 0.0)]).unwrap();
        assert_eq!(index.len(), 5);
        assert_eq!(index.max_boxes_per_frame(), 1);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let result = FrameIndex::build(Vec::new());
        assert!(matches!(result, Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_malformed_records_are_dropped() {
        let mut bad_geometry = record(1, 0.0);
        bad_geometry.heading = f64::NAN;

        let index = FrameIndex::build(vec![record(0, 0.0), record(-3, 0.0), bad_geometry]).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.rejected().len(), 2);
        assert_eq!(index.rejected()[0].position, 1);
        assert_eq!(index.rejected()[1].position, 2);
    }

    #[test]
    fn test_all_records_malformed_is_empty_input() {
        let result = FrameIndex::build(vec![record(-1, 0.0)]);
        assert!(matches!(result, Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_huge_frame_id_is_dropped_not_allocated() {
        let index = FrameIndex::build(vec![
            record(0, 0.0),
            record(i64::MAX, 0.0),
            record(MAX_FRAME_ID as i64 + 1, 0.0),
        ])
        .unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.rejected().len(), 2);
        assert_eq!(index.rejected()[0].position, 1);
        assert!(index.rejected()[0].reason.contains("exceeds"));
    }

    #[test]
    fn test_frame_allocation_failure_is_an_error() {
        assert!(matches!(allocate_frames(usize::MAX), Err(Error::InvalidData(_))));
        assert_eq!(allocate_frames(3).unwrap().len(), 3);
    }

    #[test]
    fn test_boxes_bounds_checked() {
        let index = FrameIndex::build(vec![record(0, 0.0)]).unwrap();
        assert_eq!(index.boxes(0).unwrap().len(), 1);
        assert!(matches!(
            index.boxes(1),
            Err(Error::OutOfRangeFrame { index: 1, len: 1 })
        ));
    }
}
