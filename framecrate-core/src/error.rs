//! Error types for framecrate

use std::fmt;
use thiserror::Error;

/// Main error type for framecrate operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Visualization error: {0}")]
    Visualization(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("{0}")]
    MalformedRecord(MalformedRecord),

    #[error("Stream lengths differ ({}); playable length is {playable}", describe_lengths(.lengths))]
    StreamLengthMismatch {
        lengths: Vec<(String, usize)>,
        playable: usize,
    },

    #[error("Frame index {index} out of range for stream of length {len}")]
    OutOfRangeFrame { index: usize, len: usize },
}

/// Result type alias for framecrate operations
pub type Result<T> = std::result::Result<T, Error>;

/// A box record that was dropped while building a batch.
///
/// `position` is the zero-based position of the record in its input sequence.
/// File readers count data records only, so the header and blank lines do
/// not shift it; the physical line goes into `reason`.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRecord {
    pub position: usize,
    pub reason: String,
}

impl MalformedRecord {
    pub fn new(position: usize, reason: impl Into<String>) -> Self {
        Self {
            position,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Malformed record #{}: {}", self.position, self.reason)
    }
}

impl From<MalformedRecord> for Error {
    fn from(record: MalformedRecord) -> Self {
        Error::MalformedRecord(record)
    }
}

fn describe_lengths(lengths: &[(String, usize)]) -> String {
    lengths
        .iter()
        .map(|(name, len)| format!("{name}={len}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_lists_every_stream() {
        let err = Error::StreamLengthMismatch {
            lengths: vec![("pointcloud".to_string(), 5), ("camera1".to_string(), 4)],
            playable: 4,
        };
        assert_eq!(
            err.to_string(),
            "Stream lengths differ (pointcloud=5, camera1=4); playable length is 4"
        );
    }

    #[test]
    fn test_malformed_record_display() {
        let err: Error = MalformedRecord::new(3, "heading is not finite").into();
        assert_eq!(err.to_string(), "Malformed record #3: heading is not finite");
    }
}
