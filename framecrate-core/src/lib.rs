//! Core data structures for framecrate
//!
//! This crate provides the data model of the frame player: point and point
//! cloud types, box records, oriented box reconstruction, the frame index
//! that groups boxes by frame and the alignment of per-frame streams under a
//! single playback length.

pub mod point;
pub mod point_cloud;
pub mod bbox;
pub mod frame_index;
pub mod stream;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use bbox::*;
pub use frame_index::*;
pub use stream::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
