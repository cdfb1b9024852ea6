//! Playback of synchronized frame sequences
//!
//! This crate drives a [`framecrate_core::Timeline`] through time:
//! - [`PlaybackController`]: Stopped/Playing/Closed state machine with a
//!   background tick thread
//! - [`RenderSync`] over a bounded FIFO [`ui_queue`]: the only path from the
//!   tick thread to the UI thread
//! - [`SceneBackend`]: the rendering collaborator, and [`FramePresenter`]
//!   which applies one frame to it
//! - [`Camera`] and [`Inspector`] for picking 3D coordinates with the mouse
//! - [`Viewer`], which wires everything together

pub mod config;
pub mod playback;
pub mod ui_queue;
pub mod render_sync;
pub mod scene;
pub mod presenter;
pub mod camera;
pub mod inspect;
pub mod viewer;

pub use config::*;
pub use playback::*;
pub use ui_queue::*;
pub use render_sync::*;
pub use scene::*;
pub use presenter::*;
pub use camera::*;
pub use inspect::*;
pub use viewer::*;
