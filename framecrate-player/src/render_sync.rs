//! Hand-off of frame indices from the playback thread to the UI thread

use crate::ui_queue::UiSender;
use framecrate_core::{Error, Result};
use log::error;

/// Something on the UI thread that can show a frame
pub trait FrameSink {
    fn present_frame(&mut self, index: usize) -> Result<()>;
}

/// Posts "present frame i" tasks onto the UI queue.
///
/// The index is captured by value when posted, so a task always presents the
/// frame it was created for even if playback moved on in the meantime.
pub struct RenderSync<S> {
    sender: UiSender<S>,
}

impl<S: FrameSink + 'static> RenderSync<S> {
    pub fn new(sender: UiSender<S>) -> Self {
        Self { sender }
    }

    pub fn publish(&self, index: usize) {
        self.sender.post(move |sink: &mut S| {
            if let Err(e) = sink.present_frame(index) {
                error!("Failed to present frame {}: {}", index, e);
                debug_assert!(
                    !matches!(e, Error::OutOfRangeFrame { .. }),
                    "published frame {} is out of range",
                    index
                );
            }
        });
    }
}

impl<S> Clone for RenderSync<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
