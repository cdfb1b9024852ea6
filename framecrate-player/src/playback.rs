//! Timed playback state machine
//!
//! A [`PlaybackController`] owns one background thread that sleeps for a
//! fixed interval, advances the frame counter while playing and hands the
//! new index to a publish callback. The UI thread only ever calls
//! [`PlaybackController::start`], [`PlaybackController::stop`],
//! [`PlaybackController::close`] and reads [`PlaybackController::current`].

use framecrate_core::{Error, Result};
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Shared playback flags, guarded by a single lock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_closed: bool,
    pub current_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Stopped,
    Playing,
    Closed,
}

impl PlaybackStatus {
    /// Text of the play/stop button for this state
    pub fn button_label(&self) -> &'static str {
        match self {
            PlaybackStatus::Playing => "Stop",
            PlaybackStatus::Stopped | PlaybackStatus::Closed => "Play",
        }
    }
}

impl PlaybackState {
    pub fn status(&self) -> PlaybackStatus {
        if self.is_closed {
            PlaybackStatus::Closed
        } else if self.is_playing {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Stopped
        }
    }
}

/// One tick: step to the next frame, wrapping to 0 at `len`.
///
/// Returns the new index, or `None` when stopped or closed.
pub fn advance(state: &mut PlaybackState, len: usize) -> Option<usize> {
    if !state.is_playing || state.is_closed || len == 0 {
        return None;
    }
    state.current_index = (state.current_index + 1) % len;
    Some(state.current_index)
}

/// Background frame clock
#[derive(Debug)]
pub struct PlaybackController {
    state: Arc<Mutex<PlaybackState>>,
    worker: Option<JoinHandle<()>>,
    len: usize,
    interval: Duration,
}

impl PlaybackController {
    /// Spawn the tick thread for a stream of `len` frames.
    ///
    /// `publish` runs on the tick thread, outside the state lock, once per
    /// advanced frame. The controller starts out stopped at frame 0.
    pub fn spawn<F>(len: usize, interval: Duration, mut publish: F) -> Result<Self>
    where
        F: FnMut(usize) + Send + 'static,
    {
        if len == 0 {
            return Err(Error::EmptyInput("cannot play a stream with no frames".to_string()));
        }

        let state = Arc::new(Mutex::new(PlaybackState::default()));
        let shared = Arc::clone(&state);
        let worker = thread::Builder::new()
            .name("framecrate-playback".to_string())
            .spawn(move || {
                loop {
                    thread::sleep(interval);
                    let next = {
                        let mut state = shared.lock();
                        if state.is_closed {
                            break;
                        }
                        advance(&mut state, len)
                    };
                    if let Some(index) = next {
                        publish(index);
                    }
                }
                debug!("Playback thread exiting");
            })?;

        info!("Playback ready: {} frames, {:?} per tick", len, interval);
        Ok(Self {
            state,
            worker: Some(worker),
            len,
            interval,
        })
    }

    /// Begin advancing frames; no-op while playing or after close
    pub fn start(&self) -> PlaybackStatus {
        let mut state = self.state.lock();
        if !state.is_closed && !state.is_playing {
            state.is_playing = true;
            info!("Playback started at frame {}", state.current_index);
        }
        state.status()
    }

    /// Halt advancement; no-op while stopped
    pub fn stop(&self) -> PlaybackStatus {
        let mut state = self.state.lock();
        if !state.is_closed && state.is_playing {
            state.is_playing = false;
            info!("Playback stopped at frame {}", state.current_index);
        }
        state.status()
    }

    /// The play/stop button: start when stopped, stop when playing
    pub fn toggle(&self) -> PlaybackStatus {
        let playing = self.state.lock().is_playing;
        if playing {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Ask the tick thread to exit after its current sleep. Never blocks.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if !state.is_closed {
            state.is_closed = true;
            state.is_playing = false;
            info!("Playback closed at frame {}", state.current_index);
        }
    }

    pub fn current(&self) -> usize {
        self.state.lock().current_index
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.lock().status()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the tick thread has exited
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map(|w| w.is_finished()).unwrap_or(true)
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        // detach; the thread notices within one interval
        self.close();
        self.worker.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> PlaybackState {
        PlaybackState {
            is_playing: true,
            ..PlaybackState::default()
        }
    }

    #[test]
    fn test_advance_wraps_exactly_once_per_cycle() {
        let len = 5;
        let mut state = playing();
        let indices: Vec<usize> = (0..len).map(|_| advance(&mut state, len).unwrap()).collect();

        assert_eq!(indices, vec![1, 2, 3, 4, 0]);
        assert_eq!(indices.iter().filter(|i| **i == 0).count(), 1);
    }

    #[test]
    fn test_advance_requires_playing() {
        let mut state = PlaybackState::default();
        assert_eq!(advance(&mut state, 3), None);
        assert_eq!(state.current_index, 0);

        let mut closed = playing();
        closed.is_closed = true;
        assert_eq!(advance(&mut closed, 3), None);
    }

    #[test]
    fn test_single_frame_stays_at_zero() {
        let mut state = playing();
        assert_eq!(advance(&mut state, 1), Some(0));
        assert_eq!(advance(&mut state, 1), Some(0));
    }

    #[test]
    fn test_status_and_labels() {
        let mut state = PlaybackState::default();
        assert_eq!(state.status(), PlaybackStatus::Stopped);
        assert_eq!(state.status().button_label(), "Play");
        state.is_playing = true;
        assert_eq!(state.status(), PlaybackStatus::Playing);
        assert_eq!(state.status().button_label(), "Stop");
        state.is_closed = true;
        assert_eq!(state.status(), PlaybackStatus::Closed);
    }

    #[test]
    fn test_spawn_rejects_empty_stream() {
        let result = PlaybackController::spawn(0, Duration::from_millis(1), |_| {});
        assert!(matches!(result, Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_start_stop_idempotent() {
        let controller = PlaybackController::spawn(3, Duration::from_secs(60), |_| {}).unwrap();
        assert_eq!(controller.start(), PlaybackStatus::Playing);
        assert_eq!(controller.start(), PlaybackStatus::Playing);
        assert_eq!(controller.stop(), PlaybackStatus::Stopped);
        assert_eq!(controller.stop(), PlaybackStatus::Stopped);
        assert_eq!(controller.toggle(), PlaybackStatus::Playing);
        assert_eq!(controller.toggle(), PlaybackStatus::Stopped);

        controller.close();
        controller.close();
        assert_eq!(controller.status(), PlaybackStatus::Closed);
        assert_eq!(controller.start(), PlaybackStatus::Closed);
    }
}
