//! A player session: presenter, UI queue and playback controller wired together

use crate::camera::{Camera, Viewport};
use crate::config::PlayerConfig;
use crate::inspect::{EventResult, Inspector, MouseEvent};
use crate::playback::{PlaybackController, PlaybackStatus};
use crate::presenter::{FramePresenter, FrameTimeline};
use crate::render_sync::RenderSync;
use crate::scene::SceneBackend;
use crate::ui_queue::{ui_queue, UiReceiver};
use framecrate_core::Result;
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Entry point of the player
pub struct Viewer;

impl Viewer {
    /// Show frame 0 on `backend` and start the (stopped) playback clock.
    ///
    /// Everything that touches `backend` happens on the thread that owns the
    /// returned session.
    pub fn launch<B>(config: &PlayerConfig, timeline: FrameTimeline, backend: B) -> Result<ViewerSession<B>>
    where
        B: SceneBackend + 'static,
    {
        config.validate()?;
        let timeline = Arc::new(timeline);

        let viewport = Viewport::new(config.window_width, config.window_height);
        let camera = match timeline.point_cloud(0)?.bounds() {
            Some((min, max)) => Camera::framing(min, max, viewport.aspect_ratio()),
            None => Camera::default(),
        };

        let mut presenter = FramePresenter::new(
            Arc::clone(&timeline),
            backend,
            config.point_material.clone(),
            config.line_material.clone(),
        );
        presenter.present(0)?;

        let (sender, receiver) = ui_queue(config.queue_capacity);
        let sync = RenderSync::new(sender);
        let controller = PlaybackController::spawn(timeline.len(), config.tick_interval(), move |index| {
            sync.publish(index)
        })?;

        info!(
            "Launched '{}' ({}x{}) with {} frames",
            config.window_title,
            config.window_width,
            config.window_height,
            timeline.len()
        );

        Ok(ViewerSession {
            presenter,
            receiver,
            controller,
            inspector: Inspector::new(camera, viewport),
            closed: false,
        })
    }
}

/// The UI-thread side of a running player
pub struct ViewerSession<B> {
    presenter: FramePresenter<B>,
    receiver: UiReceiver<FramePresenter<B>>,
    controller: PlaybackController,
    inspector: Inspector,
    closed: bool,
}

impl<B: SceneBackend> ViewerSession<B> {
    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    /// The Play/Stop button
    pub fn toggle_playback(&self) -> PlaybackStatus {
        self.controller.toggle()
    }

    /// Current text of the Play/Stop button
    pub fn button_label(&self) -> &'static str {
        self.controller.status().button_label()
    }

    /// One step of the UI event loop: wait up to `timeout` for frame updates
    /// and apply them. Returns the number applied.
    pub fn pump(&mut self, timeout: Duration) -> usize {
        if self.closed {
            return 0;
        }
        self.receiver.recv_timeout(&mut self.presenter, timeout)
    }

    /// Pump until `target` frames have been presented in total. Gives up when
    /// the playback thread has stopped or `limit` has passed, so frames the
    /// backend keeps refusing cannot stall the caller. Returns whether the
    /// target was reached.
    pub fn pump_until_presented(&mut self, target: u64, limit: Duration) -> bool {
        let deadline = Instant::now().checked_add(limit);
        let step = self.controller.interval().saturating_mul(2);
        while self.presenter.presented() < target {
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => step,
            };
            if self.closed || self.controller.is_finished() || remaining.is_zero() {
                warn!(
                    "Stopped waiting with {} of {} frame(s) presented",
                    self.presenter.presented(),
                    target
                );
                return false;
            }
            self.pump(step.min(remaining));
        }
        true
    }

    /// Route a mouse event over the 3D view
    pub fn handle_mouse<F>(&mut self, event: MouseEvent, depth_at: F) -> EventResult
    where
        F: FnOnce(f32, f32) -> Option<f32>,
    {
        self.inspector.handle(event, depth_at)
    }

    pub fn inspector(&self) -> &Inspector {
        &self.inspector
    }

    pub fn presenter(&self) -> &FramePresenter<B> {
        &self.presenter
    }

    pub fn backend(&self) -> &B {
        self.presenter.backend()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Window close callback. Stops the clock and drops queued frames;
    /// returns `true` to let the window close.
    pub fn close(&mut self) -> bool {
        if !self.closed {
            self.controller.close();
            let dropped = self.receiver.discard();
            info!(
                "Viewer closed after {} presented frame(s), {} pending update(s) dropped",
                self.presenter.presented(),
                dropped
            );
            self.closed = true;
        }
        true
    }
}

impl<B> Drop for ViewerSession<B> {
    fn drop(&mut self) {
        self.controller.close();
    }
}
