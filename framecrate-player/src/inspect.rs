//! Mouse inspection of the 3D view
//!
//! Ctrl-click reads the depth buffer under the cursor and shows the world
//! coordinate of the hit; the mouse wheel resizes the 3D label.

use crate::camera::{Camera, Viewport};
use log::debug;
use nalgebra::Point3;

/// Initial scale of the 3D label
pub const DEFAULT_LABEL_SCALE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseEvent {
    ButtonDown { x: f32, y: f32, ctrl: bool },
    Wheel { dy: f32 },
    Other,
}

/// Whether an event was consumed or should reach the camera controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Handled,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Inspector {
    pub camera: Camera,
    pub viewport: Viewport,
    picked: Option<Point3<f32>>,
    label_scale: f32,
}

impl Inspector {
    pub fn new(camera: Camera, viewport: Viewport) -> Self {
        Self {
            camera,
            viewport,
            picked: None,
            label_scale: DEFAULT_LABEL_SCALE,
        }
    }

    /// Handle one mouse event over the 3D view.
    ///
    /// `depth_at` reads the depth buffer at a window pixel. Plain clicks are
    /// left to the camera controls.
    pub fn handle<F>(&mut self, event: MouseEvent, depth_at: F) -> EventResult
    where
        F: FnOnce(f32, f32) -> Option<f32>,
    {
        match event {
            MouseEvent::ButtonDown { x, y, ctrl: true } => {
                self.picked = depth_at(x, y).and_then(|depth| self.camera.unproject(x, y, depth, self.viewport));
                match self.picked {
                    Some(p) => debug!("Picked ({:.3}, {:.3}, {:.3}) at pixel ({}, {})", p.x, p.y, p.z, x, y),
                    None => debug!("Nothing under pixel ({}, {})", x, y),
                }
                EventResult::Handled
            }
            MouseEvent::Wheel { dy } => {
                self.label_scale = (self.label_scale - 0.1 * dy).max(0.0);
                EventResult::Handled
            }
            _ => EventResult::Ignored,
        }
    }

    pub fn picked(&self) -> Option<Point3<f32>> {
        self.picked
    }

    /// Text of the coordinate label, empty when nothing is picked
    pub fn label_text(&self) -> String {
        match self.picked {
            Some(p) => format!("({:.3}, {:.3}, {:.3})", p.x, p.y, p.z),
            None => String::new(),
        }
    }

    pub fn label_scale(&self) -> f32 {
        self.label_scale
    }
}
