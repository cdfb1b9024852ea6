//! Applies one frame of a timeline to a scene backend

use crate::config::Material;
use crate::render_sync::FrameSink;
use crate::scene::{Renderable, SceneBackend};
use framecrate_core::{ColoredPoint3f, OrientedBoxGeometry, PointCloud, Result, Timeline};
use framecrate_io::ImageFrame;
use log::{debug, warn};
use std::sync::Arc;

/// Scene name of the point cloud geometry
pub const POINT_CLOUD_GEOMETRY: &str = "Point Cloud";

/// Scene name of the box drawn in `slot` of the current frame
pub fn bbox_name(slot: usize) -> String {
    format!("bbox{}", slot)
}

/// The timeline type the player plays back
pub type FrameTimeline = Timeline<PointCloud<ColoredPoint3f>, ImageFrame>;

/// Owns the backend on the UI thread and swaps scene content per frame
pub struct FramePresenter<B> {
    timeline: Arc<FrameTimeline>,
    backend: B,
    point_material: Material,
    line_material: Material,
    drawn_boxes: usize,
    current: Option<usize>,
    presented: u64,
}

impl<B: SceneBackend> FramePresenter<B> {
    pub fn new(timeline: Arc<FrameTimeline>, backend: B, point_material: Material, line_material: Material) -> Self {
        Self {
            timeline,
            backend,
            point_material,
            line_material,
            drawn_boxes: 0,
            current: None,
            presented: 0,
        }
    }

    /// Replace the scene content with frame `index`.
    ///
    /// Out-of-range indices fail before the scene is touched. If the new
    /// cloud is refused, the cloud of the current frame is put back. A box
    /// whose geometry cannot be built is skipped with a warning.
    pub fn present(&mut self, index: usize) -> Result<()> {
        let timeline = Arc::clone(&self.timeline);
        let cloud = timeline.point_cloud(index)?;
        let boxes = timeline.boxes(index)?;

        self.backend.remove_geometry(POINT_CLOUD_GEOMETRY);
        if let Err(e) = self
            .backend
            .add_geometry(POINT_CLOUD_GEOMETRY, Renderable::Points(cloud), &self.point_material)
        {
            self.restore_cloud(&timeline);
            return Err(e);
        }

        for stream in timeline.image_stream_names() {
            let image = timeline.image(stream, index)?;
            self.backend.update_image(stream, image)?;
        }

        for slot in 0..self.drawn_boxes {
            self.backend.remove_geometry(&bbox_name(slot));
        }
        self.drawn_boxes = 0;

        for (slot, record) in boxes.iter().enumerate() {
            let geometry = match OrientedBoxGeometry::from_record(record) {
                Ok(geometry) => geometry,
                Err(e) => {
                    warn!("Skipping box {} of frame {}: {}", slot, index, e);
                    continue;
                }
            };
            let lines = geometry.to_line_set(self.line_material.color);
            self.backend
                .add_geometry(&bbox_name(slot), Renderable::Lines(&lines), &self.line_material)?;
            self.drawn_boxes = slot + 1;
        }

        debug!("Presented frame {} ({} points, {} boxes)", index, cloud.len(), boxes.len());
        self.current = Some(index);
        self.presented += 1;
        Ok(())
    }

    fn restore_cloud(&mut self, timeline: &FrameTimeline) {
        let Some(previous) = self.current else {
            return;
        };
        let restored = timeline.point_cloud(previous).and_then(|cloud| {
            self.backend
                .add_geometry(POINT_CLOUD_GEOMETRY, Renderable::Points(cloud), &self.point_material)
        });
        if let Err(e) = restored {
            warn!("Could not restore the cloud of frame {}: {}", previous, e);
        }
    }

    /// Index of the frame on screen, if any
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Number of frames presented so far
    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn timeline(&self) -> &FrameTimeline {
        &self.timeline
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

impl<B: SceneBackend> FrameSink for FramePresenter<B> {
    fn present_frame(&mut self, index: usize) -> Result<()> {
        self.present(index)
    }
}
