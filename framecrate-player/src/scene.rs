//! The rendering collaborator the player draws into
//!
//! A window toolkit implements [`SceneBackend`]; the player itself only talks
//! to this trait. [`RecordingBackend`] keeps everything in memory and is what
//! the headless binary and the tests use.

use crate::config::Material;
use framecrate_core::{ColoredPoint3f, Error, LineSet, PointCloud, Result};
use framecrate_io::ImageFrame;
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Geometry handed to the backend
#[derive(Debug, Clone, Copy)]
pub enum Renderable<'a> {
    Points(&'a PointCloud<ColoredPoint3f>),
    Lines(&'a LineSet),
}

impl Renderable<'_> {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Renderable::Points(_) => GeometryKind::Points,
            Renderable::Lines(_) => GeometryKind::Lines,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Points,
    Lines,
}

/// A 3D scene plus named 2D image panels
pub trait SceneBackend {
    /// Add a named geometry. Names are unique within the scene.
    fn add_geometry(&mut self, name: &str, geometry: Renderable<'_>, material: &Material) -> Result<()>;

    /// Remove a named geometry; removing an absent name is a no-op
    fn remove_geometry(&mut self, name: &str);

    fn has_geometry(&self, name: &str) -> bool;

    /// Replace the picture shown in an image panel
    fn update_image(&mut self, panel: &str, image: &ImageFrame) -> Result<()>;
}

/// What a [`RecordingBackend`] holds for one geometry
#[derive(Debug, Clone, PartialEq)]
pub struct StoredGeometry {
    pub kind: GeometryKind,
    /// Points for a cloud, segments for a line set
    pub element_count: usize,
    pub material: Material,
}

/// Calls seen by a [`RecordingBackend`], in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneCall {
    Add(String),
    Remove(String),
    Image(String),
}

/// In-memory backend
#[derive(Debug, Default)]
pub struct RecordingBackend {
    geometries: BTreeMap<String, StoredGeometry>,
    images: HashMap<String, (u32, u32)>,
    calls: Vec<SceneCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geometry(&self, name: &str) -> Option<&StoredGeometry> {
        self.geometries.get(name)
    }

    pub fn geometry_names(&self) -> impl Iterator<Item = &str> {
        self.geometries.keys().map(String::as_str)
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Size of the image currently shown in `panel`
    pub fn image_size(&self, panel: &str) -> Option<(u32, u32)> {
        self.images.get(panel).copied()
    }

    pub fn calls(&self) -> &[SceneCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl SceneBackend for RecordingBackend {
    fn add_geometry(&mut self, name: &str, geometry: Renderable<'_>, material: &Material) -> Result<()> {
        if self.geometries.contains_key(name) {
            return Err(Error::Visualization(format!("geometry '{}' already in scene", name)));
        }
        let element_count = match geometry {
            Renderable::Points(cloud) => cloud.len(),
            Renderable::Lines(lines) => lines.segment_count(),
        };
        self.geometries.insert(
            name.to_string(),
            StoredGeometry {
                kind: geometry.kind(),
                element_count,
                material: material.clone(),
            },
        );
        self.calls.push(SceneCall::Add(name.to_string()));
        Ok(())
    }

    fn remove_geometry(&mut self, name: &str) {
        if self.geometries.remove(name).is_some() {
            self.calls.push(SceneCall::Remove(name.to_string()));
        } else {
            debug!("Geometry '{}' not in scene, nothing to remove", name);
        }
    }

    fn has_geometry(&self, name: &str) -> bool {
        self.geometries.contains_key(name)
    }

    fn update_image(&mut self, panel: &str, image: &ImageFrame) -> Result<()> {
        self.images.insert(panel.to_string(), (image.width, image.height));
        self.calls.push(SceneCall::Image(panel.to_string()));
        Ok(())
    }
}
