//! The tick thread hands frames to a slow UI thread without reordering them.

use framecrate_core::{align, ColoredPoint3f, FrameIndex, BoxRecord, LengthPolicy, Point3d, Point3f, PointCloud, Result, StreamSet, Vector3d};
use framecrate_io::ImageFrame;
use framecrate_player::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Backend that takes its time and remembers which cloud sizes it was given
#[derive(Default)]
struct SlowBackend {
    inner: RecordingBackend,
    cloud_sizes: Vec<usize>,
}

impl SceneBackend for SlowBackend {
    fn add_geometry(&mut self, name: &str, geometry: Renderable<'_>, material: &Material) -> Result<()> {
        thread::sleep(Duration::from_millis(3));
        if let Renderable::Points(cloud) = geometry {
            self.cloud_sizes.push(cloud.len());
        }
        self.inner.add_geometry(name, geometry, material)
    }

    fn remove_geometry(&mut self, name: &str) {
        self.inner.remove_geometry(name)
    }

    fn has_geometry(&self, name: &str) -> bool {
        self.inner.has_geometry(name)
    }

    fn update_image(&mut self, panel: &str, image: &ImageFrame) -> Result<()> {
        self.inner.update_image(panel, image)
    }
}

/// Frame `i` has `i + 1` points and `i` boxes
fn timeline() -> Arc<FrameTimeline> {
    let records = [1, 2, 2].map(|frame| BoxRecord::new(frame, Point3d::origin(), Vector3d::new(1.0, 1.0, 1.0), 0.0));
    let frames = FrameIndex::build(records).unwrap();
    let clouds = (0..3)
        .map(|i| {
            (0..=i)
                .map(|j| ColoredPoint3f::new(Point3f::new(j as f32, 0.0, 0.0), [255, 255, 255]))
                .collect::<PointCloud<_>>()
        })
        .collect();
    let streams = StreamSet::<_, ImageFrame>::new(clouds).unwrap();
    Arc::new(align(frames, streams, LengthPolicy::Strict).unwrap())
}

#[test]
fn test_publish_order_survives_slow_ui() {
    let (sender, receiver) = ui_queue(8);
    let sync = RenderSync::new(sender);

    let producer = thread::spawn(move || {
        for index in [2, 0, 1] {
            sync.publish(index);
        }
    });

    let mut presenter = FramePresenter::new(
        timeline(),
        SlowBackend::default(),
        Material::unlit_points(1.0),
        Material::unlit_lines(2.0, [1.0, 1.0, 0.0]),
    );
    receiver.run(&mut presenter);
    producer.join().unwrap();

    let backend = presenter.backend();
    // cloud sizes are index + 1, so they identify the frames in arrival order
    assert_eq!(backend.cloud_sizes, vec![3, 1, 2]);
    assert_eq!(presenter.current(), Some(1));
    assert!(backend.has_geometry("bbox0"));
    assert!(!backend.has_geometry("bbox1"));
}

#[test]
fn test_latest_frames_win_when_queue_is_full() {
    let (sender, receiver) = ui_queue(2);
    let sync = RenderSync::new(sender);
    for index in [0, 1, 2, 0] {
        sync.publish(index);
    }
    drop(sync);

    let mut presenter = FramePresenter::new(
        timeline(),
        SlowBackend::default(),
        Material::unlit_points(1.0),
        Material::unlit_lines(2.0, [1.0, 1.0, 0.0]),
    );
    assert_eq!(receiver.drain(&mut presenter), 2);
    assert_eq!(receiver.evicted(), 2);
    assert_eq!(presenter.backend().cloud_sizes, vec![3, 1]);
}
