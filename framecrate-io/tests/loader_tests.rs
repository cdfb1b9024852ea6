//! Integration tests for framecrate-io
//!
//! Write small datasets to a temporary directory and load them the way the
//! player does at startup.

use framecrate_core::{align, Error, FrameIndex, LengthPolicy, StreamSet};
use framecrate_io::*;
use std::fs;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("framecrate_io_{}", name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_pcd(path: &PathBuf, offset: f32) {
    let content = format!(
        "VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 1\nWIDTH 2\nHEIGHT 1\nPOINTS 2\nDATA ascii\n{o} 0 0\n0 {o} 1\n",
        o = offset
    );
    fs::write(path, content).unwrap();
}

#[test]
fn test_dataset_loads_in_natural_order() {
    let dir = scratch_dir("natural_order");
    for i in [0, 1, 2, 10] {
        write_pcd(&dir.join(format!("{}.pcd", i)), i as f32);
    }

    let paths = list_files(&dir, &["pcd"]).unwrap();
    let clouds = load_point_clouds(&paths, [255, 255, 255]).unwrap();

    assert_eq!(clouds.len(), 4);
    assert_eq!(clouds[3][0].position.x, 10.0);
    assert_eq!(clouds[2][0].position.x, 2.0);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_csv_boxes_build_frame_index() {
    let dir = scratch_dir("csv_boxes");
    let path = dir.join("boxes.csv");
    fs::write(
        &path,
        "frame_id,bbox_id,x,y,z,dx,dy,dz,heading\n0,0,0,0,0,2,2,2,0\n0,1,3,0,0,2,2,2,0\nbad,2,0,0,0,1,1,1,0\n2,0,0,0,0,1,1,1,0.7\n",
    )
    .unwrap();

    let report = read_boxes(&path).unwrap();
    assert_eq!(report.malformed.len(), 1);

    let index = FrameIndex::build(report.records).unwrap();
    assert_eq!(index.len(), 3);
    assert_eq!(index[0].boxes.len(), 2);
    assert!(index[1].is_empty());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_huge_frame_ids_are_rejected_by_the_index() {
    let dir = scratch_dir("huge_frame_ids");
    let path = dir.join("boxes.csv");
    fs::write(
        &path,
        "frame_id,x,y,z,dx,dy,dz,heading\n9223372036854775807,0,0,0,1,1,1,0\n1e18,0,0,0,1,1,1,0\n1,0,0,0,1,1,1,0\n",
    )
    .unwrap();

    let report = read_boxes(&path).unwrap();
    assert!(report.malformed.is_empty());
    assert_eq!(report.records.len(), 3);

    let index = FrameIndex::build(report.records).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index[1].boxes.len(), 1);
    assert_eq!(index.rejected().len(), 2);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_header_only_csv_is_empty_input() {
    let dir = scratch_dir("header_only");
    let path = dir.join("boxes.csv");
    fs::write(&path, "frame_id,x,y,z,dx,dy,dz,heading\n").unwrap();

    let report = read_boxes(&path).unwrap();
    assert!(matches!(FrameIndex::build(report.records), Err(Error::EmptyInput(_))));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_json_boxes_align_with_streams() {
    let dir = scratch_dir("json_boxes");
    let path = dir.join("annotation.json");
    fs::write(
        &path,
        r#"{"frames":[{"index":1,"figures":[{"geometry":{"position":{"x":0,"y":0,"z":0},"rotation":{"x":0,"y":0,"z":0},"dimensions":{"x":1,"y":1,"z":1}}}]}]}"#,
    )
    .unwrap();

    let index = FrameIndex::build(read_boxes(&path).unwrap().records).unwrap();
    let streams: StreamSet<u8, u8> = StreamSet::new(vec![0, 1, 2]).unwrap();
    let timeline = align(index, streams, LengthPolicy::Shortest).unwrap();
    assert_eq!(timeline.len(), 2);
    assert!(timeline.boxes(0).unwrap().is_empty());
    assert_eq!(timeline.boxes(1).unwrap().len(), 1);

    fs::remove_dir_all(&dir).unwrap();
}
