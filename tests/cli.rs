extern crate assert_cmd;
extern crate image;
extern crate mandelzoom;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use image::AnimationDecoder;
use mandelzoom::output::raster;
use mandelzoom::{sample_grid, scale};
use predicates::prelude::*;
use std::fs;
use std::process::Command;

fn small_run(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("mandelzoom").unwrap();
    cmd.arg("--output")
        .arg(dir)
        .args(&["--center", "-0.5,0", "--resolution", "0.01"])
        .args(&["--pixels", "4", "--iterations", "10", "--frames", "3"])
        .args(&["--zoom", "0.5", "--step", "0", "--threads", "2"]);
    cmd
}

#[test]
fn renders_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    small_run(dir.path()).assert().success();

    for n in 1..4 {
        let table = fs::read_to_string(dir.path().join("arrays").join(format!("{}_array.csv", n)))
            .unwrap();
        let rows: Vec<&str> = table.lines().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.split(' ').count() == 4));
        assert!(dir
            .path()
            .join("intermediates")
            .join(format!("{:04}.png", n))
            .is_file());
    }
    assert!(dir.path().join("final").join("zoom.gif").is_file());
}

#[test]
fn gif_has_one_raster_per_frame_in_order() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("mandelzoom")
        .unwrap()
        .arg("--output")
        .arg(dir.path())
        .args(&["--center", "-0.75,0.1", "--resolution", "0.3"])
        .args(&["--pixels", "4", "--iterations", "20", "--frames", "3"])
        .args(&["--zoom", "0.5", "--step", "0", "--threads", "2"])
        .assert()
        .success();

    let file = fs::File::open(dir.path().join("final").join("zoom.gif")).unwrap();
    let decoded = image::gif::Decoder::new(file)
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap();
    assert_eq!(decoded.len(), 3);

    for (n, frame) in (1..4).zip(decoded.into_iter()) {
        let params = scale(0.3, 20, 0.5, 0, n);
        let grid = sample_grid(-0.75, 0.1, params.resolution, 4, params.max_iterations).unwrap();

        let table = fs::read_to_string(dir.path().join("arrays").join(format!("{}_array.csv", n)))
            .unwrap();
        let cells: Vec<usize> = table
            .split_whitespace()
            .map(|c| c.parse().unwrap())
            .collect();
        assert_eq!(cells, grid.cells().to_vec());

        let rgba = frame.into_buffer();
        assert_eq!(rgba.dimensions(), (4, 4));
        let expected = raster(&grid).unwrap().into_raw();
        let luma: Vec<u8> = rgba.into_raw().chunks(4).map(|p| p[0]).collect();
        for (got, want) in luma.iter().zip(expected.iter()) {
            assert!((*got as i32 - *want as i32).abs() <= 8, "frame {}: {} vs {}", n, got, want);
        }
    }
}

#[test]
fn stale_intermediates_are_removed() {
    let dir = tempfile::tempdir().unwrap();
    let intermediates = dir.path().join("intermediates");
    fs::create_dir_all(&intermediates).unwrap();
    fs::write(intermediates.join("0099.png"), b"stale").unwrap();

    small_run(dir.path()).assert().success();
    assert!(!intermediates.join("0099.png").exists());
}

#[test]
fn work_queue_matches_batches() {
    let batch = tempfile::tempdir().unwrap();
    let queue = tempfile::tempdir().unwrap();
    small_run(batch.path()).assert().success();
    small_run(queue.path())
        .args(&["--policy", "queue"])
        .assert()
        .success();
    for n in 1..4 {
        let name = format!("{}_array.csv", n);
        let a = fs::read_to_string(batch.path().join("arrays").join(&name)).unwrap();
        let b = fs::read_to_string(queue.path().join("arrays").join(&name)).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn rejects_non_positive_resolution() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("mandelzoom")
        .unwrap()
        .arg("--output")
        .arg(dir.path())
        .args(&["--resolution", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Resolution must be a positive number"));
}

#[test]
fn reports_degenerate_zoom() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("mandelzoom")
        .unwrap()
        .arg("--output")
        .arg(dir.path())
        .args(&["--resolution", "1e-300", "--zoom", "1e-100", "--frames", "5"])
        .args(&["--pixels", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render failure"));
}
