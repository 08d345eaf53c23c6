//! End-to-end tests for the `sand-track` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use image::{GrayImage, Luma};
use predicates::prelude::*;

/// A bright disc on dark ground: one clean closed contour to trace.
fn write_disc_png(path: &Path) {
    let img = GrayImage::from_fn(64, 64, |x, y| {
        let dx = x as f32 - 32.0;
        let dy = y as f32 - 32.0;
        if (dx * dx + dy * dy).sqrt() < 16.0 {
            Luma([235u8])
        } else {
            Luma([20u8])
        }
    });
    img.save(path).expect("write fixture image");
}

#[test]
fn traces_an_image_to_a_track_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("disc.png");
    let out = dir.path().join("disc.txt");
    write_disc_png(&input);

    Command::cargo_bin("sand-track")
        .unwrap()
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let track = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = track.lines().collect();
    assert!(!lines.is_empty(), "track file is empty");
    for line in &lines {
        let mut parts = line.split_whitespace();
        let row: usize = parts.next().unwrap().parse().unwrap();
        let col: usize = parts.next().unwrap().parse().unwrap();
        assert!(parts.next().is_none());
        assert!(row < 64 && col < 64);
    }
}

#[test]
fn default_output_is_the_image_stem() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("disc.png");
    write_disc_png(&input);

    Command::cargo_bin("sand-track")
        .unwrap()
        .arg(&input)
        .assert()
        .success();

    assert!(dir.path().join("disc.txt").exists());
}

#[test]
fn writes_preview_and_report_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("disc.png");
    let preview = dir.path().join("preview.png");
    let report = dir.path().join("report.json");
    write_disc_png(&input);

    Command::cargo_bin("sand-track")
        .unwrap()
        .arg(&input)
        .arg("--preview")
        .arg(&preview)
        .arg("--report")
        .arg(&report)
        .arg("--flip")
        .assert()
        .success();

    let preview_img = image::open(&preview).unwrap().to_luma8();
    assert_eq!((64, 64), (preview_img.width(), preview_img.height()));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert!(report["summary"]["track_points"].as_u64().unwrap() > 0);
    assert!(report["elapsed_ms"].as_f64().unwrap() >= 0.0);
}

#[test]
fn missing_input_fails_with_a_message() {
    Command::cargo_bin("sand-track")
        .unwrap()
        .arg("no-such-image.png")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn flat_image_reports_degenerate_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("flat.png");
    GrayImage::from_pixel(32, 32, Luma([127u8]))
        .save(&input)
        .unwrap();

    Command::cargo_bin("sand-track")
        .unwrap()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no edge pixels"));
}
