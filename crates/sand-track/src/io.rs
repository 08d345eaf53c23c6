//! Track, preview and report writers.

use std::fs;
use std::io::Write;
use std::path::Path;

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use sand_track_core::{EdgeGrid, Pixel, TraceSummary};

use crate::EdgeParams;

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Write the track as text, one `row col` pair per line, the format the
/// table firmware consumes.
pub fn write_track(path: impl AsRef<Path>, track: &[Pixel]) -> Result<(), IoError> {
    let mut out = std::io::BufWriter::new(fs::File::create(path)?);
    for p in track {
        writeln!(out, "{} {}", p.row, p.col)?;
    }
    out.flush()?;
    Ok(())
}

/// Render the connected edge grid as a grayscale preview, traced pixels
/// white on black.
pub fn preview_image(grid: &EdgeGrid) -> GrayImage {
    GrayImage::from_fn(grid.width() as u32, grid.height() as u32, |x, y| {
        if grid.get(y as usize, x as usize) {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Run report for tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceReport {
    /// Source image path as given on the command line.
    pub image: String,
    pub params: EdgeParams,
    pub summary: TraceSummary,
    pub elapsed_ms: f64,
}

/// Write the report as pretty JSON.
pub fn write_report(path: impl AsRef<Path>, report: &TraceReport) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}
