//! Image to single-stroke sand-table track.
//!
//! This facade wires the collaborators around [`sand_track_core`]: a
//! Canny-style edge detector producing the binary edge grid the core
//! consumes, buffer/image adapters, and writers for the track file,
//! preview image and JSON report.

mod edges;
mod io;

pub use edges::{detect_edges, EdgeParams};
pub use io::{preview_image, write_report, write_track, IoError, TraceReport};

pub use sand_track_core as core;
pub use sand_track_core::{trace, EdgeGrid, Pixel, TraceError, TraceResult, TraceSummary};

use image::GrayImage;

/// Errors from the edge-detection collaborator.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeError {
    #[error("image too small for edge detection (width={width}, height={height}, need 3x3)")]
    ImageTooSmall { width: usize, height: usize },
}

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum TraceImageError {
    #[error("invalid grayscale buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidGrayDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Edges(#[from] EdgeError),

    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// Detect edges and trace the image end-to-end.
///
/// Returns the track together with the connected edge grid the track was
/// planned on (useful for previews).
pub fn trace_image(
    img: &GrayImage,
    params: &EdgeParams,
) -> Result<(TraceResult, EdgeGrid), TraceImageError> {
    let mut grid = detect_edges(img, params)?;
    let result = trace(&mut grid)?;
    Ok((result, grid))
}

/// Build a `GrayImage` from a raw grayscale buffer.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<GrayImage, TraceImageError> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .ok_or(TraceImageError::InvalidGrayDimensions { width, height })?;
    if pixels.len() != expected {
        return Err(TraceImageError::InvalidGrayBuffer {
            expected,
            got: pixels.len(),
        });
    }
    GrayImage::from_raw(width, height, pixels.to_vec())
        .ok_or(TraceImageError::InvalidGrayDimensions { width, height })
}

/// Trace a raw grayscale buffer end-to-end.
pub fn trace_gray_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    params: &EdgeParams,
) -> Result<(TraceResult, EdgeGrid), TraceImageError> {
    let img = gray_image_from_slice(width, height, pixels)?;
    trace_image(&img, params)
}
