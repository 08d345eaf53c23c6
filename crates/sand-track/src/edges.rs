//! Canny-style edge detection: grayscale image in, binary edge grid out.
//!
//! Stages: Gaussian blur, Scharr gradients, direction-aligned non-maximum
//! suppression, double threshold with hysteresis. Thresholds are relative
//! to the peak gradient magnitude. The outermost ring of the result is
//! forced off; the downstream labeling and start-pixel scans rely on a
//! background border.

use image::GrayImage;
use log::debug;
use serde::{Deserialize, Serialize};

use sand_track_core::EdgeGrid;

use crate::EdgeError;

/// Edge detection parameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EdgeParams {
    /// Gaussian blur standard deviation, in pixels.
    pub sigma: f32,
    /// Weak-edge threshold, relative to the peak gradient magnitude.
    pub low_threshold: f32,
    /// Strong-edge threshold, relative to the peak gradient magnitude.
    pub high_threshold: f32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            sigma: 2.4,
            low_threshold: 0.04,
            high_threshold: 0.17,
        }
    }
}

/// Single-channel float raster, row-major.
struct FloatImage {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl FloatImage {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, value: f32) {
        self.data[row * self.width + col] = value;
    }

    /// Clamped read; borders replicate.
    #[inline]
    fn get_clamped(&self, row: i64, col: i64) -> f32 {
        let r = row.clamp(0, self.height as i64 - 1) as usize;
        let c = col.clamp(0, self.width as i64 - 1) as usize;
        self.get(r, c)
    }
}

const SCHARR_X: [[f32; 3]; 3] = [[-3.0, 0.0, 3.0], [-10.0, 0.0, 10.0], [-3.0, 0.0, 3.0]];
const SCHARR_Y: [[f32; 3]; 3] = [[-3.0, -10.0, -3.0], [0.0, 0.0, 0.0], [3.0, 10.0, 3.0]];

/// Detect edges in a grayscale image.
pub fn detect_edges(img: &GrayImage, params: &EdgeParams) -> Result<EdgeGrid, EdgeError> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    if width < 3 || height < 3 {
        return Err(EdgeError::ImageTooSmall { width, height });
    }

    let mut luma = FloatImage::new(width, height);
    for (col, row, pixel) in img.enumerate_pixels() {
        luma.set(row as usize, col as usize, pixel.0[0] as f32 / 255.0);
    }

    let blurred = gaussian_blur(&luma, params.sigma);
    let (gx, gy, mag, peak) = scharr_gradients(&blurred);
    debug!("gradient peak magnitude {peak:.4}");
    if peak <= 0.0 {
        // Flat image: no gradients, no edges.
        return Ok(EdgeGrid::new(height, width));
    }

    let thinned = suppress_non_maxima(&gx, &gy, &mag);
    let mut grid = apply_hysteresis(
        &thinned,
        peak * params.low_threshold,
        peak * params.high_threshold,
    );
    grid.clear_border();
    debug!("edge detection kept {} pixels", grid.count_on());
    Ok(grid)
}

/// Separable Gaussian blur with replicated borders. A non-positive sigma
/// leaves the image untouched.
fn gaussian_blur(src: &FloatImage, sigma: f32) -> FloatImage {
    if sigma <= 0.0 {
        return FloatImage {
            width: src.width,
            height: src.height,
            data: src.data.clone(),
        };
    }

    let radius = (3.0 * sigma).ceil().max(1.0) as i64;
    let mut kernel = Vec::with_capacity(2 * radius as usize + 1);
    for offset in -radius..=radius {
        let x = offset as f32;
        kernel.push((-x * x / (2.0 * sigma * sigma)).exp());
    }
    let norm: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= norm;
    }

    let mut horizontal = FloatImage::new(src.width, src.height);
    for row in 0..src.height {
        for col in 0..src.width {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let offset = k as i64 - radius;
                acc += w * src.get_clamped(row as i64, col as i64 + offset);
            }
            horizontal.set(row, col, acc);
        }
    }

    let mut out = FloatImage::new(src.width, src.height);
    for row in 0..src.height {
        for col in 0..src.width {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let offset = k as i64 - radius;
                acc += w * horizontal.get_clamped(row as i64 + offset, col as i64);
            }
            out.set(row, col, acc);
        }
    }
    out
}

/// Scharr gradients with border clamping; returns (gx, gy, magnitude,
/// peak magnitude).
fn scharr_gradients(src: &FloatImage) -> (FloatImage, FloatImage, FloatImage, f32) {
    let mut gx = FloatImage::new(src.width, src.height);
    let mut gy = FloatImage::new(src.width, src.height);
    let mut mag = FloatImage::new(src.width, src.height);
    let mut peak = 0.0f32;

    for row in 0..src.height {
        for col in 0..src.width {
            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (kr, (kx_row, ky_row)) in SCHARR_X.iter().zip(SCHARR_Y.iter()).enumerate() {
                for kc in 0..3 {
                    let value =
                        src.get_clamped(row as i64 + kr as i64 - 1, col as i64 + kc as i64 - 1);
                    sum_x += value * kx_row[kc];
                    sum_y += value * ky_row[kc];
                }
            }
            let magnitude = (sum_x * sum_x + sum_y * sum_y).sqrt();
            gx.set(row, col, sum_x);
            gy.set(row, col, sum_y);
            mag.set(row, col, magnitude);
            peak = peak.max(magnitude);
        }
    }

    (gx, gy, mag, peak)
}

/// Thin edges to local maxima along the gradient direction.
///
/// The direction is quantized to four bins; a pixel survives only if its
/// magnitude is strictly greater than the forward neighbor and no smaller
/// than the backward one along its bin (the asymmetry keeps exactly one
/// side of a perfectly symmetric ridge). The outermost ring is skipped so
/// neighbor lookups stay in bounds.
fn suppress_non_maxima(gx: &FloatImage, gy: &FloatImage, mag: &FloatImage) -> FloatImage {
    let mut out = FloatImage::new(mag.width, mag.height);
    if mag.width < 3 || mag.height < 3 {
        return out;
    }

    for row in 1..mag.height - 1 {
        for col in 1..mag.width - 1 {
            let m = mag.get(row, col);
            if m <= 0.0 {
                continue;
            }

            // Quantize atan2 to one of four undirected axes.
            let angle = gy.get(row, col).atan2(gx.get(row, col));
            let octant = (angle * 4.0 / std::f32::consts::PI).round() as i32 & 3;
            let (dr, dc) = match octant {
                0 => (0, 1),  // horizontal gradient: compare left/right
                1 => (1, 1),  // rising diagonal
                2 => (1, 0),  // vertical gradient: compare up/down
                _ => (1, -1), // falling diagonal
            };

            let ahead = mag.get((row as i64 + dr) as usize, (col as i64 + dc) as usize);
            let behind = mag.get((row as i64 - dr) as usize, (col as i64 - dc) as usize);
            if m > ahead && m >= behind {
                out.set(row, col, m);
            }
        }
    }
    out
}

/// Double threshold with hysteresis: strong pixels seed an 8-connected
/// walk through weak candidates.
fn apply_hysteresis(mag: &FloatImage, low: f32, high: f32) -> EdgeGrid {
    let mut grid = EdgeGrid::new(mag.height, mag.width);
    let mut stack = Vec::new();

    for row in 0..mag.height {
        for col in 0..mag.width {
            if mag.get(row, col) >= high {
                grid.set(row, col, true);
                stack.push((row, col));
            }
        }
    }

    while let Some((row, col)) = stack.pop() {
        for dr in -1i64..=1 {
            for dc in -1i64..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let r = row as i64 + dr;
                let c = col as i64 + dc;
                if r < 0 || c < 0 || r >= mag.height as i64 || c >= mag.width as i64 {
                    continue;
                }
                let (r, c) = (r as usize, c as usize);
                if !grid.get(r, c) && mag.get(r, c) >= low {
                    grid.set(r, c, true);
                    stack.push((r, c));
                }
            }
        }
    }

    grid
}
