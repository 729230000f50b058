//! Canny-style edge refinement of the smoothed mask field.
//!
//! Aggressive smoothing can erase thin connective boundary segments; this
//! stage recovers them by detecting edges on the continuous field, dilating
//! them one pixel, and folding them back into the mask.

use crate::morphology::{closing, dilate, StructElement};
use crate::raster::{Mask, Raster};
use crate::smooth::gaussian_blur;

/// Canny edge detector over a continuous field.
///
/// The field is pre-blurred with `sigma`, Sobel gradients drive
/// direction-binned non-maximum suppression, and `low`/`high` hysteresis
/// thresholds on gradient magnitude link weak edges to strong ones. A
/// constant field yields no edges.
pub fn canny(field: &Raster<f32>, sigma: f32, low: f32, high: f32) -> Mask {
    let width = field.width();
    let height = field.height();
    let blurred = gaussian_blur(field, sigma);

    // 3x3 Sobel gradients, edge-clamped.
    let sample = |col: isize, row: isize| -> f32 {
        let c = col.clamp(0, width as isize - 1) as usize;
        let r = row.clamp(0, height as isize - 1) as usize;
        blurred.at(c, r)
    };
    let mut gx = vec![0.0f32; width * height];
    let mut gy = vec![0.0f32; width * height];
    let mut mag = vec![0.0f32; width * height];
    for row in 0..height {
        for col in 0..width {
            let (c, r) = (col as isize, row as isize);
            let x = (sample(c + 1, r - 1) + 2.0 * sample(c + 1, r) + sample(c + 1, r + 1))
                - (sample(c - 1, r - 1) + 2.0 * sample(c - 1, r) + sample(c - 1, r + 1));
            let y = (sample(c - 1, r + 1) + 2.0 * sample(c, r + 1) + sample(c + 1, r + 1))
                - (sample(c - 1, r - 1) + 2.0 * sample(c, r - 1) + sample(c + 1, r - 1));
            let idx = row * width + col;
            gx[idx] = x;
            gy[idx] = y;
            mag[idx] = (x * x + y * y).sqrt();
        }
    }

    // Non-maximum suppression along the quantized gradient direction.
    let mut thin = vec![0.0f32; width * height];
    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            let m = mag[idx];
            if m == 0.0 {
                continue;
            }
            let angle = gy[idx].atan2(gx[idx]).to_degrees();
            let angle = if angle < 0.0 { angle + 180.0 } else { angle };
            let (dc, dr) = if !(22.5..157.5).contains(&angle) {
                (1isize, 0isize)
            } else if angle < 67.5 {
                (1, 1)
            } else if angle < 112.5 {
                (0, 1)
            } else {
                (1, -1)
            };
            let neighbor = |dc: isize, dr: isize| -> f32 {
                let (c, r) = (col as isize + dc, row as isize + dr);
                if c < 0 || r < 0 || c >= width as isize || r >= height as isize {
                    0.0
                } else {
                    mag[r as usize * width + c as usize]
                }
            };
            if m >= neighbor(dc, dr) && m >= neighbor(-dc, -dr) {
                thin[idx] = m;
            }
        }
    }

    // Hysteresis: grow strong edges through connected weak ones.
    let mut edges = Mask::filled(width, height, false);
    let mut stack = Vec::new();
    for row in 0..height {
        for col in 0..width {
            if thin[row * width + col] >= high && !edges.at(col, row) {
                edges.set(col, row, true);
                stack.push((col, row));
                while let Some((c, r)) = stack.pop() {
                    for dr in -1isize..=1 {
                        for dc in -1isize..=1 {
                            let (nc, nr) = (c as isize + dc, r as isize + dr);
                            if nc < 0 || nr < 0 || nc >= width as isize || nr >= height as isize {
                                continue;
                            }
                            let (nc, nr) = (nc as usize, nr as usize);
                            if !edges.at(nc, nr) && thin[nr * width + nc] >= low {
                                edges.set(nc, nr, true);
                                stack.push((nc, nr));
                            }
                        }
                    }
                }
            }
        }
    }
    edges
}

/// Merges dilated edges back into the smoothed mask and closes the result.
pub fn refine_edges(mask: &Mask, field: &Raster<f32>, sigma: f32, low: f32, high: f32) -> Mask {
    let edges = canny(field, sigma, low, high);
    let edges = dilate(&edges, &StructElement::disk(1));
    let merged_data: Vec<bool> = mask
        .as_slice()
        .iter()
        .zip(edges.as_slice())
        .map(|(&m, &e)| m | e)
        .collect();
    let merged =
        Mask::from_vec(merged_data, mask.width(), mask.height()).expect("merge preserves shape");
    closing(&merged, &StructElement::disk(1))
}
