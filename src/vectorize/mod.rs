//! Vectorization of the final change mask into scored polygon records.
//!
//! Contours come out of marching squares with sub-pixel coordinates, are
//! simplified with an area-adaptive Douglas-Peucker tolerance, mapped to
//! geographic coordinates, and scored by sampling the index-change arrays
//! inside the unsimplified boundary. The returned list is sorted by
//! descending hectare area; consumers rely on that ordering.

use crate::raster::{GeoTransform, Mask, Raster};
use crate::trace::trace_event;

mod contour;
mod simplify;

pub use contour::{find_contours, Contour};
pub use simplify::simplify_dp;

/// Qualitative loss severity derived from the mean NDVI change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Mean NDVI change above 0.3.
    High,
    /// Any detected loss below the high threshold.
    Moderate,
}

/// One detected vegetation-loss region.
///
/// Created once per connected region in the final mask and never mutated;
/// the ring is closed (first coordinate equals last).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolygonRecord {
    /// Stable id within one detection run (contour order).
    pub id: usize,
    /// Closed ring of (lon, lat) pairs.
    pub ring: Vec<(f64, f64)>,
    /// Region area in hectares (3 decimals).
    pub area_ha: f64,
    /// Region area in whole pixels.
    pub area_pixels: usize,
    /// Detection confidence in [0, 1] (2 decimals).
    pub confidence: f64,
    /// Mean NDVI decrease inside the region (3 decimals).
    pub ndvi_change: f64,
    /// Mean EVI decrease inside the region (3 decimals).
    pub evi_change: f64,
    /// Severity label.
    pub severity: Severity,
}

/// Tunables for vectorization (defaults match the reference pipeline).
#[derive(Clone, Copy, Debug)]
pub struct VectorizeParams {
    /// Ground size of one pixel in meters.
    pub pixel_size_m: f64,
    /// Contours with fewer points are discarded as noise.
    pub min_contour_points: usize,
}

impl Default for VectorizeParams {
    fn default() -> Self {
        Self {
            pixel_size_m: 30.0,
            min_contour_points: 4,
        }
    }
}

/// Converts the final mask into scored polygon records.
///
/// Degenerate contours (fewer than `min_contour_points` before
/// simplification, fewer than 3 points after) are dropped silently; an empty
/// mask yields an empty list.
pub fn vectorize(
    mask: &Mask,
    geo: &GeoTransform,
    ndvi_change: &Raster<f32>,
    evi_change: &Raster<f32>,
    params: &VectorizeParams,
) -> Vec<PolygonRecord> {
    let contours = find_contours(mask);
    let mut polygons = Vec::new();

    for (id, contour) in contours.iter().enumerate() {
        if contour.len() < params.min_contour_points {
            continue;
        }

        let area_pixels = shoelace_area(contour);
        // Larger regions tolerate proportionally more simplification.
        let tolerance = (area_pixels.sqrt() * 0.05).max(1.0);
        let simplified = simplify_dp(contour, tolerance);
        if simplified.len() < 3 {
            continue;
        }

        let mut ring: Vec<(f64, f64)> = simplified
            .iter()
            .map(|&(row, col)| geo.pixel_to_geo(row, col))
            .collect();
        if ring.first() != ring.last() {
            if let Some(&first) = ring.first() {
                ring.push(first);
            }
        }

        // Sample the change arrays inside the unsimplified boundary.
        let inside = rasterize_contour(contour, mask.width(), mask.height());
        let (mean_ndvi, mean_evi, sampled) = mean_changes(&inside, ndvi_change, evi_change);
        let confidence = if sampled > 0 {
            (0.5 + (mean_ndvi + mean_evi) / 0.8).min(1.0)
        } else {
            0.7
        };

        let area_ha = area_pixels * params.pixel_size_m * params.pixel_size_m / 10_000.0;
        polygons.push(PolygonRecord {
            id,
            ring,
            area_ha: round_to(area_ha, 3),
            area_pixels: area_pixels as usize,
            confidence: round_to(confidence, 2),
            ndvi_change: round_to(mean_ndvi, 3),
            evi_change: round_to(mean_evi, 3),
            severity: if mean_ndvi > 0.3 {
                Severity::High
            } else {
                Severity::Moderate
            },
        });
    }

    // Largest regions first; consumers rely on this ordering.
    polygons.sort_by(|a, b| {
        b.area_ha
            .partial_cmp(&a.area_ha)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    trace_event!("vectorized", polygons = polygons.len());
    polygons
}

/// Unsigned shoelace area of a closed contour in pixel units.
fn shoelace_area(contour: &[(f64, f64)]) -> f64 {
    let mut acc = 0.0;
    for pair in contour.windows(2) {
        let (r1, c1) = pair[0];
        let (r2, c2) = pair[1];
        acc += c1 * r2 - c2 * r1;
    }
    (acc / 2.0).abs()
}

/// Even-odd scanline fill of a contour into a pixel mask.
fn rasterize_contour(contour: &[(f64, f64)], width: usize, height: usize) -> Mask {
    let mut out = Mask::filled(width, height, false);
    let min_row = contour.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_row = contour
        .iter()
        .map(|p| p.0)
        .fold(f64::NEG_INFINITY, f64::max);
    let row_lo = min_row.floor().max(0.0) as usize;
    let row_hi = (max_row.ceil() as isize).min(height as isize - 1).max(0) as usize;

    let mut crossings: Vec<f64> = Vec::new();
    for row in row_lo..=row_hi {
        let y = row as f64;
        crossings.clear();
        for pair in contour.windows(2) {
            let (r1, c1) = pair[0];
            let (r2, c2) = pair[1];
            if (r1 <= y && y < r2) || (r2 <= y && y < r1) {
                crossings.push(c1 + (y - r1) * (c2 - c1) / (r2 - r1));
            }
        }
        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        for span in crossings.chunks_exact(2) {
            let lo = span[0].ceil().max(0.0) as usize;
            let hi = (span[1].floor() as isize).min(width as isize - 1).max(-1);
            for col in lo..=hi.max(0) as usize {
                if (col as f64) >= span[0] && (col as f64) <= span[1] {
                    out.set(col, row, true);
                }
            }
        }
    }
    out
}

fn mean_changes(inside: &Mask, ndvi: &Raster<f32>, evi: &Raster<f32>) -> (f64, f64, usize) {
    let mut ndvi_sum = 0.0f64;
    let mut evi_sum = 0.0f64;
    let mut count = 0usize;
    for row in 0..inside.height() {
        for col in 0..inside.width() {
            if inside.at(col, row) {
                ndvi_sum += f64::from(ndvi.at(col, row));
                evi_sum += f64::from(evi.at(col, row));
                count += 1;
            }
        }
    }
    if count == 0 {
        (0.0, 0.0, 0)
    } else {
        (ndvi_sum / count as f64, evi_sum / count as f64, count)
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
