//! Band preprocessing: atmospheric correction and normalization.
//!
//! Both operations select their percentile base from the strictly positive
//! pixels, the usual convention for optical reflectance where zeros mark
//! nodata. When a band has no positive pixel at all the whole array becomes
//! the percentile base; a constant band normalizes to all zeros. Both rules
//! are deliberate fallbacks so fully masked scenes flow through the pipeline
//! instead of failing.

use crate::raster::{Raster, RasterView};
use crate::util::stats::percentile;

const EPS: f32 = 1e-8;

/// Dark-object subtraction: estimates the atmospheric offset as the 2nd
/// percentile of positive pixels and removes it, clamping at zero.
pub fn atmospheric_correction(band: RasterView<'_, f32>) -> Raster<f32> {
    let raster = band.to_raster();
    let dark = percentile(&positive_or_all(raster.as_slice()), 2.0);
    raster.map(|v| (v - dark).max(0.0))
}

/// Clips a band to its [p1, p99] positive-pixel range and rescales the
/// result to [0, 1].
///
/// Clipping removes sensor artifacts and unmasked cloud extremes before the
/// linear rescale; the epsilon keeps a constant band from dividing by zero
/// (it maps to all zeros).
pub fn normalize_band(band: RasterView<'_, f32>) -> Raster<f32> {
    let raster = band.to_raster();
    let base = positive_or_all(raster.as_slice());
    let p1 = percentile(&base, 1.0);
    let p99 = percentile(&base, 99.0);
    let clipped = raster.map(|v| v.clamp(p1.min(p99), p99.max(p1)));

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in clipped.as_slice() {
        min = min.min(v);
        max = max.max(v);
    }
    let range = max - min + EPS;
    clipped.map(|v| (v - min) / range)
}

/// Corrects and normalizes a band in one call (pipeline stage 1 order).
pub fn preprocess_band(band: RasterView<'_, f32>) -> Raster<f32> {
    let corrected = atmospheric_correction(band);
    normalize_band(corrected.view())
}

fn positive_or_all(values: &[f32]) -> Vec<f32> {
    let positive: Vec<f32> = values.iter().copied().filter(|&v| v > 0.0).collect();
    if positive.is_empty() {
        values.to_vec()
    } else {
        positive
    }
}
