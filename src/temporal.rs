//! Multi-temporal change filtering.
//!
//! The change array is `before - after` (positive change means vegetation
//! loss). Outliers such as clouds, shadows and registration error are
//! flagged with a robust z-score built on the median absolute deviation,
//! which shrugs off the heavy tails that would inflate a
//! mean/standard-deviation cut.

use crate::raster::{ensure_same_shape, Mask, Raster};
use crate::util::stats::{mad, median};
use crate::util::CanopyDiffResult;

const EPS: f32 = 1e-8;

/// Change array plus the validity mask excluding statistical outliers.
pub struct TemporalChange {
    /// Per-pixel index decrease (`before - after`).
    pub change: Raster<f32>,
    /// True where the change is within 3 robust standard deviations.
    pub valid: Mask,
}

/// Computes `before - after` and masks pixels whose robust z-score
/// `0.6745 * (x - median) / (mad + eps)` reaches magnitude 3.
///
/// A zero MAD means the bulk of the scene is constant and the spread
/// estimate is degenerate; the filter is disabled (everything valid) rather
/// than flagging any departure from the majority value as an outlier. An
/// unchanged scene therefore stays fully valid and flows through as an
/// empty detection.
pub fn change_with_validity(
    before: &Raster<f32>,
    after: &Raster<f32>,
) -> CanopyDiffResult<TemporalChange> {
    ensure_same_shape(
        (before.width(), before.height()),
        (after.width(), after.height()),
        "before/after index arrays",
    )?;

    let data: Vec<f32> = before
        .as_slice()
        .iter()
        .zip(after.as_slice())
        .map(|(&b, &a)| b - a)
        .collect();
    let change = Raster::from_vec(data, before.width(), before.height())?;

    let center = median(change.as_slice());
    let spread = mad(change.as_slice(), center);
    let valid = if spread == 0.0 {
        Mask::filled(change.width(), change.height(), true)
    } else {
        change.map(|v| {
            let z = 0.6745 * (v - center) / (spread + EPS);
            z.abs() < 3.0
        })
    };

    Ok(TemporalChange { change, valid })
}
