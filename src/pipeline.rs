//! The nine-stage raster change-detection pipeline.
//!
//! Each stage is a pure function consuming the previous stage's output and
//! returning a fresh value, so any stage can be unit tested (and audited) in
//! isolation. Stages are strictly sequential; only per-row work inside a
//! stage parallelizes under the `rayon` feature.

use crate::edge::refine_edges;
use crate::index::{evi, ndvi};
use crate::morphology::{
    closing, fill_small_holes, median_filter_3x3, opening, remove_small_objects, StructElement,
};
use crate::preprocess::preprocess_band;
use crate::raster::{ensure_same_shape, GeoTransform, Mask, Raster, RasterView};
use crate::smooth::{multiscale_field, threshold};
use crate::temporal::change_with_validity;
use crate::trace::{trace_event, trace_span};
use crate::util::{CanopyDiffError, CanopyDiffResult};
use crate::vectorize::{vectorize, PolygonRecord, VectorizeParams};

/// One multi-band snapshot: NIR and red reflectance views.
#[derive(Copy, Clone, Debug)]
pub struct Snapshot<'a> {
    /// Near-infrared band.
    pub nir: RasterView<'a, f32>,
    /// Red band.
    pub red: RasterView<'a, f32>,
}

impl<'a> Snapshot<'a> {
    /// Bundles a NIR/red band pair, verifying the two share a shape.
    pub fn new(nir: RasterView<'a, f32>, red: RasterView<'a, f32>) -> CanopyDiffResult<Self> {
        ensure_same_shape(
            (nir.width(), nir.height()),
            (red.width(), red.height()),
            "snapshot bands",
        )?;
        Ok(Self { nir, red })
    }

    fn shape(&self) -> (usize, usize) {
        (self.nir.width(), self.nir.height())
    }
}

/// Detection thresholds and stage tunables.
///
/// Defaults reproduce the reference parameterization (30 m pixels, balanced
/// forest and change thresholds). The morphological radii and the 10-pixel
/// floor are empirical configuration, not physical constants.
#[derive(Clone, Copy, Debug)]
pub struct DetectionParams {
    /// NDVI(before) above this marks a pixel as forest baseline.
    pub forest_ndvi_threshold: f32,
    /// EVI(before) above this also marks forest (either index suffices).
    pub forest_evi_threshold: f32,
    /// Minimum NDVI decrease for a loss candidate.
    pub ndvi_change_threshold: f32,
    /// Minimum EVI decrease for a loss candidate.
    pub evi_change_threshold: f32,
    /// Minimum region size in hectares; floored at 10 pixels.
    pub min_area_ha: f64,
    /// Ground size of one pixel in meters.
    pub pixel_size_m: f64,
    /// Disk radius for gap-bridging closing.
    pub closing_radius: usize,
    /// Disk radius for boundary-smoothing opening.
    pub opening_radius: usize,
    /// Interior holes up to this pixel area are filled.
    pub max_hole_area_px: usize,
    /// Fine Gaussian scale.
    pub fine_sigma: f32,
    /// Coarse Gaussian scale.
    pub coarse_sigma: f32,
    /// Weight of the fine scale in the blend.
    pub fine_weight: f32,
    /// Weight of the coarse scale in the blend.
    pub coarse_weight: f32,
    /// Re-threshold level recovering a mask from the smoothed field.
    pub smooth_threshold: f32,
    /// Gaussian scale for the Canny pass.
    pub canny_sigma: f32,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            forest_ndvi_threshold: 0.3,
            forest_evi_threshold: 0.3,
            ndvi_change_threshold: 0.12,
            evi_change_threshold: 0.1,
            min_area_ha: 0.09,
            pixel_size_m: 30.0,
            closing_radius: 2,
            opening_radius: 2,
            max_hole_area_px: 100,
            fine_sigma: 1.0,
            coarse_sigma: 2.0,
            fine_weight: 0.7,
            coarse_weight: 0.3,
            smooth_threshold: 0.4,
            canny_sigma: 1.5,
            canny_low: 0.2,
            canny_high: 0.6,
        }
    }
}

impl DetectionParams {
    fn validate(&self) -> CanopyDiffResult<()> {
        if self.pixel_size_m <= 0.0 {
            return Err(CanopyDiffError::InvalidParameter {
                name: "pixel_size_m",
                reason: "must be positive",
            });
        }
        if self.fine_sigma <= 0.0 || self.coarse_sigma <= 0.0 || self.canny_sigma <= 0.0 {
            return Err(CanopyDiffError::InvalidParameter {
                name: "sigma",
                reason: "smoothing scales must be positive",
            });
        }
        if self.canny_low > self.canny_high {
            return Err(CanopyDiffError::InvalidParameter {
                name: "canny_low",
                reason: "must not exceed canny_high",
            });
        }
        Ok(())
    }

    fn min_pixels(&self) -> usize {
        let from_area = self.min_area_ha * 10_000.0 / (self.pixel_size_m * self.pixel_size_m);
        (from_area as usize).max(10)
    }
}

/// Full output of one detection run.
#[derive(Debug)]
pub struct DetectionReport {
    /// Scored loss polygons, largest area first.
    pub polygons: Vec<PolygonRecord>,
    /// Final boolean change mask.
    pub mask: Mask,
    /// NDVI change array (before - after), for downstream inspection.
    pub ndvi_change: Raster<f32>,
    /// Total detected area in hectares (over the final mask).
    pub total_area_ha: f64,
    /// Number of returned polygons.
    pub num_features: usize,
}

impl DetectionReport {
    /// Aggregate view for the serving layer.
    pub fn summary(&self) -> DetectionSummary {
        let mean_confidence = if self.polygons.is_empty() {
            0.0
        } else {
            self.polygons.iter().map(|p| p.confidence).sum::<f64>() / self.polygons.len() as f64
        };
        DetectionSummary {
            num_features: self.num_features,
            total_area_ha: self.total_area_ha,
            mean_confidence,
        }
    }
}

/// Aggregate statistics of a detection run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectionSummary {
    /// Number of detected polygons.
    pub num_features: usize,
    /// Total detected area in hectares.
    pub total_area_ha: f64,
    /// Mean polygon confidence (0 when nothing was detected).
    pub mean_confidence: f64,
}

/// Runs the nine-stage deforestation detection pipeline.
///
/// Fails fast on shape mismatches or invalid parameters; an unchanged scene
/// is a successful run with an empty polygon list, all-false mask and zero
/// area.
pub fn detect_forest_loss(
    before: Snapshot<'_>,
    after: Snapshot<'_>,
    geo: &GeoTransform,
    params: &DetectionParams,
) -> CanopyDiffResult<DetectionReport> {
    params.validate()?;
    ensure_same_shape(before.shape(), after.shape(), "before/after snapshots")?;

    // Stage 1: atmospheric correction and normalization.
    let stage = trace_span!("preprocess").entered();
    let before_nir = preprocess_band(before.nir);
    let before_red = preprocess_band(before.red);
    let after_nir = preprocess_band(after.nir);
    let after_red = preprocess_band(after.red);
    drop(stage);

    // Stage 2: dual vegetation indices per snapshot.
    let stage = trace_span!("indices").entered();
    let ndvi_before = ndvi(before_nir.view(), before_red.view())?;
    let ndvi_after = ndvi(after_nir.view(), after_red.view())?;
    let evi_before = evi(before_nir.view(), before_red.view())?;
    let evi_after = evi(after_nir.view(), after_red.view())?;
    drop(stage);

    detect_from_indices(
        &ndvi_before,
        &ndvi_after,
        &evi_before,
        &evi_after,
        geo,
        params,
    )
}

/// Runs stages 3-9 over precomputed vegetation indices.
///
/// Entry point for callers that already carry NDVI/EVI rasters (or only one
/// pair; pass the same arrays for both indices). Same contract as
/// [`detect_forest_loss`].
pub fn detect_from_indices(
    ndvi_before: &Raster<f32>,
    ndvi_after: &Raster<f32>,
    evi_before: &Raster<f32>,
    evi_after: &Raster<f32>,
    geo: &GeoTransform,
    params: &DetectionParams,
) -> CanopyDiffResult<DetectionReport> {
    params.validate()?;
    ensure_same_shape(
        (ndvi_before.width(), ndvi_before.height()),
        (evi_before.width(), evi_before.height()),
        "ndvi/evi arrays",
    )?;

    // Stage 3: multi-temporal change with robust outlier rejection.
    let stage = trace_span!("temporal_filter").entered();
    let ndvi_temporal = change_with_validity(ndvi_before, ndvi_after)?;
    let evi_temporal = change_with_validity(evi_before, evi_after)?;
    let valid: Vec<bool> = ndvi_temporal
        .valid
        .as_slice()
        .iter()
        .zip(evi_temporal.valid.as_slice())
        .map(|(&a, &b)| a && b)
        .collect();
    drop(stage);

    // Stage 4: forest baseline and loss candidates (either index suffices).
    let stage = trace_span!("mask_construction").entered();
    let width = ndvi_before.width();
    let height = ndvi_before.height();
    let mut mask_data = vec![false; width * height];
    for (i, out) in mask_data.iter_mut().enumerate() {
        let forest = ndvi_before.as_slice()[i] > params.forest_ndvi_threshold
            || evi_before.as_slice()[i] > params.forest_evi_threshold;
        let ndvi_loss = ndvi_temporal.change.as_slice()[i] > params.ndvi_change_threshold;
        let evi_loss = evi_temporal.change.as_slice()[i] > params.evi_change_threshold;
        *out = forest && valid[i] && (ndvi_loss || evi_loss);
    }
    let mask = Mask::from_vec(mask_data, width, height)?;
    trace_event!("initial_detection", pixels = mask.count_foreground());
    drop(stage);

    // Stage 5: ordered morphological refinement.
    let stage = trace_span!("morphology").entered();
    let mask = median_filter_3x3(&mask);
    let mask = remove_small_objects(&mask, params.min_pixels());
    let mask = closing(&mask, &StructElement::disk(params.closing_radius));
    let mask = fill_small_holes(&mask, params.max_hole_area_px);
    let mask = opening(&mask, &StructElement::disk(params.opening_radius));
    trace_event!("after_morphology", pixels = mask.count_foreground());
    drop(stage);

    // Stage 6: multi-scale smoothing for natural boundaries.
    let stage = trace_span!("smoothing").entered();
    let field = multiscale_field(
        &mask,
        params.fine_sigma,
        params.coarse_sigma,
        params.fine_weight,
        params.coarse_weight,
    );
    let smoothed_mask = threshold(&field, params.smooth_threshold);
    drop(stage);

    // Stage 7: edge refinement recovering thin boundary segments.
    let stage = trace_span!("edge_refinement").entered();
    let final_mask = refine_edges(
        &smoothed_mask,
        &field,
        params.canny_sigma,
        params.canny_low,
        params.canny_high,
    );
    drop(stage);

    // Stage 8: vectorization and per-polygon scoring.
    let stage = trace_span!("vectorize").entered();
    let polygons = vectorize(
        &final_mask,
        geo,
        &ndvi_temporal.change,
        &evi_temporal.change,
        &VectorizeParams {
            pixel_size_m: params.pixel_size_m,
            min_contour_points: 4,
        },
    );
    drop(stage);

    // Stage 9: aggregate metrics.
    let total_pixels = final_mask.count_foreground();
    let total_area_ha =
        total_pixels as f64 * params.pixel_size_m * params.pixel_size_m / 10_000.0;
    trace_event!(
        "detection_complete",
        features = polygons.len(),
        total_area_ha = total_area_ha
    );

    let num_features = polygons.len();
    Ok(DetectionReport {
        polygons,
        mask: final_mask,
        ndvi_change: ndvi_temporal.change,
        total_area_ha,
        num_features,
    })
}
