//! Vegetation index computation.
//!
//! Both indices are pure functions over equally shaped NIR/red bands,
//! epsilon-guarded against zero denominators and clipped to [-1, 1] whatever
//! the input magnitudes. Index selection is a closed enum rather than a
//! runtime string.

use crate::raster::{ensure_same_shape, Raster, RasterView};
use crate::util::CanopyDiffResult;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

const EPS: f32 = 1e-8;

/// Available vegetation indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VegetationIndex {
    /// Normalized Difference Vegetation Index.
    Ndvi,
    /// Enhanced Vegetation Index, simplified two-band form (no blue band).
    Evi,
}

impl VegetationIndex {
    /// Computes this index over an NIR/red band pair.
    pub fn compute(
        self,
        nir: RasterView<'_, f32>,
        red: RasterView<'_, f32>,
    ) -> CanopyDiffResult<Raster<f32>> {
        match self {
            VegetationIndex::Ndvi => ndvi(nir, red),
            VegetationIndex::Evi => evi(nir, red),
        }
    }
}

/// NDVI = (NIR - Red) / (NIR + Red), clipped to [-1, 1].
pub fn ndvi(nir: RasterView<'_, f32>, red: RasterView<'_, f32>) -> CanopyDiffResult<Raster<f32>> {
    index_map(nir, red, |n, r| (n - r) / (n + r + EPS))
}

/// Simplified EVI = 2.5 * (NIR - Red) / (NIR + 6 * Red), clipped to [-1, 1].
///
/// More sensitive to dense canopy than NDVI and less affected by residual
/// atmosphere; the blue-band aerosol term is dropped because the pipeline
/// only receives two bands.
pub fn evi(nir: RasterView<'_, f32>, red: RasterView<'_, f32>) -> CanopyDiffResult<Raster<f32>> {
    index_map(nir, red, |n, r| 2.5 * (n - r) / (n + 6.0 * r + EPS))
}

fn index_map<F>(
    nir: RasterView<'_, f32>,
    red: RasterView<'_, f32>,
    f: F,
) -> CanopyDiffResult<Raster<f32>>
where
    F: Fn(f32, f32) -> f32 + Sync,
{
    ensure_same_shape(
        (nir.width(), nir.height()),
        (red.width(), red.height()),
        "nir/red bands",
    )?;

    let width = nir.width();
    let height = nir.height();
    let mut data = vec![0.0f32; width * height];

    let fill_row = |row: usize, out: &mut [f32]| {
        let nir_row = nir.row(row).expect("row within bounds");
        let red_row = red.row(row).expect("row within bounds");
        for (out, (&n, &r)) in out.iter_mut().zip(nir_row.iter().zip(red_row)) {
            *out = f(n, r).clamp(-1.0, 1.0);
        }
    };

    #[cfg(feature = "rayon")]
    data.par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out)| fill_row(row, out));

    #[cfg(not(feature = "rayon"))]
    for (row, out) in data.chunks_mut(width).enumerate() {
        fill_row(row, out);
    }

    Raster::from_vec(data, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::CanopyDiffError;

    fn view(data: &[f32], w: usize, h: usize) -> RasterView<'_, f32> {
        RasterView::from_slice(data, w, h).unwrap()
    }

    #[test]
    fn ndvi_is_bounded_for_extreme_inputs() {
        let nir = [1e6f32, 0.0, -5.0, 0.9];
        let red = [0.0f32, 1e6, 5.0, 0.1];
        let out = ndvi(view(&nir, 2, 2), view(&red, 2, 2)).unwrap();
        for &v in out.as_slice() {
            assert!((-1.0..=1.0).contains(&v), "ndvi {v} outside [-1, 1]");
        }
    }

    #[test]
    fn evi_is_bounded_for_extreme_inputs() {
        let nir = [1e6f32, 0.0, -5.0, 0.9];
        let red = [0.0f32, 1e6, 5.0, 0.1];
        let out = evi(view(&nir, 2, 2), view(&red, 2, 2)).unwrap();
        for &v in out.as_slice() {
            assert!((-1.0..=1.0).contains(&v), "evi {v} outside [-1, 1]");
        }
    }

    #[test]
    fn dense_canopy_scores_high_ndvi() {
        let nir = [0.8f32];
        let red = [0.1f32];
        let out = ndvi(view(&nir, 1, 1), view(&red, 1, 1)).unwrap();
        assert!(out.at(0, 0) > 0.7);
    }

    #[test]
    fn mismatched_bands_fail_fast() {
        let nir = [0.5f32; 6];
        let red = [0.5f32; 4];
        let err = ndvi(view(&nir, 3, 2), view(&red, 2, 2)).unwrap_err();
        assert_eq!(
            err,
            CanopyDiffError::ShapeMismatch {
                expected_width: 3,
                expected_height: 2,
                width: 2,
                height: 2,
                context: "nir/red bands",
            }
        );
    }
}
