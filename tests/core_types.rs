use canopydiff::{CanopyDiffError, Raster, RasterView};

#[test]
fn raster_view_rejects_invalid_dimensions() {
    let data = [0.0f32; 4];

    let err = RasterView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        CanopyDiffError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = RasterView::from_slice(&data, 1, 0).err().unwrap();
    assert_eq!(
        err,
        CanopyDiffError::InvalidDimensions {
            width: 1,
            height: 0,
        }
    );
}

#[test]
fn raster_view_rejects_invalid_stride() {
    let data = [0.0f32; 8];

    let err = RasterView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        CanopyDiffError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );
}

#[test]
fn raster_view_rejects_small_buffer() {
    let data = [0.0f32; 3];

    let err = RasterView::new(&data, 2, 2, 2).err().unwrap();
    assert_eq!(err, CanopyDiffError::BufferTooSmall { needed: 4, got: 3 });
}

#[test]
fn strided_view_skips_row_padding() {
    // 3x2 view over rows of stride 4; the last column is padding.
    let data: Vec<f32> = (0..8).map(|v| v as f32).collect();
    let view = RasterView::new(&data, 3, 2, 4).unwrap();

    assert_eq!(view.stride(), 4);
    assert_eq!(view.row(0).unwrap(), &[0.0, 1.0, 2.0]);
    assert_eq!(view.row(1).unwrap(), &[4.0, 5.0, 6.0]);
    assert_eq!(view.get(2, 1), Some(&6.0));
    assert_eq!(view.get(3, 0), None);
    assert!(view.row(2).is_none());

    // Owned copy drops the padding.
    let owned = view.to_raster();
    assert_eq!(owned.as_slice(), &[0.0, 1.0, 2.0, 4.0, 5.0, 6.0]);
    assert_eq!(owned.at(1, 1), 5.0);
}

#[test]
fn raster_from_vec_checks_length() {
    let err = Raster::from_vec(vec![0.0f32; 5], 2, 3).err().unwrap();
    assert_eq!(err, CanopyDiffError::BufferTooSmall { needed: 6, got: 5 });

    let raster = Raster::from_vec(vec![1.0f32; 6], 2, 3).unwrap();
    assert_eq!(raster.width(), 2);
    assert_eq!(raster.height(), 3);
    assert_eq!(raster.view().row(2).unwrap(), &[1.0, 1.0]);
}

#[test]
fn mask_counts_foreground() {
    let mask = Raster::from_vec(vec![true, false, true, false], 2, 2).unwrap();
    assert_eq!(mask.count_foreground(), 2);
    assert_eq!(mask.map(|v| !v).count_foreground(), 2);
}
