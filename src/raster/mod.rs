//! Raster grids and geo-referencing.
//!
//! `RasterView` is a borrowed 2D view into a 1D buffer with an explicit
//! stride; the stride counts elements between the starts of consecutive rows,
//! so a stride larger than the width represents padded rows. `Raster` is the
//! owned contiguous counterpart used for everything the pipeline produces:
//! every stage consumes views or rasters and returns a fresh `Raster`, never
//! mutating its input.

use crate::util::{CanopyDiffError, CanopyDiffResult};

pub mod geo;

pub use geo::GeoTransform;

/// Boolean raster produced and refined by the detection pipeline.
pub type Mask = Raster<bool>;

/// Borrowed 2D raster view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct RasterView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> RasterView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> CanopyDiffResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(
        data: &'a [T],
        width: usize,
        height: usize,
        stride: usize,
    ) -> CanopyDiffResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(CanopyDiffError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the raster width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the raster height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the element at `(col, row)` if it is within bounds.
    pub fn get(&self, col: usize, row: usize) -> Option<&'a T> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.stride + col)
    }

    /// Returns a contiguous slice for row `row` with length `width`.
    pub fn row(&self, row: usize) -> Option<&'a [T]> {
        if row >= self.height {
            return None;
        }
        let start = row * self.stride;
        self.data.get(start..start + self.width)
    }
}

impl<'a, T: Copy> RasterView<'a, T> {
    /// Copies the view into an owned contiguous raster.
    pub fn to_raster(&self) -> Raster<T> {
        let mut data = Vec::with_capacity(self.width * self.height);
        for row in 0..self.height {
            data.extend_from_slice(self.row(row).expect("row within bounds"));
        }
        Raster {
            data,
            width: self.width,
            height: self.height,
        }
    }
}

/// Owned contiguous 2D raster.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Copy> Raster<T> {
    /// Creates a raster filled with `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Wraps an existing buffer; `data.len()` must equal `width * height`.
    pub fn from_vec(data: Vec<T>, width: usize, height: usize) -> CanopyDiffResult<Self> {
        if width == 0 || height == 0 {
            return Err(CanopyDiffError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(CanopyDiffError::InvalidDimensions { width, height })?;
        if data.len() != needed {
            return Err(CanopyDiffError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the raster width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the raster height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the backing slice in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns the element at `(col, row)`; panics when out of bounds.
    #[inline]
    pub fn at(&self, col: usize, row: usize) -> T {
        debug_assert!(col < self.width && row < self.height);
        self.data[row * self.width + col]
    }

    /// Sets the element at `(col, row)`; panics when out of bounds.
    #[inline]
    pub fn set(&mut self, col: usize, row: usize, value: T) {
        debug_assert!(col < self.width && row < self.height);
        self.data[row * self.width + col] = value;
    }

    /// Returns a contiguous slice for row `row`.
    #[inline]
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }

    /// Returns a borrowed view of the whole raster.
    pub fn view(&self) -> RasterView<'_, T> {
        RasterView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Applies `f` to every element, producing a new raster of the results.
    pub fn map<U: Copy, F: Fn(T) -> U>(&self, f: F) -> Raster<U> {
        Raster {
            data: self.data.iter().map(|&v| f(v)).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

impl Mask {
    /// Number of foreground (true) pixels.
    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// Fails with [`CanopyDiffError::ShapeMismatch`] unless both shapes agree.
pub(crate) fn ensure_same_shape(
    expected: (usize, usize),
    got: (usize, usize),
    context: &'static str,
) -> CanopyDiffResult<()> {
    if expected != got {
        return Err(CanopyDiffError::ShapeMismatch {
            expected_width: expected.0,
            expected_height: expected.1,
            width: got.0,
            height: got.1,
            context,
        });
    }
    Ok(())
}

fn required_len(width: usize, height: usize, stride: usize) -> CanopyDiffResult<usize> {
    if width == 0 || height == 0 {
        return Err(CanopyDiffError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(CanopyDiffError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(CanopyDiffError::InvalidDimensions { width, height })
}
