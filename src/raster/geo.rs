//! Geo-referencing transform.

/// Affine transform mapping pixel indices to geographic coordinates.
///
/// Mirrors the conventional 6-element GDAL layout
/// `(origin_lon, pixel_width, 0, origin_lat, 0, -pixel_height)`: column
/// index scales by the pixel width along longitude, row index scales by the
/// (negative) pixel height along latitude. Immutable once constructed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoTransform {
    origin_lon: f64,
    pixel_width: f64,
    origin_lat: f64,
    row_step: f64,
}

impl GeoTransform {
    /// Builds a transform from the 6-element affine tuple.
    ///
    /// The rotation terms (indices 2 and 4) are ignored; the inputs this
    /// crate consumes are north-up rasters where both are zero.
    pub fn from_affine(affine: [f64; 6]) -> Self {
        Self {
            origin_lon: affine[0],
            pixel_width: affine[1],
            origin_lat: affine[3],
            row_step: affine[5],
        }
    }

    /// Builds a north-up transform from an origin and pixel size in degrees.
    pub fn north_up(origin_lon: f64, origin_lat: f64, pixel_deg: f64) -> Self {
        Self {
            origin_lon,
            pixel_width: pixel_deg,
            origin_lat,
            row_step: -pixel_deg,
        }
    }

    /// Maps a (possibly sub-pixel) `(row, col)` position to `(lon, lat)`.
    pub fn pixel_to_geo(&self, row: f64, col: f64) -> (f64, f64) {
        (
            self.origin_lon + col * self.pixel_width,
            self.origin_lat + row * self.row_step,
        )
    }
}
