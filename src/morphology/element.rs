//! Disk structuring element for binary morphology.

/// Disk-shaped structuring element expressed as neighborhood offsets.
///
/// A disk of radius `r` contains every offset `(dx, dy)` with
/// `dx*dx + dy*dy <= r*r`, matching the discrete disk used by common
/// raster-morphology toolkits.
#[derive(Clone, Debug)]
pub struct StructElement {
    offsets: Vec<(isize, isize)>,
}

impl StructElement {
    /// Builds a disk of the given radius. Radius 0 is the identity element.
    pub fn disk(radius: usize) -> Self {
        let r = radius as isize;
        let r2 = r * r;
        let mut offsets = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r2 {
                    offsets.push((dx, dy));
                }
            }
        }
        Self { offsets }
    }

    /// Neighborhood offsets covered by the element.
    pub fn offsets(&self) -> &[(isize, isize)] {
        &self.offsets
    }
}
