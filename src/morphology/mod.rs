//! Binary morphology over boolean masks.
//!
//! Every operation consumes a mask and returns a new one; the refinement
//! sequence in the pipeline is order-significant, with later steps assuming
//! earlier noise is already gone. Border handling follows the usual raster
//! toolkit conventions: the median filter reflects at the border, dilation
//! never writes outside the raster, and erosion treats out-of-raster pixels
//! as foreground so regions flush against the scene edge keep their rim
//! through closing and opening.

use crate::raster::Mask;

mod components;
mod element;

pub use components::{fill_small_holes, remove_small_objects};
pub use element::StructElement;

/// 3x3 median filter for salt-and-pepper noise.
///
/// A pixel survives when at least 5 of the 9 window positions are
/// foreground. The window reflects at the raster border (for a radius-1
/// window reflection is index clamping), so border pixels are judged on
/// their actual neighborhood rather than against implicit background.
pub fn median_filter_3x3(mask: &Mask) -> Mask {
    let width = mask.width();
    let height = mask.height();
    let mut out = Mask::filled(width, height, false);
    for row in 0..height {
        for col in 0..width {
            let mut count = 0;
            for dr in -1isize..=1 {
                for dc in -1isize..=1 {
                    let c = (col as isize + dc).clamp(0, width as isize - 1) as usize;
                    let r = (row as isize + dr).clamp(0, height as isize - 1) as usize;
                    if mask.at(c, r) {
                        count += 1;
                    }
                }
            }
            if count >= 5 {
                out.set(col, row, true);
            }
        }
    }
    out
}

/// Binary dilation: a pixel is set when any element offset hits foreground.
pub fn dilate(mask: &Mask, element: &StructElement) -> Mask {
    let width = mask.width();
    let height = mask.height();
    let mut out = Mask::filled(width, height, false);
    for row in 0..height {
        for col in 0..width {
            if !mask.at(col, row) {
                continue;
            }
            for &(dc, dr) in element.offsets() {
                let (c, r) = (col as isize + dc, row as isize + dr);
                if c >= 0 && r >= 0 && c < width as isize && r < height as isize {
                    out.set(c as usize, r as usize, true);
                }
            }
        }
    }
    out
}

/// Binary erosion: a pixel survives when every element offset hits
/// foreground. Offsets falling outside the raster count as foreground, so
/// regions flush against the border are not eaten from the outside.
pub fn erode(mask: &Mask, element: &StructElement) -> Mask {
    let width = mask.width();
    let height = mask.height();
    let mut out = Mask::filled(width, height, false);
    for row in 0..height {
        'pixel: for col in 0..width {
            for &(dc, dr) in element.offsets() {
                let (c, r) = (col as isize + dc, row as isize + dr);
                if c < 0 || r < 0 || c >= width as isize || r >= height as isize {
                    continue;
                }
                if !mask.at(c as usize, r as usize) {
                    continue 'pixel;
                }
            }
            out.set(col, row, true);
        }
    }
    out
}

/// Closing (dilation then erosion): bridges small gaps between patches.
pub fn closing(mask: &Mask, element: &StructElement) -> Mask {
    erode(&dilate(mask, element), element)
}

/// Opening (erosion then dilation): removes thin protrusions and smooths
/// jagged boundaries.
pub fn opening(mask: &Mask, element: &StructElement) -> Mask {
    dilate(&erode(mask, element), element)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> Mask {
        let height = rows.len();
        let width = rows[0].len();
        let data: Vec<bool> = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c == '#'))
            .collect();
        Mask::from_vec(data, width, height).unwrap()
    }

    #[test]
    fn median_filter_drops_isolated_pixels() {
        let mask = mask_from(&["....", ".#..", "....", "...#"]);
        let out = median_filter_3x3(&mask);
        assert_eq!(out.count_foreground(), 0);
    }

    #[test]
    fn median_filter_keeps_solid_regions_to_the_border() {
        let mask = mask_from(&["####", "####", "####", "####"]);
        let out = median_filter_3x3(&mask);
        // Reflection makes the border neighborhood solid too.
        assert_eq!(out.count_foreground(), 16);
        assert!(out.at(0, 0) && out.at(3, 3));
    }

    #[test]
    fn closing_bridges_a_one_pixel_gap() {
        let mask = mask_from(&["##.##", "##.##", "##.##", "##.##", "##.##"]);
        let out = closing(&mask, &StructElement::disk(1));
        assert!(out.at(2, 2), "gap at column 2 should be closed");
    }

    #[test]
    fn opening_removes_a_thin_spur() {
        let mask = mask_from(&[
            "......",
            ".####.",
            ".####.",
            ".####.",
            ".#....",
            ".#....",
        ]);
        let out = opening(&mask, &StructElement::disk(1));
        assert!(!out.at(1, 5), "one-pixel-wide spur should be opened away");
    }

    #[test]
    fn border_flush_region_survives_closing() {
        // A 12x6 slab flush against the top edge. Erosion must not eat the
        // rim from outside the raster during the closing.
        let mut mask = Mask::filled(20, 20, false);
        for row in 0..6 {
            for col in 4..16 {
                mask.set(col, row, true);
            }
        }
        let out = closing(&mask, &StructElement::disk(2));
        assert_eq!(out.count_foreground(), 72);
        for col in 4..16 {
            assert!(out.at(col, 0), "row 0 foreground lost at col {col}");
        }
    }

    #[test]
    fn erosion_then_dilation_never_grows_the_mask() {
        let mask = mask_from(&[".####.", ".####.", ".####.", ".####."]);
        let out = opening(&mask, &StructElement::disk(1));
        assert!(out.count_foreground() <= mask.count_foreground());
    }
}
