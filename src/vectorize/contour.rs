//! Marching-squares contour extraction.
//!
//! Traces the 0.5 iso-level of a mask treated as a continuous {0, 1} field,
//! producing sub-pixel boundary coordinates in `(row, col)` order. The field
//! is zero-padded by one pixel internally so regions touching the raster
//! border still trace closed loops; every returned contour is closed (first
//! point equals last).

use std::collections::HashMap;

use crate::raster::Mask;

/// A traced boundary: ordered `(row, col)` points, first == last.
pub type Contour = Vec<(f64, f64)>;

const LEVEL: f64 = 0.5;

/// Extracts the closed boundary contour of every connected foreground
/// region (and of every hole) in the mask.
pub fn find_contours(mask: &Mask) -> Vec<Contour> {
    let width = mask.width() + 2;
    let height = mask.height() + 2;
    // Zero-padded continuous field; contour coords are shifted back by 1.
    let value = |col: isize, row: isize| -> f64 {
        if col < 1 || row < 1 || col > mask.width() as isize || row > mask.height() as isize {
            0.0
        } else if mask.at(col as usize - 1, row as usize - 1) {
            1.0
        } else {
            0.0
        }
    };

    // Oriented segments keyed by start point; high side is on the left of
    // the travel direction, so adjacent cells chain head to tail.
    let mut segments: Vec<((f64, f64), (f64, f64))> = Vec::new();
    for row in 0..height as isize - 1 {
        for col in 0..width as isize - 1 {
            let tl = value(col, row);
            let tr = value(col + 1, row);
            let br = value(col + 1, row + 1);
            let bl = value(col, row + 1);
            let case = (usize::from(tl > LEVEL))
                | (usize::from(tr > LEVEL) << 1)
                | (usize::from(br > LEVEL) << 2)
                | (usize::from(bl > LEVEL) << 3);
            if case == 0 || case == 15 {
                continue;
            }

            let interp = |a: f64, b: f64| (LEVEL - a) / (b - a);
            let r = row as f64;
            let c = col as f64;
            let top = (r, c + interp(tl, tr));
            let right = (r + interp(tr, br), c + 1.0);
            let bottom = (r + 1.0, c + interp(bl, br));
            let left = (r + interp(tl, bl), c);

            // Saddle cases (5, 10) resolve as separated high corners.
            match case {
                1 => segments.push((left, top)),
                2 => segments.push((top, right)),
                3 => segments.push((left, right)),
                4 => segments.push((right, bottom)),
                5 => {
                    segments.push((left, top));
                    segments.push((right, bottom));
                }
                6 => segments.push((top, bottom)),
                7 => segments.push((left, bottom)),
                8 => segments.push((bottom, left)),
                9 => segments.push((bottom, top)),
                10 => {
                    segments.push((top, right));
                    segments.push((bottom, left));
                }
                11 => segments.push((bottom, right)),
                12 => segments.push((right, left)),
                13 => segments.push((right, top)),
                14 => segments.push((top, left)),
                _ => unreachable!(),
            }
        }
    }

    // Chain segments into closed loops. All crossings sit on half-integer
    // coordinates, so doubling gives exact integer keys.
    let key = |p: (f64, f64)| -> (i64, i64) {
        ((p.0 * 2.0).round() as i64, (p.1 * 2.0).round() as i64)
    };
    let mut by_start: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, seg) in segments.iter().enumerate() {
        by_start.entry(key(seg.0)).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();
    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        let mut contour: Contour = Vec::new();
        let mut current = start;
        loop {
            used[current] = true;
            let (from, to) = segments[current];
            // Shift back into unpadded pixel coordinates.
            contour.push((from.0 - 1.0, from.1 - 1.0));
            let next = by_start
                .get(&key(to))
                .and_then(|cands| cands.iter().copied().find(|&i| !used[i]));
            match next {
                Some(i) => current = i,
                None => {
                    contour.push((to.0 - 1.0, to.1 - 1.0));
                    break;
                }
            }
        }
        contours.push(contour);
    }
    contours
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mask_has_no_contours() {
        let mask = Mask::filled(8, 8, false);
        assert!(find_contours(&mask).is_empty());
    }

    #[test]
    fn single_block_traces_one_closed_ring() {
        let mut mask = Mask::filled(10, 10, false);
        for row in 3..7 {
            for col in 3..7 {
                mask.set(col, row, true);
            }
        }
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);
        let ring = &contours[0];
        assert!(ring.len() >= 8);
        assert_eq!(ring.first(), ring.last());
        // All points hug the block boundary at half-pixel offsets.
        for &(r, c) in ring {
            assert!((2.0..=7.0).contains(&r), "row {r} off the block edge");
            assert!((2.0..=7.0).contains(&c), "col {c} off the block edge");
        }
    }

    #[test]
    fn border_touching_region_still_closes() {
        let mut mask = Mask::filled(6, 6, false);
        for row in 0..3 {
            for col in 0..3 {
                mask.set(col, row, true);
            }
        }
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].first(), contours[0].last());
    }

    #[test]
    fn hole_produces_a_second_contour() {
        let mut mask = Mask::filled(9, 9, false);
        for row in 1..8 {
            for col in 1..8 {
                mask.set(col, row, true);
            }
        }
        mask.set(4, 4, false);
        let contours = find_contours(&mask);
        assert_eq!(contours.len(), 2);
    }
}
