//! Connected-component operations on binary masks.
//!
//! Both foreground labeling and background labeling (for hole filling) are
//! 4-connected: patches that touch only diagonally are separate regions and
//! pass the size filter independently. Labeling is an explicit-stack flood
//! fill, so deep components cannot overflow the call stack.

use crate::raster::Mask;

const NEIGHBORS_4: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Removes 4-connected foreground components smaller than `min_pixels`.
///
/// Never adds foreground: the output is a subset of the input mask.
pub fn remove_small_objects(mask: &Mask, min_pixels: usize) -> Mask {
    let width = mask.width();
    let height = mask.height();
    let mut out = mask.clone();
    let mut visited = vec![false; width * height];
    let mut component = Vec::new();
    let mut stack = Vec::new();

    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            if visited[idx] || !mask.at(col, row) {
                continue;
            }
            component.clear();
            stack.push((col, row));
            visited[idx] = true;
            while let Some((c, r)) = stack.pop() {
                component.push((c, r));
                for (dc, dr) in NEIGHBORS_4 {
                    let (nc, nr) = (c as isize + dc, r as isize + dr);
                    if nc < 0 || nr < 0 || nc >= width as isize || nr >= height as isize {
                        continue;
                    }
                    let (nc, nr) = (nc as usize, nr as usize);
                    let nidx = nr * width + nc;
                    if !visited[nidx] && mask.at(nc, nr) {
                        visited[nidx] = true;
                        stack.push((nc, nr));
                    }
                }
            }
            if component.len() < min_pixels {
                for &(c, r) in &component {
                    out.set(c, r, false);
                }
            }
        }
    }
    out
}

/// Fills 4-connected background components of at most `max_area` pixels
/// that do not touch the raster border.
///
/// Border-connected background is the exterior, never a hole. Never removes
/// foreground.
pub fn fill_small_holes(mask: &Mask, max_area: usize) -> Mask {
    let width = mask.width();
    let height = mask.height();
    let mut out = mask.clone();
    let mut visited = vec![false; width * height];
    let mut component = Vec::new();
    let mut stack = Vec::new();

    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            if visited[idx] || mask.at(col, row) {
                continue;
            }
            component.clear();
            let mut touches_border = false;
            stack.push((col, row));
            visited[idx] = true;
            while let Some((c, r)) = stack.pop() {
                if c == 0 || r == 0 || c == width - 1 || r == height - 1 {
                    touches_border = true;
                }
                component.push((c, r));
                for (dc, dr) in NEIGHBORS_4 {
                    let (nc, nr) = (c as isize + dc, r as isize + dr);
                    if nc < 0 || nr < 0 || nc >= width as isize || nr >= height as isize {
                        continue;
                    }
                    let (nc, nr) = (nc as usize, nr as usize);
                    let nidx = nr * width + nc;
                    if !visited[nidx] && !mask.at(nc, nr) {
                        visited[nidx] = true;
                        stack.push((nc, nr));
                    }
                }
            }
            if !touches_border && component.len() <= max_area {
                for &(c, r) in &component {
                    out.set(c, r, true);
                }
            }
        }
    }
    out
}
