//! Douglas-Peucker polyline simplification.

/// Simplifies a polyline, keeping every point farther than `tolerance` from
/// the chord of its span. Endpoints are always kept. Iterative (explicit
/// stack) so long contours cannot overflow recursion.
pub fn simplify_dp(points: &[(f64, f64)], tolerance: f64) -> Vec<(f64, f64)> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0usize, points.len() - 1)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }
        let mut max_dist = 0.0;
        let mut max_idx = first;
        for (i, &p) in points.iter().enumerate().take(last).skip(first + 1) {
            let d = perpendicular_distance(p, points[first], points[last]);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }
        if max_dist > tolerance {
            keep[max_idx] = true;
            stack.push((first, max_idx));
            stack.push((max_idx, last));
        }
    }

    points
        .iter()
        .zip(&keep)
        .filter_map(|(&p, &k)| k.then_some(p))
        .collect()
}

fn perpendicular_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        let (ex, ey) = (p.0 - a.0, p.1 - a.1);
        return (ex * ex + ey * ey).sqrt();
    }
    (dy * (p.0 - a.0) - dx * (p.1 - a.1)).abs() / len_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_interior_points_are_dropped() {
        let line = vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)];
        let out = simplify_dp(&line, 0.01);
        assert_eq!(out, vec![(0.0, 0.0), (3.0, 3.0)]);
    }

    #[test]
    fn tolerance_decides_whether_a_corner_survives() {
        // Perpendicular distance of the middle point from the chord is
        // about 0.63.
        let line = vec![(0.0, 0.0), (5.0, 3.2), (10.0, 5.0)];
        let out = simplify_dp(&line, 1.0);
        assert_eq!(out.len(), 2);
        let out = simplify_dp(&line, 0.5);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn endpoints_are_always_kept() {
        let line = vec![(0.0, 0.0), (0.1, 0.0), (0.2, 0.0)];
        let out = simplify_dp(&line, 100.0);
        assert_eq!(out.first(), Some(&(0.0, 0.0)));
        assert_eq!(out.last(), Some(&(0.2, 0.0)));
    }
}
