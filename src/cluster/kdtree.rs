//! Static 2D k-d tree for nearest-neighbor and radius queries.
//!
//! Built once over the input point set with median splitting, nodes stored
//! in a flat `Vec`. Queries prune subtrees by the distance from the query to
//! the split plane. Distances are Euclidean in the point units (degrees for
//! lon/lat change points at the scales this crate works with).

/// Nearest-neighbor query result.
#[derive(Clone, Copy, Debug)]
pub struct Nearest {
    /// Index into the original point slice.
    pub index: usize,
    /// Euclidean distance to the query.
    pub distance: f64,
}

#[derive(Debug)]
struct Node {
    point_idx: usize,
    split_dim: u8,
    left: Option<usize>,
    right: Option<usize>,
}

/// Immutable 2D k-d tree over `(x, y)` points.
#[derive(Debug)]
pub struct KdTree {
    nodes: Vec<Node>,
    points: Vec<(f64, f64)>,
}

impl KdTree {
    /// Builds a balanced tree with median-of-coordinate splitting.
    pub fn build(points: &[(f64, f64)]) -> Self {
        let points = points.to_vec();
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());
        build_recursive(&points, &mut indices, 0, &mut nodes);
        Self { nodes, points }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Finds the single nearest indexed point to `(qx, qy)`.
    pub fn nearest(&self, qx: f64, qy: f64) -> Option<Nearest> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut best = Nearest {
            index: 0,
            distance: f64::INFINITY,
        };
        self.nearest_from(0, qx, qy, &mut best);
        best.distance = best.distance.sqrt();
        Some(best)
    }

    /// Returns the indices of all points within `radius` of `(qx, qy)`,
    /// including a point at exactly `radius`.
    pub fn within_radius(&self, qx: f64, qy: f64, radius: f64) -> Vec<usize> {
        let mut out = Vec::new();
        if self.nodes.is_empty() || radius < 0.0 {
            return out;
        }
        self.radius_from(0, qx, qy, radius, radius * radius, &mut out);
        out
    }

    fn nearest_from(&self, node_idx: usize, qx: f64, qy: f64, best: &mut Nearest) {
        let node = &self.nodes[node_idx];
        let (px, py) = self.points[node.point_idx];
        let dist_sq = (px - qx) * (px - qx) + (py - qy) * (py - qy);
        if dist_sq < best.distance {
            best.distance = dist_sq;
            best.index = node.point_idx;
        }

        let delta = if node.split_dim == 0 { qx - px } else { qy - py };
        let (near, far) = if delta < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        if let Some(child) = near {
            self.nearest_from(child, qx, qy, best);
        }
        if let Some(child) = far {
            if delta * delta < best.distance {
                self.nearest_from(child, qx, qy, best);
            }
        }
    }

    fn radius_from(
        &self,
        node_idx: usize,
        qx: f64,
        qy: f64,
        radius: f64,
        radius_sq: f64,
        out: &mut Vec<usize>,
    ) {
        let node = &self.nodes[node_idx];
        let (px, py) = self.points[node.point_idx];
        let dist_sq = (px - qx) * (px - qx) + (py - qy) * (py - qy);
        if dist_sq <= radius_sq {
            out.push(node.point_idx);
        }

        let delta = if node.split_dim == 0 { qx - px } else { qy - py };
        let (near, far) = if delta < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        if let Some(child) = near {
            self.radius_from(child, qx, qy, radius, radius_sq, out);
        }
        if let Some(child) = far {
            if delta.abs() <= radius {
                self.radius_from(child, qx, qy, radius, radius_sq, out);
            }
        }
    }
}

fn build_recursive(
    points: &[(f64, f64)],
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<Node>,
) -> Option<usize> {
    if indices.is_empty() {
        return None;
    }
    let split_dim = (depth % 2) as u8;
    indices.sort_by(|&a, &b| {
        let (va, vb) = if split_dim == 0 {
            (points[a].0, points[b].0)
        } else {
            (points[a].1, points[b].1)
        };
        va.partial_cmp(&vb).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mid = indices.len() / 2;
    let point_idx = indices[mid];
    let node_idx = nodes.len();
    nodes.push(Node {
        point_idx,
        split_dim,
        left: None,
        right: None,
    });

    let (left_part, rest) = indices.split_at_mut(mid);
    let left = build_recursive(points, left_part, depth + 1, nodes);
    let right = build_recursive(points, &mut rest[1..], depth + 1, nodes);
    nodes[node_idx].left = left;
    nodes[node_idx].right = right;
    Some(node_idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points(n: usize, step: f64) -> Vec<(f64, f64)> {
        let mut points = Vec::new();
        for i in 0..n {
            for j in 0..n {
                points.push((i as f64 * step, j as f64 * step));
            }
        }
        points
    }

    #[test]
    fn nearest_matches_brute_force() {
        let points = grid_points(7, 0.37);
        let tree = KdTree::build(&points);
        for &(qx, qy) in &[(0.0, 0.0), (1.01, 1.9), (2.6, 0.02), (-5.0, 3.0)] {
            let got = tree.nearest(qx, qy).unwrap();
            let (want_idx, want_dist) = points
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| (i, ((x - qx).powi(2) + (y - qy).powi(2)).sqrt()))
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
                .unwrap();
            assert_eq!(got.index, want_idx);
            assert!((got.distance - want_dist).abs() < 1e-12);
        }
    }

    #[test]
    fn radius_query_matches_brute_force() {
        let points = grid_points(6, 0.5);
        let tree = KdTree::build(&points);
        let (qx, qy, radius) = (1.2, 1.2, 0.8);
        let mut got = tree.within_radius(qx, qy, radius);
        got.sort_unstable();
        let want: Vec<usize> = points
            .iter()
            .enumerate()
            .filter(|(_, &(x, y))| ((x - qx).powi(2) + (y - qy).powi(2)).sqrt() <= radius)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(got, want);
    }

    #[test]
    fn empty_tree_answers_empty() {
        let tree = KdTree::build(&[]);
        assert!(tree.is_empty());
        assert!(tree.nearest(0.0, 0.0).is_none());
        assert!(tree.within_radius(0.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn point_at_exact_radius_is_included() {
        let tree = KdTree::build(&[(0.0, 0.0), (1.0, 0.0)]);
        let hits = tree.within_radius(0.0, 0.0, 1.0);
        assert!(hits.contains(&1));
    }
}
