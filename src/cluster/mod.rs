//! Point clustering engine.
//!
//! Alternative front-end over sparse change points: a k-d tree accelerates
//! radius queries, union-find groups spatially connected points, and small
//! clusters are rejected as noise. Temporal matching and confidence scoring
//! share the raster pipeline's philosophy (size, compactness and persistence
//! evidence combine into a [0, 1] score).

use crate::trace::trace_event;

mod dsu;
mod kdtree;

pub use dsu::UnionFind;
pub use kdtree::{KdTree, Nearest};

/// A point in (lon, lat) degrees.
pub type Point = (f64, f64);

/// Tunables for clustering, matching and scoring.
#[derive(Clone, Copy, Debug)]
pub struct ClusterParams {
    /// Radius connecting two points into the same cluster, in degrees.
    pub neighbor_distance: f64,
    /// Clusters smaller than this are discarded.
    pub min_cluster_size: usize,
    /// Maximum distance for a temporal match, in degrees.
    pub max_match_distance: f64,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            neighbor_distance: 0.001,
            min_cluster_size: 5,
            max_match_distance: 0.0005,
        }
    }
}

/// Groups spatially connected change points.
///
/// Every pair of points within `neighbor_distance` is unioned; connected
/// components of at least `min_cluster_size` points survive. Empty input
/// yields empty output.
pub fn cluster_changes(points: &[Point], params: &ClusterParams) -> Vec<Vec<Point>> {
    if points.is_empty() {
        return Vec::new();
    }

    let tree = KdTree::build(points);
    let mut uf = UnionFind::new(points.len());
    for (i, &(x, y)) in points.iter().enumerate() {
        for j in tree.within_radius(x, y, params.neighbor_distance) {
            if i != j {
                uf.union(i, j);
            }
        }
    }

    let clusters: Vec<Vec<Point>> = uf
        .components()
        .into_iter()
        .filter(|component| component.len() >= params.min_cluster_size)
        .map(|component| component.into_iter().map(|i| points[i]).collect())
        .collect();

    trace_event!("clusters_extracted", clusters = clusters.len(), points = points.len());
    clusters
}

/// Matches points across two time periods by nearest neighbor.
///
/// For every point of `t1` the single nearest point of `t2` is accepted as a
/// match when no farther than `max_distance`. Returns `(t1_index, t2_index)`
/// pairs; either set being empty yields no matches.
pub fn match_temporal(t1: &[Point], t2: &[Point], max_distance: f64) -> Vec<(usize, usize)> {
    if t1.is_empty() || t2.is_empty() {
        return Vec::new();
    }
    let tree = KdTree::build(t2);
    let mut matches = Vec::new();
    for (i, &(x, y)) in t1.iter().enumerate() {
        if let Some(nearest) = tree.nearest(x, y) {
            if nearest.distance <= max_distance {
                matches.push((i, nearest.index));
            }
        }
    }
    trace_event!("temporal_matches", matches = matches.len());
    matches
}

/// Confidence score for one cluster, rounded to 2 decimals.
///
/// Combines size (`min(n/100, 1)`), compactness (`1 / (1 + mean distance to
/// centroid * 100)`) and temporal persistence (fraction of points within
/// `neighbor_distance` of any reference point, defaulting to 0.8 without
/// reference data) with weights 0.3 / 0.4 / 0.3. Heuristic, kept exactly for
/// compatibility with the source parameterization.
pub fn cluster_confidence(cluster: &[Point], reference: &[Point], params: &ClusterParams) -> f64 {
    if cluster.is_empty() {
        return 0.0;
    }

    let size_score = (cluster.len() as f64 / 100.0).min(1.0);

    let compactness_score = if cluster.len() > 1 {
        let n = cluster.len() as f64;
        let cx = cluster.iter().map(|p| p.0).sum::<f64>() / n;
        let cy = cluster.iter().map(|p| p.1).sum::<f64>() / n;
        let mean_dist = cluster
            .iter()
            .map(|&(x, y)| ((x - cx).powi(2) + (y - cy).powi(2)).sqrt())
            .sum::<f64>()
            / n;
        1.0 / (1.0 + mean_dist * 100.0)
    } else {
        1.0
    };

    let persistence_score = if reference.is_empty() {
        0.8
    } else {
        let tree = KdTree::build(reference);
        let near = cluster
            .iter()
            .filter(|&&(x, y)| {
                tree.nearest(x, y)
                    .is_some_and(|n| n.distance < params.neighbor_distance)
            })
            .count();
        near as f64 / cluster.len() as f64
    };

    let confidence = 0.3 * size_score + 0.4 * compactness_score + 0.3 * persistence_score;
    (confidence * 100.0).round() / 100.0
}

/// Scores clusters and drops likely false positives (confidence below 0.5).
pub fn filter_false_positives(
    clusters: Vec<Vec<Point>>,
    reference: &[Point],
    params: &ClusterParams,
) -> Vec<(Vec<Point>, f64)> {
    let total = clusters.len();
    let kept: Vec<(Vec<Point>, f64)> = clusters
        .into_iter()
        .filter_map(|cluster| {
            let confidence = cluster_confidence(&cluster, reference, params);
            (confidence >= 0.5).then_some((cluster, confidence))
        })
        .collect();
    trace_event!("false_positive_filter", kept = kept.len(), total = total);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tight_cloud_forms_one_cluster() {
        let points: Vec<Point> = (0..20)
            .map(|i| (0.0005 * (i % 5) as f64 / 5.0, 0.0005 * (i / 5) as f64 / 4.0))
            .collect();
        let clusters = cluster_changes(&points, &ClusterParams::default());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 20);
    }

    #[test]
    fn sparse_points_yield_nothing() {
        let points: Vec<Point> = (0..10).map(|i| (i as f64, 0.0)).collect();
        let clusters = cluster_changes(&points, &ClusterParams::default());
        assert!(clusters.is_empty());
    }

    #[test]
    fn empty_input_is_a_valid_empty_result() {
        assert!(cluster_changes(&[], &ClusterParams::default()).is_empty());
        assert!(match_temporal(&[], &[(0.0, 0.0)], 1.0).is_empty());
        assert!(match_temporal(&[(0.0, 0.0)], &[], 1.0).is_empty());
    }

    #[test]
    fn matching_respects_max_distance() {
        let t1 = [(0.0, 0.0), (1.0, 1.0)];
        let t2 = [(0.0001, 0.0), (5.0, 5.0)];
        let matches = match_temporal(&t1, &t2, 0.0005);
        assert_eq!(matches, vec![(0, 0)]);
    }

    #[test]
    fn confidence_is_within_unit_range() {
        let cluster: Vec<Point> = (0..50).map(|i| (i as f64 * 1e-5, 0.0)).collect();
        let params = ClusterParams::default();
        let c = cluster_confidence(&cluster, &[], &params);
        assert!((0.0..=1.0).contains(&c));
        let c_ref = cluster_confidence(&cluster, &cluster.clone(), &params);
        assert!((0.0..=1.0).contains(&c_ref));
    }

    #[test]
    fn singleton_cluster_is_fully_compact() {
        let params = ClusterParams::default();
        // size 0.01 * 0.3 + compactness 1.0 * 0.4 + default persistence 0.8 * 0.3
        let c = cluster_confidence(&[(3.0, 4.0)], &[], &params);
        assert!((c - 0.64).abs() < 1e-9);
    }

    #[test]
    fn low_confidence_clusters_are_filtered() {
        let far_flung: Vec<Point> = (0..5).map(|i| (i as f64 * 0.1, 0.0)).collect();
        let params = ClusterParams::default();
        // Scattered cluster without reference: compactness collapses.
        let kept = filter_false_positives(vec![far_flung], &[], &params);
        assert!(kept.is_empty());

        let tight: Vec<Point> = (0..60).map(|i| (i as f64 * 1e-6, 0.0)).collect();
        let kept = filter_false_positives(vec![tight], &[], &params);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].1 >= 0.5);
    }
}
