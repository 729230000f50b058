use canopydiff::{
    cluster_changes, filter_false_positives, match_temporal, ClusterParams, Point,
};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn uniform_points(rng: &mut StdRng, n: usize) -> Vec<Point> {
    (0..n)
        .map(|_| (rng.random_range(0.0..1.0), rng.random_range(0.0..1.0)))
        .collect()
}

#[test]
fn uniform_noise_produces_no_clusters_at_tight_radius() {
    // 1000 points scattered over a full degree: expected nearest-neighbor
    // spacing is tens of times the 0.001-degree linking radius, so no
    // component should reach the minimum size of 5.
    let mut rng = StdRng::seed_from_u64(7);
    let points = uniform_points(&mut rng, 1000);
    let clusters = cluster_changes(&points, &ClusterParams::default());
    assert!(
        clusters.is_empty(),
        "uniform noise produced {} clusters",
        clusters.len()
    );
}

#[test]
fn wide_radius_links_everything_into_one_cluster() {
    let mut rng = StdRng::seed_from_u64(7);
    let points = uniform_points(&mut rng, 1000);
    let params = ClusterParams {
        neighbor_distance: 0.1,
        ..ClusterParams::default()
    };
    let clusters = cluster_changes(&points, &params);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 1000);
}

#[test]
fn dense_blobs_survive_noise_and_filtering() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut points = Vec::new();

    // Two dense blobs well inside the linking radius.
    for &(cx, cy) in &[(0.25, 0.25), (0.75, 0.75)] {
        for _ in 0..40 {
            points.push((
                cx + rng.random_range(-0.0002..0.0002),
                cy + rng.random_range(-0.0002..0.0002),
            ));
        }
    }
    // Background noise far sparser than the radius.
    points.extend(uniform_points(&mut rng, 50));

    let params = ClusterParams::default();
    let clusters = cluster_changes(&points, &params);
    assert_eq!(clusters.len(), 2, "expected both blobs, no noise clusters");
    for cluster in &clusters {
        assert!(cluster.len() >= 40);
    }

    let scored = filter_false_positives(clusters, &[], &params);
    assert_eq!(scored.len(), 2);
    for (_, confidence) in &scored {
        assert!((0.5..=1.0).contains(confidence));
    }
}

#[test]
fn temporal_matching_recovers_shifted_points() {
    let mut rng = StdRng::seed_from_u64(13);
    let t1 = uniform_points(&mut rng, 200);
    // Second period: same points nudged well under the match distance.
    let t2: Vec<Point> = t1
        .iter()
        .map(|&(x, y)| (x + 0.0001, y - 0.0001))
        .collect();

    let matches = match_temporal(&t1, &t2, 0.0005);
    assert_eq!(matches.len(), 200);
    for &(i, j) in &matches {
        assert_eq!(i, j, "each point should match its own shifted copy");
    }

    // Shift beyond the threshold: nothing matches.
    let t2_far: Vec<Point> = t1.iter().map(|&(x, y)| (x + 0.01, y)).collect();
    assert!(match_temporal(&t1, &t2_far, 0.0005).is_empty());
}

#[test]
fn persistent_clusters_score_higher_than_transient_ones() {
    let mut rng = StdRng::seed_from_u64(99);
    let cluster: Vec<Point> = (0..30)
        .map(|_| {
            (
                0.5 + rng.random_range(-0.0002..0.0002),
                0.5 + rng.random_range(-0.0002..0.0002),
            )
        })
        .collect();
    let params = ClusterParams::default();

    // Reference covering the cluster vs a reference far away.
    let covered = canopydiff::cluster_confidence(&cluster, &cluster.clone(), &params);
    let far_reference = vec![(0.0, 0.0); 10];
    let transient = canopydiff::cluster_confidence(&cluster, &far_reference, &params);
    assert!(
        covered > transient,
        "persistent {} should beat transient {}",
        covered,
        transient
    );
}
