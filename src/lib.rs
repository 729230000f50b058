//! CanopyDiff detects vegetation loss between two co-registered raster
//! snapshots and clusters sparse change points.
//!
//! The raster pipeline runs nine sequential stages (preprocessing, dual
//! vegetation indices, robust temporal filtering, mask construction,
//! morphological refinement, multi-scale smoothing, edge refinement,
//! vectorization, metrics) producing scored loss polygons. The point
//! engine is an independent front-end grouping sparse change evidence with
//! union-find over a k-d tree. Optional parallelism via the `rayon` feature;
//! stage observability via the `tracing` feature.

pub mod cluster;
mod edge;
pub mod index;
pub mod morphology;
pub mod pipeline;
pub mod preprocess;
pub mod raster;
pub mod smooth;
pub mod temporal;
pub mod util;
pub mod vectorize;

pub(crate) mod trace;

pub use cluster::{
    cluster_changes, cluster_confidence, filter_false_positives, match_temporal, ClusterParams,
    KdTree, Point, UnionFind,
};
pub use edge::{canny, refine_edges};
pub use index::{evi, ndvi, VegetationIndex};
pub use pipeline::{
    detect_forest_loss, detect_from_indices, DetectionParams, DetectionReport, DetectionSummary,
    Snapshot,
};
pub use raster::{GeoTransform, Mask, Raster, RasterView};
pub use util::{CanopyDiffError, CanopyDiffResult};
pub use vectorize::{PolygonRecord, Severity};
