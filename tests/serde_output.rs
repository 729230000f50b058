#![cfg(feature = "serde")]

use canopydiff::pipeline::DetectionSummary;
use canopydiff::{PolygonRecord, Severity};

#[test]
fn polygon_record_round_trips_through_json() {
    let record = PolygonRecord {
        id: 3,
        ring: vec![
            (-60.0, -3.0),
            (-60.0, -3.001),
            (-59.999, -3.001),
            (-60.0, -3.0),
        ],
        area_ha: 12.42,
        area_pixels: 138,
        confidence: 0.87,
        ndvi_change: 0.341,
        evi_change: 0.212,
        severity: Severity::High,
    };

    let json = serde_json::to_string(&record).unwrap();
    let back: PolygonRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}

#[test]
fn severity_serializes_as_a_tag() {
    let json = serde_json::to_string(&Severity::Moderate).unwrap();
    assert_eq!(json, "\"Moderate\"");
}

#[test]
fn summary_round_trips_through_json() {
    let summary = DetectionSummary {
        num_features: 2,
        total_area_ha: 18.9,
        mean_confidence: 0.77,
    };
    let json = serde_json::to_string(&summary).unwrap();
    let back: DetectionSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
}
