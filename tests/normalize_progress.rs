// tests/normalize_progress.rs
use kiosk_rotation_core::derived::{progress_metrics, Derive, DerivedMetrics};
use kiosk_rotation_core::schema::{normalize_body, normalize_records, ProgressRecord};

fn fixture() -> Vec<ProgressRecord> {
    let body = std::fs::read_to_string("tests/fixtures/nbd.json").expect("fixture");
    normalize_body(&body).expect("nbd fixture normalizes")
}

#[test]
fn bare_array_payload_normalizes() {
    let recs = fixture();
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[0].name, "North");
    assert_eq!(recs[0].leads, 200.0);
    assert_eq!(recs[1].name, "South");
    assert_eq!(recs[1].converted, 30.0);
    assert_eq!(recs[2].name, "East");
    assert_eq!(recs[2].leads, 0.0);
    assert_eq!(recs[2].converted, 0.0);
    assert_eq!(recs[2].target, 20.0);
}

#[test]
fn metrics_over_fixture() {
    let m = progress_metrics(&fixture());
    // 80 converted of 300 leads
    assert!((m.conversion_ratio - 80.0 / 300.0 * 100.0).abs() < 1e-9);
    // 160 target - 80 converted
    assert_eq!(m.remaining_target, 80);
}

#[test]
fn zero_opportunities_never_divides() {
    let recs: Vec<ProgressRecord> =
        normalize_body(r#"[{"Name":"A","Target":5},{"Name":"B"}]"#).unwrap();
    match ProgressRecord::derive(&recs) {
        DerivedMetrics::Progress(m) => {
            assert_eq!(m.conversion_ratio, 0.0);
            assert_eq!(m.remaining_target, 5);
        }
        other => panic!("unexpected metrics {other:?}"),
    }
}

#[test]
fn metrics_do_not_touch_input() {
    let recs = fixture();
    let before = recs.clone();
    let _ = progress_metrics(&recs);
    let _ = progress_metrics(&recs);
    assert_eq!(recs, before);
}

#[test]
fn normalized_progress_is_a_fixed_point() {
    let first = fixture();
    let again: Vec<ProgressRecord> =
        normalize_records(serde_json::to_value(&first).unwrap()).unwrap();
    assert_eq!(first, again);
}
