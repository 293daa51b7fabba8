// tests/normalize_inventory.rs
use kiosk_rotation_core::schema::{
    normalize_body, normalize_records, InventoryRecord, NormalizedRecord,
};
use serde_json::{json, Value};

fn inv(v: Value) -> InventoryRecord {
    InventoryRecord::from_raw(v.as_object().expect("object"))
}

#[test]
fn wrapped_apps_script_payload_normalizes() {
    let body = json!({"data":[{"Tool":"Drill","Brand":"X","available_stock":"10","Sold":"3"}]});
    let recs: Vec<InventoryRecord> = normalize_records(body).unwrap();
    assert_eq!(
        recs,
        vec![InventoryRecord {
            tool: "Drill".into(),
            brand: "X".into(),
            available_stock: 10.0,
            sold: 3.0,
        }]
    );
}

#[test]
fn missing_fields_take_documented_defaults() {
    let r = inv(json!({}));
    assert_eq!(r.tool, "Unknown Tool");
    assert_eq!(r.brand, "Unknown");
    assert_eq!(r.available_stock, 0.0);
    assert_eq!(r.sold, 0.0);
}

#[test]
fn unparsable_numbers_coerce_to_zero() {
    let r = inv(json!({"Tool": "Saw", "stock": "lots", "Sold": {"n": 2}}));
    assert_eq!(r.available_stock, 0.0);
    assert_eq!(r.sold, 0.0);
}

#[test]
fn normalizing_normalized_output_is_identity() {
    let body = std::fs::read_to_string("tests/fixtures/inventory.json").expect("fixture");
    let first: Vec<InventoryRecord> = normalize_body(&body).unwrap();
    assert_eq!(first.len(), 4);

    let again: Vec<InventoryRecord> =
        normalize_records(serde_json::to_value(&first).unwrap()).unwrap();
    assert_eq!(first, again);
}

#[test]
fn fixture_rows_resolve_aliases() {
    let body = std::fs::read_to_string("tests/fixtures/inventory.json").expect("fixture");
    let recs: Vec<InventoryRecord> = normalize_body(&body).unwrap();

    assert_eq!(recs[1].tool, "Angle Grinder");
    assert_eq!(recs[1].brand, "Bosch");
    assert_eq!(recs[1].available_stock, 4.0);

    // blank tool and garbage stock
    assert_eq!(recs[2].tool, "Unknown Tool");
    assert_eq!(recs[2].available_stock, 0.0);
    assert_eq!(recs[2].sold, 0.0);

    assert_eq!(recs[3].available_stock, 7.0);
}

#[test]
fn non_array_payload_is_malformed() {
    for body in [r#"{"status":"ok"}"#, r#"{"data":"nope"}"#, "42", "not json"] {
        let err = normalize_body::<InventoryRecord>(body).unwrap_err();
        assert!(!err.is_fetch(), "{body} should be malformed, got {err}");
    }
}

#[test]
fn one_bad_element_rejects_the_whole_batch() {
    let body = json!([{"Tool": "Drill"}, "oops", {"Tool": "Saw"}]);
    let err = normalize_records::<InventoryRecord>(body).unwrap_err();
    assert!(err.to_string().contains("record 1"), "{err}");
}
