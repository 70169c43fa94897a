use serde_json::json;
use tableq_test::{people, person_schema, resolve_path, JsonAssert, TableRequest};

#[test]
fn test_resolve_nested_field() {
    let v = json!({"data": [{"first_name": "Bob"}]});
    assert_eq!(resolve_path(&v, "data[0].first_name"), json!("Bob"));
}

#[test]
fn test_resolve_len() {
    let v = json!({"data": [1, 2, 3]});
    assert_eq!(resolve_path(&v, "data.len()"), json!(3));
}

#[test]
fn test_resolve_missing_is_null() {
    let v = json!({"data": []});
    assert_eq!(resolve_path(&v, "data[4].first_name"), json!(null));
}

#[test]
fn test_json_assert_chain() {
    let people = people();
    let value: String = JsonAssert::new(&people)
        .assert_path("len()", 6)
        .assert_path("[4].last_name", "Crammer")
        .assert_path_fn("[1].total_red_blood_cells", |v| v.is_null())
        .path("[0].birth_date");
    assert_eq!(value, "1960-05-03");
}

#[test]
fn test_people_request_shape() {
    let params = TableRequest::people().build();
    assert_eq!(params.get("draw"), Some("1"));
    assert_eq!(params.get("columns[4][data]"), Some("Height"));
    assert_eq!(params.get("columns[6][searchable]"), Some("true"));
    assert_eq!(params.get("order[0][dir]"), Some("0"));
}

#[test]
fn test_request_overrides_keep_position() {
    let request = TableRequest::people().length(3).without("draw");
    let query = request.query_string();
    assert!(!query.contains("draw="));
    assert!(query.contains("length=3"));
    assert!(query.contains("columns%5B0%5D%5Bdata%5D=FirstName"));
}

#[test]
fn test_schema_height_is_lower_case() {
    let schema = person_schema();
    assert!(schema.property("height").is_some());
    assert!(schema.property("Height").is_none());
    assert!(!schema.property("FullName").unwrap().is_writable());
}
