use super::*;
use crate::net::types::Category;
use serde_json::json;

// =============================================================================
// join_url
// =============================================================================

#[test]
fn join_url_inserts_single_slash() {
    assert_eq!(join_url("http://h/api", "products"), "http://h/api/products");
}

#[test]
fn join_url_collapses_duplicate_slashes() {
    assert_eq!(join_url("http://h/api/", "/products/7"), "http://h/api/products/7");
}

// =============================================================================
// parse_body
// =============================================================================

#[test]
fn parse_body_empty_is_null() {
    assert_eq!(parse_body("").unwrap(), Value::Null);
    assert_eq!(parse_body("  \n").unwrap(), Value::Null);
}

#[test]
fn parse_body_invalid_json_is_decode_error() {
    let err = parse_body("<html>").unwrap_err();
    assert_eq!(err.error_code(), "E_GATEWAY_DECODE");
}

// =============================================================================
// decode_data / decode_items
// =============================================================================

#[test]
fn decode_data_unwraps_envelope() {
    let envelope = json!({ "data": { "id": 3, "name": "Shoes", "slug": "shoes" } });
    let category: Category = decode_data(envelope).unwrap();
    assert_eq!(category.id, "3");
    assert_eq!(category.slug, "shoes");
}

#[test]
fn decode_data_missing_data_field() {
    let err = decode_data::<Category>(json!({ "message": "ok" })).unwrap_err();
    assert!(err.to_string().contains("missing `data`"));
}

#[test]
fn decode_data_non_object() {
    let err = decode_data::<Category>(json!([1, 2])).unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}

#[test]
fn decode_items_keeps_paging_meta() {
    let envelope = json!({
        "data": {
            "items": [{ "id": "c1", "name": "Hats", "slug": "hats" }],
            "total": 1,
            "page": 1
        }
    });
    let page: ListPage<Category> = decode_items(envelope).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.meta.get("total"), Some(&json!(1)));
}

#[test]
fn decode_items_requires_items() {
    let err = decode_items::<Category>(json!({ "data": {} })).unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}

// =============================================================================
// GatewayError
// =============================================================================

#[test]
fn retryable_statuses() {
    assert!(GatewayError::Request("reset".into()).retryable());
    assert!(GatewayError::Status { status: 503, body: String::new() }.retryable());
    assert!(GatewayError::Status { status: 429, body: String::new() }.retryable());
    assert!(!GatewayError::Status { status: 401, body: String::new() }.retryable());
    assert!(!GatewayError::Decode("bad".into()).retryable());
}

#[test]
fn status_error_display_includes_code() {
    let err = GatewayError::Status { status: 404, body: "nope".into() };
    assert_eq!(err.to_string(), "server responded with status 404");
}

// =============================================================================
// Request bodies
// =============================================================================

#[test]
fn request_body_json_serializes_record() {
    let body = RequestBody::json(&json!({ "title": "Hat" })).unwrap();
    assert_eq!(body, RequestBody::Json(json!({ "title": "Hat" })));
}

#[test]
fn guess_mime_by_extension() {
    assert_eq!(guess_mime("a.PNG"), Some("image/png"));
    assert_eq!(guess_mime("a.jpeg"), Some("image/jpeg"));
    assert_eq!(guess_mime("a.bmp"), Some("image/bmp"));
    assert_eq!(guess_mime("notes.txt"), Some("text/plain"));
    assert_eq!(guess_mime("README"), None);
}

#[test]
fn into_multipart_accepts_text_and_files() {
    let fields = vec![
        FormField::text("title", "Hat"),
        FormField::file(
            "thumbnail",
            FileUpload { file_name: "t.png".into(), mime: Some("image/png".into()), bytes: vec![1, 2, 3] },
        ),
    ];
    assert!(into_multipart(fields).is_ok());
}

#[test]
fn into_multipart_rejects_bad_mime() {
    let fields = vec![FormField::file(
        "thumbnail",
        FileUpload { file_name: "t.png".into(), mime: Some("not a mime".into()), bytes: vec![] },
    )];
    assert!(into_multipart(fields).is_err());
}

#[test]
fn http_gateway_reports_base_url() {
    let gateway = HttpGateway::new("http://127.0.0.1:9/api", HttpTimeouts::default()).unwrap();
    assert_eq!(gateway.base_url(), "http://127.0.0.1:9/api");
}
