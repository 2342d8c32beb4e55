use super::*;
use crate::net::gateway::FileUpload;
use crate::net::test_helpers::MockGateway;
use crate::net::types::ProductDraft;
use serde_json::json;

#[test]
fn product_endpoint_formats_expected_path() {
    assert_eq!(product_endpoint("p7"), "products/p7");
}

#[test]
fn cart_query_uses_user_id_key() {
    assert_eq!(cart_query("u1"), vec![("userId".to_owned(), "u1".to_owned())]);
}

// =============================================================================
// auth
// =============================================================================

#[tokio::test]
async fn login_posts_credentials_and_decodes_user() {
    let gateway = MockGateway::new(vec![Ok(json!({ "data": { "id": "u1", "name": "A", "token": "tok123" } }))]);
    let credentials = Credentials { email: "a@x.com".into(), password: "secret".into() };

    let user = login(&gateway, &credentials).await.unwrap();
    assert_eq!(user.id, "u1");

    let calls = gateway.calls();
    assert_eq!(calls[0].method, "POST");
    assert_eq!(calls[0].path, LOGIN_PATH);
    assert_eq!(
        calls[0].body,
        Some(RequestBody::Json(json!({ "email": "a@x.com", "password": "secret" })))
    );
}

#[tokio::test]
async fn register_posts_details() {
    let gateway = MockGateway::new(vec![Ok(json!({ "data": { "id": 9, "name": "B", "token": "t" } }))]);
    let details = RegisterDetails {
        email: "b@x.com".into(),
        password: "pw".into(),
        name: "B".into(),
        phone: "0123".into(),
    };

    let user = register(&gateway, &details).await.unwrap();
    assert_eq!(user.id, "9");
    assert_eq!(gateway.calls()[0].path, REGISTER_PATH);
}

#[tokio::test]
async fn login_propagates_status_error() {
    let gateway = MockGateway::new(vec![Err(GatewayError::Status { status: 401, body: "bad".into() })]);
    let credentials = Credentials { email: "a@x.com".into(), password: "wrong".into() };

    let err = login(&gateway, &credentials).await.unwrap_err();
    assert!(matches!(err, GatewayError::Status { status: 401, .. }));
}

// =============================================================================
// cart
// =============================================================================

#[tokio::test]
async fn fetch_cart_decodes_items() {
    let gateway = MockGateway::new(vec![Ok(json!({
        "data": { "items": [{ "id": "p1", "title": "Hat", "price": 100, "discount": 90, "quantity": 2 }] }
    }))]);

    let items = fetch_cart(&gateway, "u1").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);

    let calls = gateway.calls();
    assert_eq!(calls[0].path, CARTS_PATH);
    assert_eq!(calls[0].query, cart_query("u1"));
}

#[tokio::test]
async fn fetch_cart_malformed_payload_is_decode_error() {
    let gateway = MockGateway::new(vec![Ok(json!({ "data": { "items": "nope" } }))]);
    let err = fetch_cart(&gateway, "u1").await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}

// =============================================================================
// products / categories
// =============================================================================

#[tokio::test]
async fn list_products_sends_query() {
    let gateway = MockGateway::new(vec![Ok(json!({
        "data": { "items": [{ "id": 1, "title": "Hat", "price": 5 }], "total": 1 }
    }))]);
    let config = ProductListConfig { page: Some(1), limit: Some(10), ..ProductListConfig::default() };

    let page = list_products(&gateway, &config).await.unwrap();
    assert_eq!(page.items[0].title, "Hat");
    assert_eq!(gateway.calls()[0].query, config.to_query());
}

#[tokio::test]
async fn product_detail_gets_by_id() {
    let gateway = MockGateway::new(vec![Ok(json!({ "data": { "id": "p1", "title": "Hat", "price": 5 } }))]);
    let product = product_detail(&gateway, "p1").await.unwrap();
    assert_eq!(product.id, "p1");
    assert_eq!(gateway.calls()[0].path, "products/p1");
}

#[tokio::test]
async fn add_product_posts_multipart_draft() {
    let gateway = MockGateway::new(vec![Ok(json!({ "data": { "id": "p2", "title": "Hat", "price": 5 } }))]);
    let draft = ProductDraft {
        title: "Hat".into(),
        description: String::new(),
        price: 5.0,
        stock: 1,
        brand: "Acme".into(),
        category: "hats".into(),
        thumbnail: FileUpload { file_name: "t.png".into(), mime: None, bytes: vec![1] },
        images: Vec::new(),
    };

    let created = add_product(&gateway, draft).await.unwrap();
    assert_eq!(created.id, "p2");
    let calls = gateway.calls();
    assert_eq!(calls[0].path, PRODUCTS_PATH);
    assert!(matches!(calls[0].body, Some(RequestBody::Form(_))));
}

#[tokio::test]
async fn update_product_patches_json() {
    let gateway = MockGateway::new(vec![Ok(json!({ "data": { "id": "p1", "title": "Cap", "price": 5 } }))]);
    let body = RequestBody::Json(json!({ "title": "Cap" }));

    let updated = update_product(&gateway, "p1", body).await.unwrap();
    assert_eq!(updated.title, "Cap");
    let calls = gateway.calls();
    assert_eq!(calls[0].method, "PATCH");
    assert_eq!(calls[0].path, "products/p1");
}

#[tokio::test]
async fn delete_product_ignores_body() {
    let gateway = MockGateway::new(vec![Ok(serde_json::Value::Null)]);
    delete_product(&gateway, "p1").await.unwrap();
    assert_eq!(gateway.calls()[0].method, "DELETE");
}

#[tokio::test]
async fn list_categories_decodes_items() {
    let gateway = MockGateway::new(vec![Ok(json!({
        "data": { "items": [{ "id": 1, "name": "Hats", "slug": "hats" }] }
    }))]);
    let categories = list_categories(&gateway).await.unwrap();
    assert_eq!(categories[0].slug, "hats");
}
