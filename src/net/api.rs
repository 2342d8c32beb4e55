//! Typed endpoint helpers over the remote gateway.
//!
//! One function per backend call the storefront makes: auth, cart, product
//! catalog, and categories. Each one unwraps the `{data: ...}` envelope so
//! callers only ever see typed values or a [`GatewayError`].

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::gateway::{GatewayError, RemoteGateway, RequestBody, decode_data, decode_items};
use super::types::{Category, Credentials, LineItem, ListPage, Product, ProductListConfig, RegisterDetails, User};

pub const LOGIN_PATH: &str = "auth/login";
pub const REGISTER_PATH: &str = "auth/register";
pub const CARTS_PATH: &str = "carts";
pub const PRODUCTS_PATH: &str = "products";
pub const CATEGORIES_PATH: &str = "categories";

fn product_endpoint(id: &str) -> String {
    format!("{PRODUCTS_PATH}/{id}")
}

fn cart_query(user_id: &str) -> Vec<(String, String)> {
    vec![("userId".to_owned(), user_id.to_owned())]
}

// =============================================================================
// AUTH
// =============================================================================

/// Authenticate with email/password via `POST auth/login`.
///
/// # Errors
///
/// Returns a [`GatewayError`] if the request fails or the payload is not a user.
pub async fn login(gateway: &dyn RemoteGateway, credentials: &Credentials) -> Result<User, GatewayError> {
    let body = RequestBody::json(credentials)?;
    decode_data(gateway.post(LOGIN_PATH, body).await?)
}

/// Create an account via `POST auth/register`; the response is a logged-in user.
///
/// # Errors
///
/// Returns a [`GatewayError`] if the request fails or the payload is not a user.
pub async fn register(gateway: &dyn RemoteGateway, details: &RegisterDetails) -> Result<User, GatewayError> {
    let body = RequestBody::json(details)?;
    decode_data(gateway.post(REGISTER_PATH, body).await?)
}

// =============================================================================
// CART
// =============================================================================

/// Fetch a user's cart line items via `GET carts?userId=<id>`.
///
/// # Errors
///
/// Returns a [`GatewayError`] if the request fails or `data.items` is malformed.
pub async fn fetch_cart(gateway: &dyn RemoteGateway, user_id: &str) -> Result<Vec<LineItem>, GatewayError> {
    let envelope = gateway.get(CARTS_PATH, &cart_query(user_id)).await?;
    decode_items::<LineItem>(envelope).map(|page| page.items)
}

// =============================================================================
// PRODUCTS
// =============================================================================

/// List catalog products via `GET products`.
///
/// # Errors
///
/// Returns a [`GatewayError`] if the request fails or `data.items` is malformed.
pub async fn list_products(
    gateway: &dyn RemoteGateway,
    config: &ProductListConfig,
) -> Result<ListPage<Product>, GatewayError> {
    decode_items(gateway.get(PRODUCTS_PATH, &config.to_query()).await?)
}

/// Fetch one product via `GET products/<id>`.
///
/// # Errors
///
/// Returns a [`GatewayError`] if the request fails or the payload is not a product.
pub async fn product_detail(gateway: &dyn RemoteGateway, id: &str) -> Result<Product, GatewayError> {
    decode_data(gateway.get(&product_endpoint(id), &[]).await?)
}

/// Create a product via `POST products` (JSON record or multipart form).
///
/// # Errors
///
/// Returns a [`GatewayError`] if the request fails or the payload is not a product.
pub async fn add_product(gateway: &dyn RemoteGateway, body: impl Into<RequestBody>) -> Result<Product, GatewayError> {
    decode_data(gateway.post(PRODUCTS_PATH, body.into()).await?)
}

/// Partially update a product via `PATCH products/<id>`.
///
/// # Errors
///
/// Returns a [`GatewayError`] if the request fails or the payload is not a product.
pub async fn update_product(
    gateway: &dyn RemoteGateway,
    id: &str,
    body: impl Into<RequestBody>,
) -> Result<Product, GatewayError> {
    decode_data(gateway.patch(&product_endpoint(id), body.into()).await?)
}

/// Delete a product via `DELETE products/<id>`.
///
/// # Errors
///
/// Returns a [`GatewayError`] if the request fails.
pub async fn delete_product(gateway: &dyn RemoteGateway, id: &str) -> Result<(), GatewayError> {
    gateway.delete(&product_endpoint(id)).await
}

// =============================================================================
// CATEGORIES
// =============================================================================

/// List all categories via `GET categories`.
///
/// # Errors
///
/// Returns a [`GatewayError`] if the request fails or `data.items` is malformed.
pub async fn list_categories(gateway: &dyn RemoteGateway) -> Result<Vec<Category>, GatewayError> {
    decode_items::<Category>(gateway.get(CATEGORIES_PATH, &[]).await?).map(|page| page.items)
}
