//! Wire DTOs for the storefront REST API.
//!
//! DESIGN
//! ======
//! Field names on the wire follow the backend (`price`, `discount`); Rust
//! names say what the value means (`unit_price`, `discount_percent`). Unknown
//! profile fields on a user are kept so a persisted user round-trips intact.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::gateway::{FileUpload, FormField, RequestBody};

/// Accept either a JSON string or a JSON number for identifier fields.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// The authenticated user returned by login/register and persisted locally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Bearer token issued for this session.
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Any other profile fields the backend sends.
    #[serde(flatten)]
    pub profile: serde_json::Map<String, serde_json::Value>,
}

/// Login request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDetails {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
}

// =============================================================================
// CART
// =============================================================================

/// One product entry in a cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier; unique within one cart.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    /// Thumbnail file name, relative to the product's image folder.
    #[serde(default)]
    pub thumbnail: String,
    #[serde(rename = "price")]
    pub unit_price: f64,
    /// Percentage of the unit price actually charged (90 means 90% of price).
    #[serde(rename = "discount")]
    pub discount_percent: f64,
    pub quantity: u32,
}

impl LineItem {
    /// `unit_price * quantity * discount_percent / 100`.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity) * self.discount_percent / 100.0
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// A product as listed in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// A product category used for navigation menus and the product form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// A page of list results: `data.items` plus whatever paging fields the backend adds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    #[serde(flatten)]
    pub meta: serde_json::Map<String, serde_json::Value>,
}

/// Query options for the product list endpoint. Unset fields are omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductListConfig {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub category: Option<String>,
    pub name: Option<String>,
}

impl ProductListConfig {
    /// Render as query pairs in a stable order.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page".to_owned(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_owned(), limit.to_string()));
        }
        let text = [
            ("sort_by", &self.sort_by),
            ("order", &self.order),
            ("category", &self.category),
            ("name", &self.name),
        ];
        for (key, value) in text {
            if let Some(value) = value {
                query.push((key.to_owned(), value.clone()));
            }
        }
        query
    }
}

/// The admin product-creation form, submitted as multipart.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub stock: u32,
    pub brand: String,
    /// Category slug.
    pub category: String,
    pub thumbnail: FileUpload,
    pub images: Vec<FileUpload>,
}

impl ProductDraft {
    /// Flatten into multipart fields; every image shares the `images` field name.
    #[must_use]
    pub fn into_form(self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::text("title", self.title),
            FormField::text("description", self.description),
            FormField::text("price", self.price.to_string()),
            FormField::text("stock", self.stock.to_string()),
            FormField::text("brand", self.brand),
            FormField::text("category", self.category),
            FormField::file("thumbnail", self.thumbnail),
        ];
        fields.extend(self.images.into_iter().map(|image| FormField::file("images", image)));
        fields
    }
}

impl From<ProductDraft> for RequestBody {
    fn from(draft: ProductDraft) -> Self {
        Self::Form(draft.into_form())
    }
}
