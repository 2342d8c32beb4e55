//! Remote gateway: the generic REST wrapper both stores talk through.
//!
//! ARCHITECTURE
//! ============
//! `RemoteGateway` is the seam between state and transport. Stores hold an
//! `Arc<dyn RemoteGateway>`; production wires in [`HttpGateway`] (reqwest),
//! tests wire in a queued mock. Methods move raw JSON so the trait stays
//! object-safe; typed decoding lives in [`decode_data`] / [`decode_items`].
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, non-2xx statuses, and undecodable bodies each get their
//! own [`GatewayError`] variant. Stores collapse them into a single rejected
//! outcome but keep the variant so callers can still see why.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::path::Path;
use std::sync::RwLock;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::ListPage;
use crate::config::HttpTimeouts;
use crate::error::ErrorCode;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by remote gateway calls.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response (connect, timeout, TLS, body read).
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("server responded with status {status}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for GatewayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_GATEWAY_REQUEST",
            Self::Status { .. } => "E_GATEWAY_STATUS",
            Self::Decode(_) => "E_GATEWAY_DECODE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

/// A file attached to a multipart form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Read a file from disk, naming the upload after the file.
    ///
    /// # Errors
    ///
    /// Returns the underlying io error if the file cannot be read.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
        let mime = guess_mime(&file_name).map(str::to_owned);
        Ok(Self { file_name, mime, bytes })
    }
}

fn guess_mime(file_name: &str) -> Option<&'static str> {
    mime_guess::from_path(file_name).first_raw()
}

#[derive(Clone, Debug, PartialEq)]
pub enum FormValue {
    Text(String),
    File(FileUpload),
}

/// One named part of a multipart form.
#[derive(Clone, Debug, PartialEq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: FormValue::Text(value.into()) }
    }

    pub fn file(name: impl Into<String>, upload: FileUpload) -> Self {
        Self { name: name.into(), value: FormValue::File(upload) }
    }
}

/// Body for `POST`/`PATCH`: a structured record or a multipart form.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<FormField>),
}

impl RequestBody {
    /// Serialize any record into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Decode`] if `value` cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, GatewayError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Generic REST access. Paths are relative to the gateway's base URL.
#[async_trait::async_trait]
pub trait RemoteGateway: Send + Sync {
    /// `GET <path>?<query>`, returning the full response envelope.
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, GatewayError>;

    /// `POST <path>` with a body, returning the full response envelope.
    async fn post(&self, path: &str, body: RequestBody) -> Result<Value, GatewayError>;

    /// `PATCH <path>` with a partial body, returning the full response envelope.
    async fn patch(&self, path: &str, body: RequestBody) -> Result<Value, GatewayError>;

    /// `DELETE <path>`. Any response body is ignored.
    async fn delete(&self, path: &str) -> Result<(), GatewayError>;

    /// Bearer token to attach to subsequent requests; `None` stops sending one.
    fn set_access_token(&self, token: Option<String>) {
        let _ = token;
    }
}

// =============================================================================
// ENVELOPE DECODING
// =============================================================================

/// Decode `envelope.data` as `T`.
///
/// # Errors
///
/// Returns [`GatewayError::Decode`] if `data` is missing or has the wrong shape.
pub fn decode_data<T: DeserializeOwned>(envelope: Value) -> Result<T, GatewayError> {
    let Value::Object(mut map) = envelope else {
        return Err(GatewayError::Decode("response is not a JSON object".to_owned()));
    };
    let data = map
        .remove("data")
        .ok_or_else(|| GatewayError::Decode("missing `data` field".to_owned()))?;
    serde_json::from_value(data).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Decode `envelope.data` as a list page (`{items: [...], ...}`).
///
/// # Errors
///
/// Returns [`GatewayError::Decode`] if `data.items` is missing or has the wrong shape.
pub fn decode_items<T: DeserializeOwned>(envelope: Value) -> Result<ListPage<T>, GatewayError> {
    decode_data(envelope)
}

// =============================================================================
// HTTP
// =============================================================================

/// Join a base URL and a relative path with exactly one `/` between them.
fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn parse_body(text: &str) -> Result<Value, GatewayError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| GatewayError::Decode(e.to_string()))
}

fn into_multipart(fields: Vec<FormField>) -> Result<reqwest::multipart::Form, GatewayError> {
    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        form = match field.value {
            FormValue::Text(text) => form.text(field.name, text),
            FormValue::File(upload) => {
                let mut part = reqwest::multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
                if let Some(mime) = upload.mime {
                    part = part
                        .mime_str(&mime)
                        .map_err(|e| GatewayError::Request(e.to_string()))?;
                }
                form.part(field.name, part)
            }
        };
    }
    Ok(form)
}

/// reqwest-backed gateway against a fixed API base URL.
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    access_token: RwLock<Option<String>>,
}

impl HttpGateway {
    /// Build a gateway for `base_url` with request/connect timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| GatewayError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.into(), access_token: RwLock::new(None) })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, join_url(&self.base_url, path));
        let token = self
            .access_token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn with_body(builder: reqwest::RequestBuilder, body: RequestBody) -> Result<reqwest::RequestBuilder, GatewayError> {
        Ok(match body {
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(fields) => builder.multipart(into_multipart(fields)?),
        })
    }

    async fn send(&self, method: reqwest::Method, path: &str, builder: reqwest::RequestBuilder) -> Result<Value, GatewayError> {
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        tracing::debug!(%method, path, status, "gateway response");

        if !(200..300).contains(&status) {
            return Err(GatewayError::Status { status, body: text });
        }

        parse_body(&text)
    }
}

#[async_trait::async_trait]
impl RemoteGateway for HttpGateway {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, GatewayError> {
        let builder = self.request(reqwest::Method::GET, path).query(query);
        self.send(reqwest::Method::GET, path, builder).await
    }

    async fn post(&self, path: &str, body: RequestBody) -> Result<Value, GatewayError> {
        let builder = Self::with_body(self.request(reqwest::Method::POST, path), body)?;
        self.send(reqwest::Method::POST, path, builder).await
    }

    async fn patch(&self, path: &str, body: RequestBody) -> Result<Value, GatewayError> {
        let builder = Self::with_body(self.request(reqwest::Method::PATCH, path), body)?;
        self.send(reqwest::Method::PATCH, path, builder).await
    }

    async fn delete(&self, path: &str) -> Result<(), GatewayError> {
        let builder = self.request(reqwest::Method::DELETE, path);
        self.send(reqwest::Method::DELETE, path, builder).await.map(|_| ())
    }

    fn set_access_token(&self, token: Option<String>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = token;
    }
}
