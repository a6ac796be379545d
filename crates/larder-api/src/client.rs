//! Typed HTTP client for the remote inventory service
//!
//! Wraps `reqwest::Client` with bearer authentication, base URL
//! construction, and the failure classification the sync engine branches
//! on: requests that never reach a server verdict become
//! [`RemoteError::Transport`], everything else is classified from the
//! status code.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use larder_core::domain::{DishIngredient, Ingredient};
use larder_core::ports::RemoteError;

/// Default timeout for a single request
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Wire types
// ============================================================================

/// Request body for ingredient create and update
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientPayload {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub storage_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl IngredientPayload {
    pub fn from_ingredient(ingredient: &Ingredient) -> Self {
        Self {
            name: ingredient.name().to_string(),
            quantity: ingredient.quantity(),
            unit: ingredient.unit().to_string(),
            storage_type: ingredient.storage_type().as_str().to_string(),
            expiration_date: ingredient.expiration_date(),
            image_url: ingredient.image_url().map(|u| u.to_string()),
        }
    }
}

/// An ingredient as the server returns it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientResponse {
    /// Server-assigned identity
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub storage_type: String,
    pub expiration_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request body for dish creation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishPayload {
    pub name: String,
    pub ingredients: Vec<DishIngredientPayload>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DishIngredientPayload {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl From<&DishIngredient> for DishIngredientPayload {
    fn from(line: &DishIngredient) -> Self {
        Self {
            name: line.name.clone(),
            quantity: line.quantity,
            unit: line.unit.clone(),
        }
    }
}

/// A dish as the server returns it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<DishIngredientPayload>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Error body the server attaches to rejected requests
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
    message: Option<String>,
}

// ============================================================================
// ApiClient
// ============================================================================

/// HTTP client for the remote inventory service
///
/// Carries the base URL and, once logged in, the bearer token. The
/// base URL is injectable so tests can point the client at a mock
/// server.
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    /// Creates a new client for the given base URL
    ///
    /// `auth_token` is `None` during the login flow and set for every
    /// authenticated session.
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            auth_token,
        }
    }

    /// Creates a new client with a custom request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            auth_token,
        }
    }

    /// Returns the configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sets the bearer token (after a successful login)
    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.auth_token = Some(token.into());
        debug!("Auth token attached to ApiClient");
    }

    /// Creates a request builder for the given method and path
    ///
    /// Automatically prepends the base URL and adds the Authorization
    /// header when a token is present.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, &url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request and classifies any failure
    ///
    /// Returns the response only for success statuses; every other
    /// outcome is mapped to a [`RemoteError`] variant.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(Self::classify_status(status, response).await)
    }

    /// Maps a non-success status to the failure class the engine acts on
    async fn classify_status(status: StatusCode, response: Response) -> RemoteError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Auth,
            StatusCode::NOT_FOUND => RemoteError::NotFound,
            s if s.is_client_error() => {
                let reason = response
                    .json::<ErrorResponse>()
                    .await
                    .ok()
                    .and_then(|body| body.error.or(body.message))
                    .unwrap_or_else(|| format!("HTTP {}", s));
                RemoteError::Rejection(reason)
            }
            // 5xx: the server failed to produce a verdict; retryable
            s => RemoteError::Transport(format!("HTTP {}", s)),
        }
    }
}
