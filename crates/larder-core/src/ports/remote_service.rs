//! Remote service port (driven/secondary port)
//!
//! This module defines the interface to the remote inventory service,
//! the system of record shared by all devices of a family. Unlike the
//! record store port, operations here return a typed [`RemoteError`]:
//! the sync engine branches on the failure class (retry transport
//! failures, park rejections, reconcile not-found), so string matching
//! on an opaque error is not an option.

use chrono::{DateTime, Utc};

use crate::domain::{Dish, Ingredient, ServerId, Session, StorageType};

// ============================================================================
// RemoteError
// ============================================================================

/// Classified failure of a remote operation
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The request never produced a server verdict (offline, DNS, timeout).
    /// The record's local state is left untouched and retried next pass.
    #[error("could not reach the remote service: {0}")]
    Transport(String),

    /// The server refused the credentials. Aborts the pass; no further
    /// requests can succeed until the user logs in again.
    #[error("authentication rejected by the remote service")]
    Auth,

    /// The server understood the request and said no (validation, limits).
    /// The record is parked as failed until the user edits it.
    #[error("request rejected by the remote service: {0}")]
    Rejection(String),

    /// The target record does not exist on the server. For updates and
    /// deletes this means another device already removed it.
    #[error("record not found on the remote service")]
    NotFound,
}

impl RemoteError {
    /// Returns true if the operation may succeed on a later attempt
    /// without any user action
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Transport(_))
    }
}

// ============================================================================
// Remote record shapes
// ============================================================================

/// An ingredient as the server reports it
///
/// Carries only the server's view; merging into local records is the
/// sync engine's job.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteIngredient {
    pub server_id: ServerId,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub storage_type: StorageType,
    pub expiration_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A dish as the server reports it
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDish {
    pub server_id: ServerId,
    pub name: String,
    pub ingredients: Vec<crate::domain::DishIngredient>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// IRemoteService trait
// ============================================================================

/// Port trait for the remote inventory service
///
/// Implementations are constructed with an authenticated [`Session`] and
/// scope every request to that session's family. The engine never sees
/// tokens or URLs.
#[async_trait::async_trait]
pub trait IRemoteService: Send + Sync {
    // --- Ingredient operations ---

    /// Creates an ingredient on the server and returns its new identity
    async fn create_ingredient(&self, ingredient: &Ingredient) -> Result<ServerId, RemoteError>;

    /// Pushes the local state of an already-created ingredient
    async fn update_ingredient(
        &self,
        server_id: &ServerId,
        ingredient: &Ingredient,
    ) -> Result<(), RemoteError>;

    /// Deletes an ingredient on the server
    async fn delete_ingredient(&self, server_id: &ServerId) -> Result<(), RemoteError>;

    /// Fetches every ingredient the server holds for the session's family
    async fn fetch_ingredients(&self) -> Result<Vec<RemoteIngredient>, RemoteError>;

    // --- Dish operations ---

    /// Creates a dish on the server and returns its new identity
    async fn create_dish(&self, dish: &Dish) -> Result<ServerId, RemoteError>;

    /// Deletes a dish on the server
    async fn delete_dish(&self, server_id: &ServerId) -> Result<(), RemoteError>;

    /// Fetches every dish the server holds for the session's family
    async fn fetch_dishes(&self) -> Result<Vec<RemoteDish>, RemoteError>;
}

/// Port trait for the email-code login flow
///
/// Split from [`IRemoteService`] because login happens before a session
/// exists.
#[async_trait::async_trait]
pub trait IAuthService: Send + Sync {
    /// Asks the server to email a one-time code to `email`
    async fn request_code(&self, email: &str) -> Result<(), RemoteError>;

    /// Exchanges the emailed code for an authenticated session
    ///
    /// The returned session is scoped to the account's primary family.
    async fn verify_code(&self, email: &str, code: &str) -> Result<Session, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_is_transient() {
        assert!(RemoteError::Transport("connection refused".into()).is_transient());
        assert!(!RemoteError::Auth.is_transient());
        assert!(!RemoteError::Rejection("name too long".into()).is_transient());
        assert!(!RemoteError::NotFound.is_transient());
    }
}
