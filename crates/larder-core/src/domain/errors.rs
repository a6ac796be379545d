//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including validation failures and illegal identity changes.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Server identifier was empty or malformed
    #[error("Invalid server ID: {0}")]
    InvalidServerId(String),

    /// Family identifier was empty or malformed
    #[error("Invalid family ID: {0}")]
    InvalidFamilyId(String),

    /// Attempt to replace a server ID that was already assigned.
    /// A server ID is never cleared or rewritten once the remote service
    /// has accepted the record.
    #[error("Server ID already assigned: have {existing}, got {incoming}")]
    ServerIdMismatch {
        /// The server ID already attached to the record
        existing: String,
        /// The conflicting server ID from the response
        incoming: String,
    },

    /// Unknown storage type string
    #[error("Unknown storage type: {0}")]
    InvalidStorageType(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
