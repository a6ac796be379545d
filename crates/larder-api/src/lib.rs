//! Larder API - Remote inventory service client
//!
//! HTTP adapter for the family inventory server. Implements the
//! `IRemoteService` and `IAuthService` ports from `larder-core` on top
//! of `reqwest`. It is a driven (secondary) adapter in the hexagonal
//! architecture.
//!
//! ## Key Components
//!
//! - [`ApiClient`] - Typed HTTP client with bearer auth and error classification
//! - [`HttpRemoteService`] - `IRemoteService` implementation scoped to a session
//! - [`HttpAuthService`] - Email-code login flow
//!
//! ## Usage
//!
//! ```no_run
//! use larder_api::{ApiClient, HttpRemoteService};
//! use larder_core::domain::{FamilyId, Session};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let session = Session::new("token", FamilyId::new("fam-1")?, "pat@example.com");
//! let client = ApiClient::new("https://api.fridgemind.app", Some(session.auth_token.clone()));
//! let remote = HttpRemoteService::new(client, session.family_id.clone());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod service;

pub use client::ApiClient;
pub use service::{HttpAuthService, HttpRemoteService};
