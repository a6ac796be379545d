//! Shared test helpers for remote service integration tests
//!
//! Provides wiremock-based mock server setup for the inventory API.
//! Each helper mounts the necessary mock endpoints and returns a
//! configured service pointing at the mock server.

use wiremock::MockServer;

use larder_api::{ApiClient, HttpRemoteService};
use larder_core::domain::FamilyId;

pub const TEST_FAMILY: &str = "fam-test-001";
pub const TEST_TOKEN: &str = "test-access-token";

/// Starts a mock server and returns it with a service scoped to the
/// test family. Tests mount their own endpoint mocks.
pub async fn setup_remote() -> (MockServer, HttpRemoteService) {
    let server = MockServer::start().await;
    let client = ApiClient::new(server.uri(), Some(TEST_TOKEN.to_string()));
    let service = HttpRemoteService::new(client, FamilyId::new(TEST_FAMILY).unwrap());
    (server, service)
}

/// A server-side ingredient record in wire form
pub fn server_ingredient(id: &str, name: &str, quantity: f64) -> serde_json::Value {
    serde_json::json!({
        "_id": id,
        "name": name,
        "quantity": quantity,
        "unit": "pcs",
        "storageType": "chilled",
        "expirationDate": "2026-09-06T12:00:00Z",
        "createdAt": "2026-08-30T08:00:00Z",
        "updatedAt": "2026-08-30T08:00:00Z"
    })
}
