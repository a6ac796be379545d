//! Integration tests for larder-api
//!
//! Uses wiremock to simulate the remote inventory service and verifies
//! end-to-end behavior of the HTTP adapters: request shapes, response
//! parsing, and error classification.

mod common;

mod test_auth;
mod test_remote_service;
