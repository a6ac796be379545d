//! Tests for the email-code login flow

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use larder_api::HttpAuthService;
use larder_core::ports::{IAuthService, RemoteError};

async fn setup_auth() -> (MockServer, HttpAuthService) {
    let server = MockServer::start().await;
    let auth = HttpAuthService::new(server.uri());
    (server, auth)
}

#[tokio::test]
async fn test_request_code_posts_email() {
    let (server, auth) = setup_auth().await;

    Mock::given(method("POST"))
        .and(path("/auth/request-code"))
        .and(body_json(serde_json::json!({"email": "pat@example.com"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    auth.request_code("pat@example.com").await.unwrap();
}

#[tokio::test]
async fn test_verify_code_builds_session_from_primary_family() {
    let (server, auth) = setup_auth().await;

    Mock::given(method("POST"))
        .and(path("/auth/verify"))
        .and(body_json(serde_json::json!({
            "email": "pat@example.com",
            "code": "123456"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-xyz"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/families"))
        .and(header("authorization", "Bearer tok-xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"_id": "fam-1", "name": "Home"},
            {"_id": "fam-2", "name": "Cabin"}
        ])))
        .mount(&server)
        .await;

    let session = auth.verify_code("pat@example.com", "123456").await.unwrap();
    assert_eq!(session.auth_token, "tok-xyz");
    assert_eq!(session.family_id.as_str(), "fam-1");
    assert_eq!(session.email, "pat@example.com");
}

#[tokio::test]
async fn test_wrong_code_is_rejection() {
    let (server, auth) = setup_auth().await;

    Mock::given(method("POST"))
        .and(path("/auth/verify"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"error": "invalid code"})),
        )
        .mount(&server)
        .await;

    let err = auth.verify_code("pat@example.com", "000000").await.unwrap_err();
    assert!(matches!(err, RemoteError::Rejection(_)));
}

#[tokio::test]
async fn test_account_without_family_is_rejection() {
    let (server, auth) = setup_auth().await;

    Mock::given(method("POST"))
        .and(path("/auth/verify"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok-xyz"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/families"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let err = auth.verify_code("pat@example.com", "123456").await.unwrap_err();
    assert!(matches!(err, RemoteError::Rejection(_)));
}
