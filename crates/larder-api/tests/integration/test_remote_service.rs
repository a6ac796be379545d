//! Tests for HttpRemoteService: CRUD requests and error classification

use wiremock::matchers::{body_json_string, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use larder_core::domain::{Dish, DishIngredient, Ingredient, ServerId, StorageType};
use larder_core::ports::{IRemoteService, RemoteError};

use crate::common::{server_ingredient, setup_remote, TEST_FAMILY, TEST_TOKEN};

fn milk() -> Ingredient {
    Ingredient::new("milk", 1.0, "L", StorageType::Chilled)
}

// ============================================================================
// Ingredient CRUD
// ============================================================================

#[tokio::test]
async fn test_create_ingredient_returns_server_id() {
    let (server, remote) = setup_remote().await;

    Mock::given(method("POST"))
        .and(path(format!("/families/{}/ingredients", TEST_FAMILY)))
        .and(header("authorization", format!("Bearer {}", TEST_TOKEN)))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(server_ingredient("srv-100", "milk", 1.0)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let server_id = remote.create_ingredient(&milk()).await.unwrap();
    assert_eq!(server_id.as_str(), "srv-100");
}

#[tokio::test]
async fn test_create_sends_camel_case_payload() {
    let (server, remote) = setup_remote().await;

    let ingredient = milk();
    let expected = serde_json::json!({
        "name": "milk",
        "quantity": 1.0,
        "unit": "L",
        "storageType": "chilled",
        "expirationDate": ingredient.expiration_date().unwrap(),
    });

    Mock::given(method("POST"))
        .and(path(format!("/families/{}/ingredients", TEST_FAMILY)))
        .and(body_json_string(expected.to_string()))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(server_ingredient("srv-1", "milk", 1.0)),
        )
        .expect(1)
        .mount(&server)
        .await;

    remote.create_ingredient(&ingredient).await.unwrap();
}

#[tokio::test]
async fn test_update_ingredient() {
    let (server, remote) = setup_remote().await;

    Mock::given(method("PUT"))
        .and(path("/ingredients/srv-5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(server_ingredient("srv-5", "milk", 2.0)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut ingredient = milk();
    ingredient.set_quantity(2.0);
    remote
        .update_ingredient(&ServerId::new("srv-5").unwrap(), &ingredient)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_ingredient() {
    let (server, remote) = setup_remote().await;

    Mock::given(method("DELETE"))
        .and(path("/ingredients/srv-5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    remote
        .delete_ingredient(&ServerId::new("srv-5").unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_fetch_ingredients() {
    let (server, remote) = setup_remote().await;

    Mock::given(method("GET"))
        .and(path(format!("/families/{}/ingredients", TEST_FAMILY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            server_ingredient("srv-1", "milk", 1.0),
            server_ingredient("srv-2", "eggs", 12.0),
        ])))
        .mount(&server)
        .await;

    let records = remote.fetch_ingredients().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].server_id.as_str(), "srv-1");
    assert_eq!(records[1].name, "eggs");
    assert_eq!(records[1].storage_type, StorageType::Chilled);
}

#[tokio::test]
async fn test_fetch_accepts_server_storage_aliases() {
    let (server, remote) = setup_remote().await;

    let mut record = server_ingredient("srv-1", "bread", 1.0);
    record["storageType"] = serde_json::json!("room");

    Mock::given(method("GET"))
        .and(path(format!("/families/{}/ingredients", TEST_FAMILY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([record])))
        .mount(&server)
        .await;

    let records = remote.fetch_ingredients().await.unwrap();
    assert_eq!(records[0].storage_type, StorageType::Pantry);
}

#[tokio::test]
async fn test_fetch_skips_malformed_records() {
    let (server, remote) = setup_remote().await;

    let mut bad = server_ingredient("srv-2", "mystery", 1.0);
    bad["storageType"] = serde_json::json!("cellar");

    Mock::given(method("GET"))
        .and(path(format!("/families/{}/ingredients", TEST_FAMILY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            server_ingredient("srv-1", "milk", 1.0),
            bad,
        ])))
        .mount(&server)
        .await;

    let records = remote.fetch_ingredients().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].server_id.as_str(), "srv-1");
}

// ============================================================================
// Error classification
// ============================================================================

#[tokio::test]
async fn test_unauthorized_classifies_as_auth() {
    let (server, remote) = setup_remote().await;

    Mock::given(method("POST"))
        .and(path(format!("/families/{}/ingredients", TEST_FAMILY)))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = remote.create_ingredient(&milk()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Auth));
}

#[tokio::test]
async fn test_not_found_classifies_as_not_found() {
    let (server, remote) = setup_remote().await;

    Mock::given(method("PUT"))
        .and(path("/ingredients/srv-gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = remote
        .update_ingredient(&ServerId::new("srv-gone").unwrap(), &milk())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::NotFound));
}

#[tokio::test]
async fn test_validation_failure_classifies_as_rejection() {
    let (server, remote) = setup_remote().await;

    Mock::given(method("POST"))
        .and(path(format!("/families/{}/ingredients", TEST_FAMILY)))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(serde_json::json!({"error": "name too long"})),
        )
        .mount(&server)
        .await;

    let err = remote.create_ingredient(&milk()).await.unwrap_err();
    match err {
        RemoteError::Rejection(reason) => assert_eq!(reason, "name too long"),
        other => panic!("expected Rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_classifies_as_transport() {
    let (server, remote) = setup_remote().await;

    Mock::given(method("GET"))
        .and(path(format!("/families/{}/ingredients", TEST_FAMILY)))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = remote.fetch_ingredients().await.unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_unreachable_server_classifies_as_transport() {
    // Nothing is listening on this port
    let client = larder_api::ApiClient::new("http://127.0.0.1:1", Some("tok".to_string()));
    let remote = larder_api::HttpRemoteService::new(
        client,
        larder_core::domain::FamilyId::new(TEST_FAMILY).unwrap(),
    );

    let err = remote.fetch_ingredients().await.unwrap_err();
    assert!(err.is_transient());
}

// ============================================================================
// Dish operations
// ============================================================================

#[tokio::test]
async fn test_create_and_fetch_dishes() {
    let (server, remote) = setup_remote().await;

    Mock::given(method("POST"))
        .and(path(format!("/families/{}/dishes", TEST_FAMILY)))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "_id": "dish-1",
            "name": "carbonara",
            "ingredients": [{"name": "spaghetti", "quantity": 200.0, "unit": "g"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/families/{}/dishes", TEST_FAMILY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "_id": "dish-1",
            "name": "carbonara",
            "ingredients": [{"name": "spaghetti", "quantity": 200.0, "unit": "g"}]
        }])))
        .mount(&server)
        .await;

    let dish = Dish::new(
        "carbonara",
        vec![DishIngredient {
            name: "spaghetti".into(),
            quantity: 200.0,
            unit: "g".into(),
        }],
    );
    let server_id = remote.create_dish(&dish).await.unwrap();
    assert_eq!(server_id.as_str(), "dish-1");

    let dishes = remote.fetch_dishes().await.unwrap();
    assert_eq!(dishes.len(), 1);
    assert_eq!(dishes[0].ingredients.len(), 1);
}

#[tokio::test]
async fn test_delete_dish() {
    let (server, remote) = setup_remote().await;

    Mock::given(method("DELETE"))
        .and(path("/dishes/dish-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    remote
        .delete_dish(&ServerId::new("dish-1").unwrap())
        .await
        .unwrap();
}
