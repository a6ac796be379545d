//! Port implementations over the inventory server's REST API
//!
//! Routes follow the server's layout: collection endpoints are scoped
//! by family, record endpoints by server ID.
//!
//! - `GET  /families/{familyId}/ingredients`
//! - `POST /families/{familyId}/ingredients`
//! - `PUT  /ingredients/{id}`
//! - `DELETE /ingredients/{id}`
//! - dishes analogous
//! - `POST /auth/request-code`, `POST /auth/verify`, `GET /families`

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use larder_core::domain::{Dish, DishIngredient, FamilyId, Ingredient, ServerId, Session};
use larder_core::ports::{
    IAuthService, IRemoteService, RemoteDish, RemoteError, RemoteIngredient,
};

use crate::client::{
    ApiClient, DishPayload, DishResponse, IngredientPayload, IngredientResponse,
};

// ============================================================================
// Response -> port type conversion
// ============================================================================

fn remote_ingredient_from_response(
    response: IngredientResponse,
) -> Result<RemoteIngredient, String> {
    let server_id = ServerId::new(response.id).map_err(|e| e.to_string())?;
    let storage_type = response
        .storage_type
        .parse()
        .map_err(|e: larder_core::domain::DomainError| e.to_string())?;

    Ok(RemoteIngredient {
        server_id,
        name: response.name,
        quantity: response.quantity,
        unit: response.unit,
        storage_type,
        expiration_date: response.expiration_date,
        image_url: response.image_url,
        created_at: response.created_at,
        updated_at: response.updated_at,
    })
}

fn remote_dish_from_response(response: DishResponse) -> Result<RemoteDish, String> {
    let server_id = ServerId::new(response.id).map_err(|e| e.to_string())?;
    let ingredients = response
        .ingredients
        .into_iter()
        .map(|line| DishIngredient {
            name: line.name,
            quantity: line.quantity,
            unit: line.unit,
        })
        .collect();

    Ok(RemoteDish {
        server_id,
        name: response.name,
        ingredients,
        created_at: response.created_at,
        updated_at: response.updated_at,
    })
}

// ============================================================================
// HttpRemoteService
// ============================================================================

/// `IRemoteService` implementation over the inventory server's REST API
pub struct HttpRemoteService {
    client: ApiClient,
    family_id: FamilyId,
}

impl HttpRemoteService {
    /// Creates a new service scoped to the given family
    pub fn new(client: ApiClient, family_id: FamilyId) -> Self {
        Self { client, family_id }
    }

    /// Creates a service directly from an authenticated session
    pub fn from_session(base_url: impl Into<String>, session: &Session) -> Self {
        let client = ApiClient::new(base_url, Some(session.auth_token.clone()));
        Self::new(client, session.family_id.clone())
    }
}

#[async_trait::async_trait]
impl IRemoteService for HttpRemoteService {
    async fn create_ingredient(&self, ingredient: &Ingredient) -> Result<ServerId, RemoteError> {
        debug!(name = ingredient.name(), "Creating ingredient on server");

        let path = format!("/families/{}/ingredients", self.family_id);
        let payload = IngredientPayload::from_ingredient(ingredient);
        let response = self
            .client
            .send(self.client.request(Method::POST, &path).json(&payload))
            .await?;

        let created: IngredientResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Transport(format!("Invalid create response: {}", e)))?;

        ServerId::new(created.id)
            .map_err(|e| RemoteError::Transport(format!("Invalid server id in response: {}", e)))
    }

    async fn update_ingredient(
        &self,
        server_id: &ServerId,
        ingredient: &Ingredient,
    ) -> Result<(), RemoteError> {
        debug!(%server_id, "Updating ingredient on server");

        let path = format!("/ingredients/{}", server_id);
        let payload = IngredientPayload::from_ingredient(ingredient);
        self.client
            .send(self.client.request(Method::PUT, &path).json(&payload))
            .await?;
        Ok(())
    }

    async fn delete_ingredient(&self, server_id: &ServerId) -> Result<(), RemoteError> {
        debug!(%server_id, "Deleting ingredient on server");

        let path = format!("/ingredients/{}", server_id);
        self.client
            .send(self.client.request(Method::DELETE, &path))
            .await?;
        Ok(())
    }

    async fn fetch_ingredients(&self) -> Result<Vec<RemoteIngredient>, RemoteError> {
        let path = format!("/families/{}/ingredients", self.family_id);
        let response = self.client.send(self.client.request(Method::GET, &path)).await?;

        let records: Vec<IngredientResponse> = response
            .json()
            .await
            .map_err(|e| RemoteError::Transport(format!("Invalid fetch response: {}", e)))?;

        // Malformed records are skipped rather than failing the whole pull
        let mut result = Vec::with_capacity(records.len());
        for record in records {
            match remote_ingredient_from_response(record) {
                Ok(remote) => result.push(remote),
                Err(reason) => warn!(%reason, "Skipping malformed ingredient from server"),
            }
        }
        Ok(result)
    }

    async fn create_dish(&self, dish: &Dish) -> Result<ServerId, RemoteError> {
        debug!(name = dish.name(), "Creating dish on server");

        let path = format!("/families/{}/dishes", self.family_id);
        let payload = DishPayload {
            name: dish.name().to_string(),
            ingredients: dish.ingredients().iter().map(Into::into).collect(),
        };
        let response = self
            .client
            .send(self.client.request(Method::POST, &path).json(&payload))
            .await?;

        let created: DishResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Transport(format!("Invalid create response: {}", e)))?;

        ServerId::new(created.id)
            .map_err(|e| RemoteError::Transport(format!("Invalid server id in response: {}", e)))
    }

    async fn delete_dish(&self, server_id: &ServerId) -> Result<(), RemoteError> {
        debug!(%server_id, "Deleting dish on server");

        let path = format!("/dishes/{}", server_id);
        self.client
            .send(self.client.request(Method::DELETE, &path))
            .await?;
        Ok(())
    }

    async fn fetch_dishes(&self) -> Result<Vec<RemoteDish>, RemoteError> {
        let path = format!("/families/{}/dishes", self.family_id);
        let response = self.client.send(self.client.request(Method::GET, &path)).await?;

        let records: Vec<DishResponse> = response
            .json()
            .await
            .map_err(|e| RemoteError::Transport(format!("Invalid fetch response: {}", e)))?;

        let mut result = Vec::with_capacity(records.len());
        for record in records {
            match remote_dish_from_response(record) {
                Ok(remote) => result.push(remote),
                Err(reason) => warn!(%reason, "Skipping malformed dish from server"),
            }
        }
        Ok(result)
    }
}

// ============================================================================
// HttpAuthService
// ============================================================================

#[derive(Debug, Serialize)]
struct RequestCodeBody<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyCodeBody<'a> {
    email: &'a str,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct FamilyResponse {
    #[serde(rename = "_id")]
    id: String,
    #[allow(dead_code)]
    name: Option<String>,
}

/// Email-code login flow against the inventory server
pub struct HttpAuthService {
    base_url: String,
}

impl HttpAuthService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl IAuthService for HttpAuthService {
    async fn request_code(&self, email: &str) -> Result<(), RemoteError> {
        debug!(email, "Requesting login code");

        let client = ApiClient::new(&self.base_url, None);
        client
            .send(
                client
                    .request(Method::POST, "/auth/request-code")
                    .json(&RequestCodeBody { email }),
            )
            .await?;
        Ok(())
    }

    async fn verify_code(&self, email: &str, code: &str) -> Result<Session, RemoteError> {
        debug!(email, "Verifying login code");

        let client = ApiClient::new(&self.base_url, None);
        let response = client
            .send(
                client
                    .request(Method::POST, "/auth/verify")
                    .json(&VerifyCodeBody { email, code }),
            )
            .await?;

        let verified: VerifyResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Transport(format!("Invalid verify response: {}", e)))?;

        // Sessions are scoped to the account's primary family
        let authed = ApiClient::new(&self.base_url, Some(verified.token.clone()));
        let response = authed.send(authed.request(Method::GET, "/families")).await?;

        let families: Vec<FamilyResponse> = response
            .json()
            .await
            .map_err(|e| RemoteError::Transport(format!("Invalid families response: {}", e)))?;

        let first = families
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::Rejection("Account has no family".to_string()))?;

        let family_id = FamilyId::new(first.id)
            .map_err(|e| RemoteError::Transport(format!("Invalid family id: {}", e)))?;

        Ok(Session::new(verified.token, family_id, email))
    }
}
