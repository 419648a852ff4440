use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use krus_core::model::{
    AuthResponse, BeerPost, CreateBeerPostInput, Friendship, LoginCredentials, PostId,
    RegisterCredentials, UpdateBeerPostInput, UpdateProfileInput, User, UserSearchResult,
};

use crate::client::RemoteApi;
use crate::config::ApiConfig;
use crate::error::ApiError;

/// HTTP client for the Krus backend.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            tracing::debug!(status = status.as_u16(), "api request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }

    /// For endpoints whose response body carries nothing we need.
    async fn send_discarding_body(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            tracing::debug!(status = status.as_u16(), "api request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

impl RemoteApi for HttpApi {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, ApiError> {
        self.send(self.client.post(self.url("/auth/login")).json(credentials))
            .await
    }

    async fn register(&self, credentials: &RegisterCredentials) -> Result<AuthResponse, ApiError> {
        self.send(
            self.client
                .post(self.url("/auth/register"))
                .json(credentials),
        )
        .await
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        self.send(self.client.get(self.url("/auth/me")).bearer_auth(token))
            .await
    }

    async fn update_profile(
        &self,
        token: &str,
        input: &UpdateProfileInput,
    ) -> Result<User, ApiError> {
        self.send(
            self.client
                .put(self.url("/profile"))
                .bearer_auth(token)
                .json(input),
        )
        .await
    }

    async fn list_posts(&self, token: &str) -> Result<Vec<BeerPost>, ApiError> {
        self.send(self.client.get(self.url("/posts")).bearer_auth(token))
            .await
    }

    async fn get_post(&self, token: &str, id: &PostId) -> Result<BeerPost, ApiError> {
        self.send(
            self.client
                .get(self.url(&format!("/posts/{}", id)))
                .bearer_auth(token),
        )
        .await
    }

    async fn create_post(
        &self,
        token: &str,
        input: &CreateBeerPostInput,
    ) -> Result<BeerPost, ApiError> {
        self.send(
            self.client
                .post(self.url("/posts"))
                .bearer_auth(token)
                .json(input),
        )
        .await
    }

    async fn update_post(
        &self,
        token: &str,
        input: &UpdateBeerPostInput,
    ) -> Result<BeerPost, ApiError> {
        self.send(
            self.client
                .put(self.url(&format!("/posts/{}", input.id)))
                .bearer_auth(token)
                .json(input),
        )
        .await
    }

    async fn delete_post(&self, token: &str, id: &PostId) -> Result<(), ApiError> {
        self.send_discarding_body(
            self.client
                .delete(self.url(&format!("/posts/{}", id)))
                .bearer_auth(token),
        )
        .await
    }

    async fn search_users(
        &self,
        token: &str,
        query: &str,
    ) -> Result<Vec<UserSearchResult>, ApiError> {
        self.send(
            self.client
                .get(self.url("/users/search"))
                .query(&[("query", query)])
                .bearer_auth(token),
        )
        .await
    }

    async fn list_friends(&self, token: &str) -> Result<Vec<Friendship>, ApiError> {
        self.send(self.client.get(self.url("/friends")).bearer_auth(token))
            .await
    }

    async fn send_friend_request(&self, token: &str, receiver_id: &str) -> Result<(), ApiError> {
        self.send_discarding_body(
            self.client
                .post(self.url("/friends/requests"))
                .bearer_auth(token)
                .json(&serde_json::json!({ "receiverId": receiver_id })),
        )
        .await
    }

    async fn accept_friend_request(
        &self,
        token: &str,
        friendship_id: &str,
    ) -> Result<(), ApiError> {
        self.send_discarding_body(
            self.client
                .post(self.url(&format!("/friends/requests/{}/accept", friendship_id)))
                .bearer_auth(token),
        )
        .await
    }

    async fn remove_friendship(&self, token: &str, friendship_id: &str) -> Result<(), ApiError> {
        self.send_discarding_body(
            self.client
                .delete(self.url(&format!("/friends/{}", friendship_id)))
                .bearer_auth(token),
        )
        .await
    }
}
