use reqwest::{Client, Request};
use serde::de::DeserializeOwned;
use shared::{
    domain::UserProfile,
    protocol::{
        EventListQuery, EventPage, FcmTokenRequest, PasswordGrantRequest, TokenResponse,
    },
};
use tracing::debug;

use crate::{
    config::{ClientConfig, Endpoints},
    error::{ApiError, ConfigError},
};

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            endpoints: config.endpoints.clone(),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn list_events(&self, query: &EventListQuery) -> Result<EventPage, ApiError> {
        let url = self.url(&self.endpoints.events);
        let request = self
            .http
            .get(&url)
            .query(query)
            .build()
            .map_err(|source| ApiError::Transport { url, source })?;
        self.execute_json(request).await
    }

    pub async fn request_token(
        &self,
        grant: &PasswordGrantRequest,
    ) -> Result<TokenResponse, ApiError> {
        let url = self.url(&self.endpoints.login);
        let request = self
            .http
            .post(&url)
            .json(grant)
            .build()
            .map_err(|source| ApiError::Transport { url, source })?;
        self.execute_json(request).await
    }

    pub async fn current_user(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        let url = self.url(&self.endpoints.current_user);
        let request = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .build()
            .map_err(|source| ApiError::Transport { url, source })?;
        self.execute_json(request).await
    }

    pub async fn save_fcm_token(&self, access_token: &str, fcm_token: &str) -> Result<(), ApiError> {
        let url = self.url(&self.endpoints.save_fcm_token);
        let request = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&FcmTokenRequest {
                fcm_token: fcm_token.to_string(),
            })
            .build()
            .map_err(|source| ApiError::Transport { url, source })?;
        self.execute(request).await?;
        Ok(())
    }

    async fn execute(&self, request: Request) -> Result<reqwest::Response, ApiError> {
        let url = request.url().to_string();
        debug!(method = %request.method(), url = %url, "sending api request");
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // A body that cannot be read still carries the status.
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status { url, status, body })
    }

    async fn execute_json<T: DeserializeOwned>(&self, request: Request) -> Result<T, ApiError> {
        let url = request.url().to_string();
        let response = self.execute(request).await?;
        response
            .json()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }
}
