//! HTTP-backed account API.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument};

use shopfront_core::traits::AuthApi;
use shopfront_core::{
    AccessToken, ApiUrl, Credentials, RegistrationRequest, Result, TokenPair, User,
};

use crate::client::ApiClient;
use crate::endpoints::Endpoints;

/// A network-backed [`AuthApi`].
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: ApiClient,
    endpoints: Endpoints,
}

impl HttpAuthApi {
    /// Create an API client for `base` with default endpoints and timeout.
    pub fn new(base: ApiUrl) -> Result<Self> {
        Ok(Self::with_client(ApiClient::new(base)?, Endpoints::default()))
    }

    pub fn with_client(client: ApiClient, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair> {
        debug!("Requesting token pair");
        self.client.post(&self.endpoints.login, credentials).await
    }

    #[instrument(skip(self, token))]
    async fn profile(&self, token: &AccessToken) -> Result<User> {
        debug!("Fetching profile");
        self.client
            .get_authed(&self.endpoints.profile, token.as_str())
            .await
    }

    #[instrument(skip(self, request), fields(email = %request.email()))]
    async fn create_user(&self, request: &RegistrationRequest) -> Result<User> {
        debug!("Creating user");
        self.client.post(&self.endpoints.users, request).await
    }

    #[instrument(skip(self, token))]
    async fn logout(&self, token: &AccessToken) -> Result<()> {
        debug!("Invalidating session");
        self.client
            .post_authed_no_response(&self.endpoints.logout, &json!({}), token.as_str())
            .await
    }
}
