//! HTTP client for the account API.

use std::time::Duration;

use reqwest::multipart::Form;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use shopfront_core::ApiUrl;
use shopfront_core::error::{Error, ProtocolError, TransportError};

use crate::endpoints::ApiErrorResponse;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Convert a reqwest failure into the transport taxonomy.
pub(crate) fn map_reqwest(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

/// JSON-over-HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: ApiUrl,
}

impl ApiClient {
    /// Create a new client with the default timeout.
    pub fn new(base: ApiUrl) -> Result<Self, Error> {
        Self::with_timeout(base, DEFAULT_TIMEOUT)
    }

    /// Create a new client whose requests give up after `timeout`.
    pub fn with_timeout(base: ApiUrl, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("shopfront/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(map_reqwest)?;

        Ok(Self { client, base })
    }

    /// Returns the base URL this client is configured for.
    pub fn base(&self) -> &ApiUrl {
        &self.base
    }

    /// Make an authenticated GET request.
    #[instrument(skip(self, token), fields(api = %self.base))]
    pub async fn get_authed<R>(&self, path: &str, token: &str) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        let url = self.base.endpoint(path);
        debug!(%url, "GET (authenticated)");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    /// Make an unauthenticated JSON POST request.
    #[instrument(skip(self, body), fields(api = %self.base))]
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.base.endpoint(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    /// Make an authenticated JSON POST whose response body is ignored.
    #[instrument(skip(self, body, token), fields(api = %self.base))]
    pub async fn post_authed_no_response<B>(
        &self,
        path: &str,
        body: &B,
        token: &str,
    ) -> Result<(), Error>
    where
        B: Serialize + ?Sized,
    {
        let url = self.base.endpoint(path);
        debug!(%url, "POST (authenticated, no response)");

        let response = self
            .client
            .post(&url)
            .json(body)
            .bearer_auth(token)
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error = self.parse_error_response(response).await;
            Err(Error::Protocol(error))
        }
    }

    /// Make an unauthenticated multipart POST request.
    #[instrument(skip(self, form), fields(api = %self.base))]
    pub async fn post_multipart<R>(&self, path: &str, form: Form) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        let url = self.base.endpoint(path);
        debug!(%url, "POST (multipart)");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    /// Handle a response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<R, Error> {
        let status = response.status();
        trace!(status = %status, "API response");

        if status.is_success() {
            let body = response.json::<R>().await.map_err(map_reqwest)?;
            Ok(body)
        } else {
            let error = self.parse_error_response(response).await;
            Err(Error::Protocol(error))
        }
    }

    /// Parse an API error response.
    async fn parse_error_response(&self, response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<ApiErrorResponse>().await {
            Ok(body) => ProtocolError::new(status, body.error, body.message.map(|m| m.joined())),
            Err(_) => ProtocolError::new(status, None, None),
        }
    }
}
