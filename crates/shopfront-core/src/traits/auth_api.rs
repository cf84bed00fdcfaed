//! Account API trait.

use async_trait::async_trait;

use crate::types::User;
use crate::{AccessToken, Credentials, RegistrationRequest, Result, TokenPair};

/// The remote account API consumed by the session manager.
///
/// Implementations report non-success responses as
/// [`Error::Protocol`](crate::Error::Protocol) so the session manager can
/// classify them.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a token pair.
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair>;

    /// Fetch the profile of the user owning `token`.
    async fn profile(&self, token: &AccessToken) -> Result<User>;

    /// Create a new account.
    async fn create_user(&self, request: &RegistrationRequest) -> Result<User>;

    /// Invalidate the session server-side.
    async fn logout(&self, token: &AccessToken) -> Result<()>;
}

#[async_trait]
impl<T: AuthApi + ?Sized> AuthApi for std::sync::Arc<T> {
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair> {
        (**self).login(credentials).await
    }

    async fn profile(&self, token: &AccessToken) -> Result<User> {
        (**self).profile(token).await
    }

    async fn create_user(&self, request: &RegistrationRequest) -> Result<User> {
        (**self).create_user(request).await
    }

    async fn logout(&self, token: &AccessToken) -> Result<()> {
        (**self).logout(token).await
    }
}
