//! Replay-latest views of the current user.
//!
//! Both views wrap a receiver of the same watch channel, so a subscriber to
//! [`AuthStatus`] sees updates in exactly the order [`CurrentUser`] does.
//! Intermediate values may be coalesced; a subscriber always catches up to
//! the latest one.

use futures_core::Stream;
use thiserror::Error;
use tokio::sync::watch;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;

use crate::types::User;

/// The session manager that fed this subscription was dropped.
#[derive(Debug, Clone, Copy, Error)]
#[error("session manager dropped")]
pub struct SessionClosed;

/// Live view of the logged-in user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    rx: watch::Receiver<Option<User>>,
}

impl CurrentUser {
    pub(crate) fn new(rx: watch::Receiver<Option<User>>) -> Self {
        Self { rx }
    }

    /// The latest known user.
    pub fn get(&self) -> Option<User> {
        self.rx.borrow().clone()
    }

    /// Wait for the next update and return it.
    pub async fn changed(&mut self) -> Result<Option<User>, SessionClosed> {
        self.rx.changed().await.map_err(|_| SessionClosed)?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Wait until the user matches `predicate`.
    ///
    /// Returns immediately if the latest value already matches.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(Option<&User>) -> bool,
    ) -> Result<Option<User>, SessionClosed> {
        let user = self
            .rx
            .wait_for(|user| predicate(user.as_ref()))
            .await
            .map_err(|_| SessionClosed)?;
        Ok(user.clone())
    }

    /// Stream the latest value immediately, then every update.
    pub fn into_stream(self) -> impl Stream<Item = Option<User>> + Send + 'static {
        WatchStream::new(self.rx)
    }
}

/// Live view of whether a user is logged in.
///
/// Derived from the same channel as [`CurrentUser`]: `true` exactly when the
/// current user is present.
#[derive(Debug, Clone)]
pub struct AuthStatus {
    rx: watch::Receiver<Option<User>>,
}

impl AuthStatus {
    pub(crate) fn new(rx: watch::Receiver<Option<User>>) -> Self {
        Self { rx }
    }

    pub fn get(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Wait for the next update and return it.
    pub async fn changed(&mut self) -> Result<bool, SessionClosed> {
        self.rx.changed().await.map_err(|_| SessionClosed)?;
        Ok(self.rx.borrow_and_update().is_some())
    }

    /// Wait until the status equals `authenticated`.
    pub async fn wait_for(&mut self, authenticated: bool) -> Result<(), SessionClosed> {
        self.rx
            .wait_for(|user| user.is_some() == authenticated)
            .await
            .map_err(|_| SessionClosed)?;
        Ok(())
    }

    /// Stream the latest status immediately, then every update.
    pub fn into_stream(self) -> impl Stream<Item = bool> + Send + 'static {
        WatchStream::new(self.rx).map(|user| user.is_some())
    }
}
