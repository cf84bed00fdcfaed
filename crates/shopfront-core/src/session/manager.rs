//! The session manager.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::error::AuthError;
use crate::traits::{AuthApi, TokenStore};
use crate::types::User;
use crate::{AccessToken, Credentials, RegistrationRequest, TokenPair};

use super::state::SessionState;
use super::subscription::{AuthStatus, CurrentUser, SessionClosed};

/// Single source of truth for who is logged in.
///
/// Orchestrates login, registration, logout and profile refresh against an
/// [`AuthApi`], persists tokens in a [`TokenStore`], and publishes the
/// current user to any number of subscribers.
///
/// # Ordering
///
/// Token writes, current-user updates and state changes are serialized
/// behind one lock that is never held across an `.await`. Concurrent
/// operations resolve last-write-wins by completion order. A profile fetch is
/// applied only if no token write or clear completed after it started, so a
/// present user always implies stored tokens.
///
/// The published [`SessionState`] is derived under that lock: it stays
/// `Authenticating` or `Restoring` while any login request or the profile
/// fetch for the current tokens is outstanding.
///
/// # Thread Safety
///
/// Managers are cheap to clone (they use internal `Arc`); clones share the
/// same session.
///
/// # Example
///
/// ```no_run
/// use shopfront_core::{Credentials, MemoryTokenStore, SessionManager};
/// # async fn example(api: impl shopfront_core::AuthApi + 'static) {
/// let session = SessionManager::new(api, MemoryTokenStore::new());
/// let mut user = session.current_user();
///
/// session.login(&Credentials::new("a@b.com", "secret1")).await.unwrap();
/// let user = user.wait_for(|u| u.is_some()).await.unwrap();
/// # }
/// ```
pub struct SessionManager<A, S> {
    inner: Arc<Inner<A, S>>,
}

struct Inner<A, S> {
    api: A,
    store: S,
    ledger: Mutex<Ledger>,
    user: watch::Sender<Option<User>>,
    state: watch::Sender<SessionState>,
}

/// Bookkeeping behind the session lock.
#[derive(Debug, Default)]
struct Ledger {
    /// Bumped on every token write or clear.
    generation: u64,
    /// The profile fetch for the current generation, if one is outstanding.
    pending: Option<Fetch>,
    /// Login requests awaiting the API.
    logins: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fetch {
    Login,
    Restore,
}

/// Decrements the in-flight login count however the login ends.
struct LoginGuard<'a, A, S>
where
    A: AuthApi + 'static,
    S: TokenStore + 'static,
{
    manager: &'a SessionManager<A, S>,
}

impl<A, S> Drop for LoginGuard<'_, A, S>
where
    A: AuthApi + 'static,
    S: TokenStore + 'static,
{
    fn drop(&mut self) {
        let mut ledger = self.manager.lock_ledger();
        ledger.logins = ledger.logins.saturating_sub(1);
        self.manager.publish_state(&ledger);
    }
}

impl<A, S> Clone for SessionManager<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, S> SessionManager<A, S>
where
    A: AuthApi + 'static,
    S: TokenStore + 'static,
{
    /// Create an anonymous session manager.
    ///
    /// Stored tokens are not examined; call [`restore`](Self::restore) or use
    /// [`start`](Self::start) for that.
    pub fn new(api: A, store: S) -> Self {
        let (user, _) = watch::channel(None);
        let (state, _) = watch::channel(SessionState::Anonymous);
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                ledger: Mutex::new(Ledger::default()),
                user,
                state,
            }),
        }
    }

    /// Create a session manager and restore any stored session in the
    /// background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(api: A, store: S) -> Self {
        let manager = Self::new(api, store);
        let task = manager.clone();
        tokio::spawn(async move {
            task.restore().await;
        });
        manager
    }

    /// Authenticate with the API and persist the issued tokens.
    ///
    /// Returns once the token pair is saved. The profile is fetched in a
    /// spawned task; observe [`current_user`](Self::current_user) or await
    /// [`settled`](Self::settled) to see the result. On failure the current
    /// user and the stored tokens are left untouched.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] when the API rejects the pair,
    /// [`AuthError::Network`] for anything else.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AuthError> {
        info!("Logging in");
        let guard = self.begin_login();

        let tokens = match self.inner.api.login(credentials).await {
            Ok(tokens) => tokens,
            Err(err) => {
                let err = AuthError::from_login(err);
                warn!(error = %err, "Login failed");
                return Err(err);
            }
        };

        let generation = match self.write_tokens(&tokens) {
            Ok(generation) => generation,
            Err(err) => {
                warn!(error = %err, "Failed to persist tokens");
                return Err(AuthError::Network(err));
            }
        };
        drop(guard);

        debug!(generation, "Tokens saved; fetching profile");
        let task = self.clone();
        let access_token = tokens.access_token.clone();
        tokio::spawn(async move {
            task.refresh_profile(generation, access_token).await;
        });

        Ok(tokens)
    }

    /// Create an account, then log in with the same email and password.
    ///
    /// Returns the created user record. The password held in `registration`
    /// is reused for the login instead of being requested again.
    ///
    /// # Errors
    ///
    /// [`AuthError::Conflict`] or [`AuthError::Network`] if the account could
    /// not be created; no login is attempted in that case. If the account was
    /// created but the follow-up login fails, that login error is returned.
    #[instrument(skip(self, registration), fields(email = %registration.email()))]
    pub async fn register(&self, registration: &RegistrationRequest) -> Result<User, AuthError> {
        info!("Creating account");

        let user = self
            .inner
            .api
            .create_user(registration)
            .await
            .map_err(|err| {
                let err = AuthError::from_registration(err);
                warn!(error = %err, "Account creation failed");
                err
            })?;

        info!(user_id = %user.id, "Account created; logging in");
        self.login(&registration.credentials()).await?;

        Ok(user)
    }

    /// End the session locally.
    ///
    /// Clears the stored tokens and the current user before returning and
    /// never fails. When called inside a tokio runtime, a best-effort
    /// server-side logout is sent in the background; its outcome is only
    /// logged. The returned handle lets short-lived callers wait for that
    /// request before shutting the runtime down.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Option<JoinHandle<()>> {
        let previous = {
            let mut ledger = self.lock_ledger();
            let previous = self.inner.store.load().unwrap_or_else(|err| {
                warn!(error = %err, "Failed to read tokens during logout");
                None
            });
            self.clear_locked(&mut ledger);
            previous
        };
        info!("Logged out");

        let tokens = previous?;
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime; skipping server-side logout");
            return None;
        };
        let inner = Arc::clone(&self.inner);
        Some(runtime.spawn(async move {
            match inner.api.logout(&tokens.access_token).await {
                Ok(()) => debug!("Server-side logout acknowledged"),
                Err(err) => debug!(error = %err, "Server-side logout failed"),
            }
        }))
    }

    /// Validate stored tokens with a profile fetch.
    ///
    /// Run once at process start. Returns the restored user, or `None` when
    /// there were no tokens or they could not be validated (in which case
    /// they are cleared).
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Option<User> {
        let (generation, tokens) = {
            let mut ledger = self.lock_ledger();
            let tokens = match self.inner.store.load() {
                Ok(Some(tokens)) => tokens,
                Ok(None) => {
                    debug!("No stored session");
                    return None;
                }
                Err(err) => {
                    warn!(error = %err, "Failed to read stored tokens");
                    return None;
                }
            };
            ledger.pending = Some(Fetch::Restore);
            self.publish_state(&ledger);
            (ledger.generation, tokens)
        };

        info!("Restoring stored session");
        self.refresh_profile(generation, tokens.access_token).await
    }

    /// Live view of the logged-in user, starting with the latest value.
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser::new(self.inner.user.subscribe())
    }

    /// Live view of whether a user is logged in.
    pub fn is_authenticated(&self) -> AuthStatus {
        AuthStatus::new(self.inner.user.subscribe())
    }

    /// The latest known user.
    pub fn user(&self) -> Option<User> {
        self.inner.user.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    /// Wait until no login or restore is pending and return the user.
    pub async fn settled(&self) -> Result<Option<User>, SessionClosed> {
        let mut state = self.inner.state.subscribe();
        state
            .wait_for(|state| state.is_settled())
            .await
            .map_err(|_| SessionClosed)?;
        Ok(self.user())
    }

    async fn refresh_profile(&self, generation: u64, token: AccessToken) -> Option<User> {
        let result = self.inner.api.profile(&token).await;

        let mut ledger = self.lock_ledger();
        if ledger.generation != generation {
            debug!(
                generation,
                current = ledger.generation,
                "Discarding profile result for superseded tokens"
            );
            return None;
        }

        match result {
            Ok(user) => {
                info!(user_id = %user.id, role = %user.role, "Session authenticated");
                ledger.pending = None;
                self.inner.user.send_replace(Some(user.clone()));
                self.publish_state(&ledger);
                Some(user)
            }
            Err(err) => {
                warn!(error = %err, "{}; clearing session", AuthError::SessionExpired);
                self.clear_locked(&mut ledger);
                None
            }
        }
    }

    fn begin_login(&self) -> LoginGuard<'_, A, S> {
        let mut ledger = self.lock_ledger();
        ledger.logins += 1;
        self.publish_state(&ledger);
        LoginGuard { manager: self }
    }

    fn write_tokens(&self, tokens: &TokenPair) -> crate::Result<u64> {
        let mut ledger = self.lock_ledger();
        self.inner.store.save(tokens)?;
        ledger.generation += 1;
        ledger.pending = Some(Fetch::Login);
        self.publish_state(&ledger);
        Ok(ledger.generation)
    }

    fn clear_locked(&self, ledger: &mut Ledger) {
        if let Err(err) = self.inner.store.clear() {
            warn!(error = %err, "Failed to clear stored tokens");
        }
        ledger.generation += 1;
        ledger.pending = None;
        self.inner.user.send_replace(None);
        self.publish_state(ledger);
    }

    /// Recompute the published state. Callers hold the ledger lock.
    fn publish_state(&self, ledger: &Ledger) {
        let next = if ledger.logins > 0 || ledger.pending == Some(Fetch::Login) {
            SessionState::Authenticating
        } else if ledger.pending == Some(Fetch::Restore) {
            SessionState::Restoring
        } else if self.inner.user.borrow().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };

        self.inner.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }

    fn lock_ledger(&self) -> MutexGuard<'_, Ledger> {
        self.inner
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A, S> std::fmt::Debug for SessionManager<A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &*self.inner.state.borrow())
            .field("user", &*self.inner.user.borrow())
            .finish_non_exhaustive()
    }
}
