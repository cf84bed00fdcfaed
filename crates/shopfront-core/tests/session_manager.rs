//! Session manager behavior tests.
//!
//! These tests drive the manager through a scripted in-process API so the
//! token lifecycle and the current-user broadcast can be checked without a
//! network.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::Notify;

use shopfront_core::error::ProtocolError;
use shopfront_core::{
    AccessToken, AuthApi, AuthError, Credentials, Error, MemoryTokenStore, RegistrationRequest,
    Result, Role, SessionManager, SessionState, TokenPair, TokenStore, User, UserId,
};

/// Scripted API: every endpoint answers with the configured status or body.
struct ScriptedApi {
    login: Mutex<std::result::Result<TokenPair, u16>>,
    profile: Mutex<std::result::Result<User, u16>>,
    create: Mutex<std::result::Result<User, u16>>,
    logout_status: Option<u16>,
    profile_gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    fn new() -> Self {
        Self {
            login: Mutex::new(Ok(TokenPair::new("AT1", "RT1"))),
            profile: Mutex::new(Ok(profile())),
            create: Mutex::new(Ok(profile())),
            logout_status: None,
            profile_gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn login_fails(self, status: u16) -> Self {
        *self.login.lock().unwrap() = Err(status);
        self
    }

    fn profile_fails(self, status: u16) -> Self {
        *self.profile.lock().unwrap() = Err(status);
        self
    }

    fn create_fails(self, status: u16) -> Self {
        *self.create.lock().unwrap() = Err(status);
        self
    }

    fn logout_fails(mut self, status: u16) -> Self {
        self.logout_status = Some(status);
        self
    }

    fn gate_profile(mut self, gate: Arc<Notify>) -> Self {
        self.profile_gate = Some(gate);
        self
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

fn status_error(status: u16) -> Error {
    Error::Protocol(ProtocolError::new(status, None, Some(format!("status {status}"))))
}

#[async_trait]
impl AuthApi for ScriptedApi {
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair> {
        self.record(format!("login:{}", credentials.email()));
        self.login.lock().unwrap().clone().map_err(status_error)
    }

    async fn profile(&self, token: &AccessToken) -> Result<User> {
        self.record(format!("profile:{}", token.as_str()));
        if let Some(gate) = &self.profile_gate {
            gate.notified().await;
        }
        self.profile.lock().unwrap().clone().map_err(status_error)
    }

    async fn create_user(&self, request: &RegistrationRequest) -> Result<User> {
        self.record(format!("create:{}", request.email()));
        self.create.lock().unwrap().clone().map_err(status_error)
    }

    async fn logout(&self, token: &AccessToken) -> Result<()> {
        self.record(format!("logout:{}", token.as_str()));
        match self.logout_status {
            Some(status) => Err(status_error(status)),
            None => Ok(()),
        }
    }
}

fn profile() -> User {
    User {
        id: UserId::new("1"),
        email: "a@b.com".to_string(),
        name: "A".to_string(),
        role: Role::Customer,
        avatar_url: None,
        creation_at: None,
        updated_at: None,
    }
}

fn credentials() -> Credentials {
    Credentials::new("a@b.com", "secret1")
}

fn manager(
    api: ScriptedApi,
    store: MemoryTokenStore,
) -> (
    SessionManager<Arc<ScriptedApi>, Arc<MemoryTokenStore>>,
    Arc<ScriptedApi>,
    Arc<MemoryTokenStore>,
) {
    let api = Arc::new(api);
    let store = Arc::new(store);
    let session = SessionManager::new(Arc::clone(&api), Arc::clone(&store));
    (session, api, store)
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_saves_tokens_and_publishes_profile() {
    let (session, api, store) = manager(ScriptedApi::new(), MemoryTokenStore::new());
    let mut user = session.current_user();
    let mut status = session.is_authenticated();
    assert_eq!(user.get(), None);
    assert!(!status.get());

    let tokens = session.login(&credentials()).await.unwrap();
    assert_eq!(tokens, TokenPair::new("AT1", "RT1"));
    assert_eq!(store.load().unwrap(), Some(TokenPair::new("AT1", "RT1")));

    let fetched = user.wait_for(|u| u.is_some()).await.unwrap();
    assert_eq!(fetched, Some(profile()));
    status.wait_for(true).await.unwrap();
    assert_eq!(session.state(), SessionState::Authenticated);

    let calls = api.calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["login:a@b.com", "profile:AT1"]);
}

#[tokio::test]
async fn login_returns_before_profile_is_fetched() {
    let gate = Arc::new(Notify::new());
    let (session, _api, _store) = manager(
        ScriptedApi::new().gate_profile(Arc::clone(&gate)),
        MemoryTokenStore::new(),
    );

    session.login(&credentials()).await.unwrap();
    assert_eq!(session.user(), None);
    assert_eq!(session.state(), SessionState::Authenticating);

    gate.notify_one();
    let settled = session.settled().await.unwrap();
    assert_eq!(settled, Some(profile()));
}

#[tokio::test]
async fn login_rejected_leaves_session_untouched() {
    let (session, api, store) =
        manager(ScriptedApi::new().login_fails(401), MemoryTokenStore::new());

    let err = session.login(&credentials()).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(store.load().unwrap(), None);
    assert_eq!(session.user(), None);
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(api.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn login_rejected_keeps_existing_user() {
    let (session, api, store) = manager(
        ScriptedApi::new(),
        MemoryTokenStore::with_tokens(TokenPair::new("OLD", "OLDR")),
    );
    session.restore().await.unwrap();

    *api.login.lock().unwrap() = Err(401);
    let err = session.login(&credentials()).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(session.user(), Some(profile()));
    assert_eq!(session.state(), SessionState::Authenticated);
    assert_eq!(store.load().unwrap(), Some(TokenPair::new("OLD", "OLDR")));
}

#[tokio::test]
async fn login_server_error_is_network() {
    let (session, _api, store) =
        manager(ScriptedApi::new().login_fails(503), MemoryTokenStore::new());

    let err = session.login(&credentials()).await.unwrap_err();
    assert!(matches!(err, AuthError::Network(_)));
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn failed_profile_after_login_logs_out() {
    let (session, _api, store) =
        manager(ScriptedApi::new().profile_fails(401), MemoryTokenStore::new());

    session.login(&credentials()).await.unwrap();
    let settled = session.settled().await.unwrap();

    assert_eq!(settled, None);
    assert_eq!(store.load().unwrap(), None);
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn failed_second_login_waits_for_first_profile() {
    let gate = Arc::new(Notify::new());
    let (session, api, store) = manager(
        ScriptedApi::new().gate_profile(Arc::clone(&gate)),
        MemoryTokenStore::new(),
    );

    session.login(&credentials()).await.unwrap();
    *api.login.lock().unwrap() = Err(401);
    let err = session.login(&credentials()).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    assert_eq!(store.load().unwrap(), Some(TokenPair::new("AT1", "RT1")));
    assert_eq!(session.state(), SessionState::Authenticating);
    let early = tokio::time::timeout(Duration::from_millis(20), session.settled()).await;
    assert!(early.is_err());

    gate.notify_one();
    assert_eq!(session.settled().await.unwrap(), Some(profile()));
    assert_eq!(session.state(), SessionState::Authenticated);
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_ends_in_same_state_as_login() {
    let (session, api, store) = manager(ScriptedApi::new(), MemoryTokenStore::new());
    let request = RegistrationRequest::new("a@b.com", "secret1", "A", "https://cdn/a.png");

    let created = session.register(&request).await.unwrap();
    assert_eq!(created, profile());
    let user = session.settled().await.unwrap();

    let (login_session, _, login_store) = manager(ScriptedApi::new(), MemoryTokenStore::new());
    login_session.login(&credentials()).await.unwrap();
    let login_user = login_session.settled().await.unwrap();

    assert_eq!(user, login_user);
    assert_eq!(store.load().unwrap(), login_store.load().unwrap());

    let calls = api.calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["create:a@b.com", "login:a@b.com", "profile:AT1"]);
}

#[tokio::test]
async fn register_conflict_skips_login() {
    let (session, api, store) =
        manager(ScriptedApi::new().create_fails(409), MemoryTokenStore::new());
    let request = RegistrationRequest::new("a@b.com", "secret1", "A", "https://cdn/a.png");

    let err = session.register(&request).await.unwrap_err();
    match err {
        AuthError::Conflict { message } => assert_eq!(message.as_deref(), Some("status 409")),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(store.load().unwrap(), None);
    assert_eq!(api.calls.lock().unwrap().clone(), vec!["create:a@b.com"]);
}

#[tokio::test]
async fn register_network_failure_skips_login() {
    let (session, api, _store) =
        manager(ScriptedApi::new().create_fails(500), MemoryTokenStore::new());
    let request = RegistrationRequest::new("a@b.com", "secret1", "A", "https://cdn/a.png");

    let err = session.register(&request).await.unwrap_err();
    assert!(matches!(err, AuthError::Network(_)));
    assert_eq!(api.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn register_reports_failed_follow_up_login() {
    let (session, _api, store) =
        manager(ScriptedApi::new().login_fails(401), MemoryTokenStore::new());
    let request = RegistrationRequest::new("a@b.com", "secret1", "A", "https://cdn/a.png");

    let err = session.register(&request).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(store.load().unwrap(), None);
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn logout_twice_is_idempotent() {
    let (session, _api, store) = manager(ScriptedApi::new(), MemoryTokenStore::new());
    session.login(&credentials()).await.unwrap();
    session.settled().await.unwrap();

    session.logout();
    assert_eq!(session.user(), None);
    assert_eq!(store.load().unwrap(), None);

    assert!(session.logout().is_none());
    assert_eq!(session.user(), None);
    assert_eq!(store.load().unwrap(), None);
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn logout_ignores_server_failure() {
    let (session, api, store) =
        manager(ScriptedApi::new().logout_fails(500), MemoryTokenStore::new());
    session.login(&credentials()).await.unwrap();
    session.settled().await.unwrap();

    let notify = session.logout().unwrap();
    assert!(!session.is_authenticated().get());
    assert_eq!(store.load().unwrap(), None);

    notify.await.unwrap();
    assert!(api.calls.lock().unwrap().contains(&"logout:AT1".to_string()));
}

#[test]
fn logout_without_runtime_still_clears() {
    let (session, api, store) = manager(
        ScriptedApi::new(),
        MemoryTokenStore::with_tokens(TokenPair::new("AT1", "RT1")),
    );

    assert!(session.logout().is_none());
    assert_eq!(store.load().unwrap(), None);
    assert!(api.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn profile_for_superseded_tokens_is_discarded() {
    let gate = Arc::new(Notify::new());
    let (session, _api, store) = manager(
        ScriptedApi::new().gate_profile(Arc::clone(&gate)),
        MemoryTokenStore::new(),
    );

    session.login(&credentials()).await.unwrap();
    session.logout();
    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(session.user(), None);
    assert_eq!(store.load().unwrap(), None);
}

// ============================================================================
// Restore
// ============================================================================

#[tokio::test]
async fn restore_with_valid_tokens_authenticates() {
    let (session, api, _store) = manager(
        ScriptedApi::new(),
        MemoryTokenStore::with_tokens(TokenPair::new("AT9", "RT9")),
    );

    let user = session.restore().await;
    assert_eq!(user, Some(profile()));
    assert_eq!(session.state(), SessionState::Authenticated);
    assert_eq!(api.calls.lock().unwrap().clone(), vec!["profile:AT9"]);
}

#[tokio::test]
async fn restore_with_rejected_tokens_clears_session() {
    let (session, _api, store) = manager(
        ScriptedApi::new().profile_fails(401),
        MemoryTokenStore::with_tokens(TokenPair::new("AT1", "RT1")),
    );
    let mut status = session.is_authenticated().into_stream();
    assert_eq!(status.next().await, Some(false));

    assert_eq!(session.restore().await, None);
    assert_eq!(session.user(), None);
    assert_eq!(store.load().unwrap(), None);
    assert_eq!(status.next().await, Some(false));
}

#[tokio::test]
async fn restore_without_tokens_makes_no_request() {
    let (session, api, _store) = manager(ScriptedApi::new(), MemoryTokenStore::new());

    assert_eq!(session.restore().await, None);
    assert!(api.calls.lock().unwrap().is_empty());
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn start_restores_in_background() {
    let api = Arc::new(ScriptedApi::new());
    let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("AT1", "RT1")));
    let session = SessionManager::start(Arc::clone(&api), Arc::clone(&store));

    let mut status = session.is_authenticated();
    status.wait_for(true).await.unwrap();
    assert_eq!(session.user(), Some(profile()));
}

#[tokio::test]
async fn login_during_restore_settles_on_login_profile() {
    let gate = Arc::new(Notify::new());
    let (session, api, store) = manager(
        ScriptedApi::new().gate_profile(Arc::clone(&gate)),
        MemoryTokenStore::with_tokens(TokenPair::new("OLD", "OLDR")),
    );

    let restoring = tokio::spawn({
        let session = session.clone();
        async move { session.restore().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(session.state(), SessionState::Restoring);

    session.login(&credentials()).await.unwrap();
    assert_eq!(session.state(), SessionState::Authenticating);
    tokio::time::sleep(Duration::from_millis(10)).await;

    gate.notify_waiters();
    assert_eq!(session.settled().await.unwrap(), Some(profile()));
    assert_eq!(restoring.await.unwrap(), None);
    assert_eq!(session.state(), SessionState::Authenticated);
    assert_eq!(store.load().unwrap(), Some(TokenPair::new("AT1", "RT1")));

    let calls = api.calls.lock().unwrap().clone();
    assert_eq!(calls, vec!["profile:OLD", "login:a@b.com", "profile:AT1"]);
}

// ============================================================================
// Subscriptions
// ============================================================================

#[tokio::test]
async fn late_subscriber_receives_latest_user() {
    let (session, _api, _store) = manager(ScriptedApi::new(), MemoryTokenStore::new());
    session.login(&credentials()).await.unwrap();
    session.settled().await.unwrap();

    let late = session.current_user();
    assert_eq!(late.get(), Some(profile()));

    let mut stream = session.current_user().into_stream();
    assert_eq!(stream.next().await, Some(Some(profile())));
}

#[tokio::test]
async fn status_follows_user_updates() {
    let (session, _api, _store) = manager(ScriptedApi::new(), MemoryTokenStore::new());
    let mut user = session.current_user();
    let mut status = session.is_authenticated();

    session.login(&credentials()).await.unwrap();
    assert_eq!(user.changed().await.unwrap(), Some(profile()));
    assert!(status.changed().await.unwrap());

    session.logout();
    assert_eq!(user.changed().await.unwrap(), None);
    assert!(!status.changed().await.unwrap());
}
