//! Session lifecycle states.

use std::fmt;

/// Where the session manager is in its lifecycle.
///
/// `Anonymous` is the resting state; there is no terminal state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No user is logged in.
    #[default]
    Anonymous,
    /// A login request or its profile fetch is in flight.
    Authenticating,
    /// Stored tokens are being validated with a profile fetch.
    Restoring,
    /// A profile has been fetched with the stored tokens.
    Authenticated,
}

impl SessionState {
    /// True when no login or restore is pending.
    pub fn is_settled(self) -> bool {
        matches!(self, SessionState::Anonymous | SessionState::Authenticated)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Anonymous => "anonymous",
            SessionState::Authenticating => "authenticating",
            SessionState::Restoring => "restoring",
            SessionState::Authenticated => "authenticated",
        };
        f.write_str(name)
    }
}
