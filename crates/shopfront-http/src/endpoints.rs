//! Endpoint paths and wire types.

use serde::Deserialize;

/// POST: exchange credentials for a token pair.
pub const LOGIN: &str = "auth/login";

/// GET: profile of the bearer.
pub const PROFILE: &str = "auth/profile";

/// POST: create an account.
pub const USERS: &str = "users";

/// POST: invalidate the bearer's session.
pub const LOGOUT: &str = "auth/logout";

/// POST (multipart): store a file.
pub const UPLOAD: &str = "files/upload";

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// Endpoint paths relative to the API base URL.
///
/// Paths are deployment configuration; the defaults match the shop API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub login: String,
    pub profile: String,
    pub users: String,
    pub logout: String,
    pub upload: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: LOGIN.to_string(),
            profile: PROFILE.to_string(),
            users: USERS.to_string(),
            logout: LOGOUT.to_string(),
            upload: UPLOAD.to_string(),
        }
    }
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<ErrorMessage>,
}

/// Validation failures arrive as a list of messages.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    pub(crate) fn joined(self) -> String {
        match self {
            ErrorMessage::One(message) => message,
            ErrorMessage::Many(messages) => messages.join("; "),
        }
    }
}
