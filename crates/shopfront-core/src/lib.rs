//! shopfront-core - Core account types, traits and the session manager.

pub mod credentials;
pub mod error;
pub mod session;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::{Credentials, RegistrationRequest};
pub use error::{AuthError, Error};
pub use session::{AuthStatus, CurrentUser, SessionClosed, SessionManager, SessionState};
pub use store::MemoryTokenStore;
pub use tokens::{AccessToken, RefreshToken, TokenPair};
pub use traits::{AuthApi, FileUploader, TokenStore, UploadedFile};
pub use types::{ApiUrl, Role, User, UserId};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
