//! Session lifecycle: who is logged in, and how callers observe it.

mod manager;
mod state;
mod subscription;

pub use manager::SessionManager;
pub use state::SessionState;
pub use subscription::{AuthStatus, CurrentUser, SessionClosed};
