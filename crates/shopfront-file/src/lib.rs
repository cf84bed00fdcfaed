//! shopfront-file - File-backed token storage.

mod store;

pub use store::{FileTokenStore, TOKEN_FILE};
