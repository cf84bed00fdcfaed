//! Core traits at the transport and storage seams.

mod auth_api;
mod token_store;
mod uploader;

pub use auth_api::AuthApi;
pub use token_store::TokenStore;
pub use uploader::{FileUploader, UploadedFile};
