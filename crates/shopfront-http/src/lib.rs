//! shopfront-http - HTTP-backed account API and upload client.

mod api;
mod client;
pub mod endpoints;
mod upload;

pub use api::HttpAuthApi;
pub use client::{ApiClient, DEFAULT_TIMEOUT};
pub use endpoints::Endpoints;
pub use upload::{HttpFileUploader, content_type_for};
