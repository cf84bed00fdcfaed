//! Session wiring for CLI use.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use directories::ProjectDirs;

use shopfront_core::{ApiUrl, SessionManager};
use shopfront_file::FileTokenStore;
use shopfront_http::{ApiClient, Endpoints, HttpAuthApi, HttpFileUploader};

use crate::cli::GlobalArgs;

/// Session manager as wired for the CLI.
pub type CliSession = SessionManager<HttpAuthApi, FileTokenStore>;

/// Everything a command needs to talk to the API.
pub struct Context {
    pub session: CliSession,
    pub uploader: HttpFileUploader,
}

impl Context {
    /// Build the API client, token store and session manager from the
    /// global flags. No request is made and no stored session is examined.
    pub fn open(args: &GlobalArgs) -> Result<Self> {
        let api_url = ApiUrl::new(&args.api_url).context("Invalid API URL")?;
        let client = ApiClient::with_timeout(api_url, Duration::from_secs(args.timeout))
            .context("Failed to build HTTP client")?;

        let endpoints = Endpoints::default();
        let uploader = HttpFileUploader::with_client(client.clone(), &endpoints);
        let api = HttpAuthApi::with_client(client, endpoints);

        let store = FileTokenStore::in_dir(data_dir(args)?);
        tracing::debug!(path = %store.path().display(), "Using token store");

        Ok(Self {
            session: SessionManager::new(api, store),
            uploader,
        })
    }
}

fn data_dir(args: &GlobalArgs) -> Result<PathBuf> {
    if let Some(dir) = &args.data_dir {
        return Ok(dir.clone());
    }

    let dirs =
        ProjectDirs::from("", "", "shopfront").context("Could not determine data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
