//! Filesystem storage for the session token pair.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use shopfront_core::error::{Error, StorageError};
use shopfront_core::traits::TokenStore;
use shopfront_core::{Result, TokenPair};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Default file name inside the data directory.
pub const TOKEN_FILE: &str = "tokens.json";

fn map_io(path: &Path, err: io::Error) -> Error {
    Error::Storage(StorageError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// On-disk layout: exactly the two well-known keys.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl StoredTokens {
    fn into_pair(self) -> Option<TokenPair> {
        match (self.access_token, self.refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Some(TokenPair::new(access, refresh))
            }
            _ => None,
        }
    }
}

/// A [`TokenStore`] persisted as a JSON document on disk.
///
/// Writes land in a temporary sibling file that is renamed over the target,
/// so readers only ever see a complete pair. Writers in different processes
/// are serialized with an exclusive lock on `<file>.lock`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a store using [`TOKEN_FILE`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(TOKEN_FILE))
    }

    /// Get the token file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    /// Take the writer lock, creating the parent directory if needed.
    fn lock(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| map_io(parent, e))?;
        }

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| map_io(&lock_path, e))?;

        lock_file
            .lock_exclusive()
            .map_err(|e| map_io(&lock_path, e))?;

        Ok(lock_file)
    }

    fn write_atomic(&self, contents: &[u8]) -> Result<()> {
        let temp = self.temp_path();

        let result = (|| -> io::Result<()> {
            let mut file = OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)?;

            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))?;

            file.write_all(contents)?;
            file.sync_all()?;
            fs::rename(&temp, &self.path)
        })();

        if let Err(err) = result {
            let _ = fs::remove_file(&temp);
            return Err(map_io(&self.path, err));
        }

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    #[instrument(skip(self, tokens), fields(path = %self.path.display()))]
    fn save(&self, tokens: &TokenPair) -> Result<()> {
        let stored = StoredTokens {
            access_token: Some(tokens.access_token.as_str().to_string()),
            refresh_token: Some(tokens.refresh_token.as_str().to_string()),
        };
        let json = serde_json::to_vec_pretty(&stored).map_err(|e| {
            Error::Storage(StorageError::Malformed {
                message: e.to_string(),
            })
        })?;

        let lock = self.lock()?;
        self.write_atomic(&json)?;
        FileExt::unlock(&lock).map_err(|e| map_io(&self.lock_path(), e))?;

        debug!("Saved token pair");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<TokenPair>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(map_io(&self.path, err)),
        };

        match serde_json::from_str::<StoredTokens>(&contents) {
            Ok(stored) => {
                let pair = stored.into_pair();
                if pair.is_none() {
                    debug!("Token file holds no complete pair");
                }
                Ok(pair)
            }
            Err(err) => {
                warn!(error = %err, "Ignoring unreadable token file");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let lock = self.lock()?;
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Cleared token pair"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(map_io(&self.path, err)),
        }
        FileExt::unlock(&lock).map_err(|e| map_io(&self.lock_path(), e))?;

        Ok(())
    }
}
