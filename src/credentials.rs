//! Persistent store for the Spotify client id and secret.
//!
//! The values live in a small `key=value` file. Reads hand out snapshots; edits
//! take the write side of the lock for both the file write and the in-memory
//! swap, so no reader ever sees half of an update.

use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::error::{Error, Result};

pub const CLIENT_ID_KEY: &str = "CLIENT_ID";
pub const CLIENT_SECRET_KEY: &str = "CLIENT_SECRET";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }

    /// Parses `key=value` lines; blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Self {
        let mut creds = Credentials::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            match key.trim() {
                CLIENT_ID_KEY => creds.client_id = value.to_string(),
                CLIENT_SECRET_KEY => creds.client_secret = value.to_string(),
                _ => {}
            }
        }
        creds
    }

    pub fn render(&self) -> String {
        format!(
            "{CLIENT_ID_KEY}={}\n{CLIENT_SECRET_KEY}={}\n",
            self.client_id, self.client_secret
        )
    }
}

pub struct CredentialStore {
    path: PathBuf,
    current: RwLock<Credentials>,
}

impl CredentialStore {
    /// Opens the store, treating a missing file as empty credentials.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let current = read_file(&path).await?;
        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self) -> Credentials {
        self.current.read().await.clone()
    }

    /// Persists new credentials and makes them visible to later `get` calls.
    pub async fn set(&self, creds: Credentials) -> Result<()> {
        let mut current = self.current.write().await;
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::Filesystem {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        async_fs::write(&self.path, creds.render())
            .await
            .map_err(|source| Error::Filesystem {
                path: self.path.clone(),
                source,
            })?;
        *current = creds;
        Ok(())
    }

    /// Re-reads the file and returns the fresh snapshot.
    ///
    /// Called once per top-level command or request so external edits are
    /// picked up without re-reading in the middle of an operation.
    pub async fn refresh(&self) -> Result<Credentials> {
        let mut current = self.current.write().await;
        *current = read_file(&self.path).await?;
        Ok(current.clone())
    }
}

async fn read_file(path: &Path) -> Result<Credentials> {
    match async_fs::read_to_string(path).await {
        Ok(content) => Ok(Credentials::parse(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Credentials::default()),
        Err(source) => Err(Error::Filesystem {
            path: path.to_path_buf(),
            source,
        }),
    }
}
