//! User Identity
//!
//! The backend keys its per-user memory on an opaque identifier that is minted
//! once per profile and reused across runs. It is not tied to sign-in.
//!
//! The conductor receives an [`IdentityProvider`] rather than touching storage
//! itself; the default [`FileIdentityStore`] keeps the id in
//! `$XDG_DATA_HOME/companion/identity`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

/// Source of the stable user identifier
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Return the identifier, creating and persisting it on first use
    ///
    /// # Errors
    ///
    /// Returns an error if an existing identity cannot be read or a new one
    /// cannot be stored.
    async fn user_id(&self) -> anyhow::Result<String>;
}

/// Identity persisted in a small text file
#[derive(Clone, Debug)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    /// Store the identity at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the identity under the XDG data directory
    ///
    /// Falls back to the current directory when no data directory is known.
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(default_identity_path().unwrap_or_else(|| PathBuf::from("companion-identity")))
    }

    /// Use `path` when given, otherwise the default location
    #[must_use]
    pub fn from_override(path: Option<&Path>) -> Self {
        path.map_or_else(Self::default_location, Self::new)
    }

    /// Path of the identity file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `$XDG_DATA_HOME/companion/identity`
#[must_use]
pub fn default_identity_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("companion").join("identity"))
}

/// Mint a fresh identifier
#[must_use]
pub fn mint_user_id() -> String {
    format!("u_{}", Uuid::new_v4().simple())
}

#[async_trait]
impl IdentityProvider for FileIdentityStore {
    async fn user_id(&self) -> anyhow::Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let id = contents.trim();
                if !id.is_empty() {
                    return Ok(id.to_string());
                }
                tracing::warn!(path = %self.path.display(), "Identity file empty, minting a new id");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("reading identity from {}", self.path.display())));
            }
        }

        let id = mint_user_id();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, format!("{id}\n")).await?;
        tracing::info!(path = %self.path.display(), "Created new user identity");

        Ok(id)
    }
}

/// Fixed identity, for tests and embedding hosts that manage their own
#[derive(Clone, Debug)]
pub struct StaticIdentity(pub String);

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn user_id(&self) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}
