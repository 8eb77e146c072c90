//! Bearer token session.
//!
//! The token is the only state the client keeps. It lives in a
//! [`TokenStore`] that outlives the process (a file) or the client (shared
//! memory), and [`Session::current_token`] re-reads it before every
//! authenticated call so a token written by another process or another
//! `ApiClient` is picked up on the next request.
//!
//! No expiry tracking or refresh happens here: an expired token produces a
//! backend `401`, surfaced like any other HTTP error.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::debug;

/// Errors raised by a [`TokenStore`].
#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// Reading or writing the token file failed.
    #[error("token file {path}: {source}")]
    Io {
        /// File that could not be accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Persistent storage for a single bearer token.
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Read the stored token, `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<Option<SecretString>, TokenStoreError>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, token: &SecretString) -> Result<(), TokenStoreError>;

    /// Remove the stored token. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

// =============================================================================
// Stores
// =============================================================================

/// Token store held in memory; clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<RwLock<Option<SecretString>>>,
}

impl fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTokenStore").finish_non_exhaustive()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, TokenStoreError> {
        Ok(self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &SecretString) -> Result<(), TokenStoreError> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Token store backed by a file, shared by every process using the same path.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token at `path`. Nothing is touched until the first save.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> TokenStoreError {
        TokenStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SecretString>, TokenStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| SecretString::from(token.to_owned())))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, token.expose_secret()).map_err(|e| self.io_error(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_error(e))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// The explicit authentication context handed to `ApiClient`.
///
/// Keeps an in-memory copy of the token next to the persistent store.
/// Writes go to both; reads always go to the store first.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Box<dyn TokenStore>,
    cached: RwLock<Option<SecretString>>,
}

impl Session {
    /// Create a session over `store`.
    #[must_use]
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                store: Box::new(store),
                cached: RwLock::new(None),
            }),
        }
    }

    /// Session whose token only lives as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::default())
    }

    /// Store a new token in memory and in the persistent store.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistent store cannot be written; the
    /// in-memory copy is still updated.
    pub fn set_token(&self, token: impl Into<String>) -> Result<(), TokenStoreError> {
        let token = SecretString::from(token.into());
        *self.cached_slot() = Some(token.clone());
        self.inner.store.save(&token)?;
        debug!("Session token stored");
        Ok(())
    }

    /// Forget the token in memory and in the persistent store.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistent store cannot be cleared; the
    /// in-memory copy is still dropped.
    pub fn remove_token(&self) -> Result<(), TokenStoreError> {
        *self.cached_slot() = None;
        self.inner.store.clear()?;
        debug!("Session token removed");
        Ok(())
    }

    /// Re-read the token from the persistent store.
    ///
    /// The in-memory copy is replaced with whatever the store holds, so a
    /// token removed elsewhere stops being sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistent store cannot be read.
    pub fn current_token(&self) -> Result<Option<SecretString>, TokenStoreError> {
        let token = self.inner.store.load()?;
        *self.cached_slot() = token.clone();
        Ok(token)
    }

    /// The token as of the last read or write, without touching the store.
    #[must_use]
    pub fn cached_token(&self) -> Option<SecretString> {
        self.inner
            .cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a token is currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the persistent store cannot be read.
    pub fn is_authenticated(&self) -> Result<bool, TokenStoreError> {
        Ok(self.current_token()?.is_some())
    }

    fn cached_slot(&self) -> std::sync::RwLockWriteGuard<'_, Option<SecretString>> {
        self.inner
            .cached
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.inner.store)
            .field("has_cached_token", &self.cached_token().is_some())
            .finish()
    }
}
