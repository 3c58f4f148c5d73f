//! Persisted session storage: OS keychain first, file fallback.

use std::fs;
use std::path::{Path, PathBuf};

use plate_core::Session;

use crate::error::AuthError;

const DEFAULT_KEYRING_SERVICE: &str = "plate-cli";
const KEYRING_USER: &str = "session";
const SESSION_FILE_NAME: &str = "session.json";

/// Returns the keyring service name.
///
/// Defaults to `"plate-cli"`. Override via `PLATE_KEYRING_SERVICE` for
/// testing to avoid touching real credentials.
fn keyring_service() -> String {
    std::env::var("PLATE_KEYRING_SERVICE").unwrap_or_else(|_| DEFAULT_KEYRING_SERVICE.to_string())
}

/// Where a session is persisted between runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    keyring_service: Option<String>,
    path: PathBuf,
}

impl SessionStore {
    /// Keyring entry plus `~/.plate/session.json` fallback.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionStore` if the home directory cannot be found.
    pub fn default_location() -> Result<Self, AuthError> {
        let path = dirs::home_dir()
            .map(|h| h.join(".plate").join(SESSION_FILE_NAME))
            .ok_or_else(|| {
                AuthError::SessionStore("home directory not found, cannot store session".into())
            })?;
        Ok(Self {
            keyring_service: Some(keyring_service()),
            path,
        })
    }

    /// File-only store at `path` (no keyring).
    #[must_use]
    pub fn file_only(path: impl Into<PathBuf>) -> Self {
        Self {
            keyring_service: None,
            path: path.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a session. Falls back to the file if the keyring is unavailable.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionStore` if both keyring and file storage fail.
    pub fn store(&self, session: &Session) -> Result<(), AuthError> {
        let json = serde_json::to_string(session)
            .map_err(|e| AuthError::SessionStore(format!("serialize session: {e}")))?;

        if let Some(entry) = self.keyring_entry() {
            match entry.set_password(&json) {
                Ok(()) => return Ok(()),
                Err(error) => {
                    tracing::warn!(%error, "keyring store failed; falling back to file");
                }
            }
        }
        self.store_file(&json)
    }

    /// Load the persisted session. Priority: keyring → file.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        let raw = self
            .keyring_entry()
            .and_then(|entry| entry.get_password().ok())
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.load_file())?;

        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(error) => {
                tracing::warn!(%error, "persisted session is unreadable; ignoring it");
                None
            }
        }
    }

    /// Delete the persisted session from keyring and file.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionStore` if the session file cannot be removed.
    pub fn delete(&self) -> Result<(), AuthError> {
        if let Some(entry) = self.keyring_entry() {
            let _ = entry.delete_credential();
        }

        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                AuthError::SessionStore(format!("failed to delete {}: {e}", self.path.display()))
            })?;
        }
        Ok(())
    }

    /// Which tier the persisted session lives in (for status display).
    #[must_use]
    pub fn detect_source(&self) -> Option<&'static str> {
        if self
            .keyring_entry()
            .is_some_and(|entry| entry.get_password().is_ok_and(|s| !s.is_empty()))
        {
            return Some("keyring");
        }
        if self.load_file().is_some() {
            return Some("file");
        }
        None
    }

    fn keyring_entry(&self) -> Option<keyring::Entry> {
        let service = self.keyring_service.as_deref()?;
        match keyring::Entry::new(service, KEYRING_USER) {
            Ok(entry) => Some(entry),
            Err(error) => {
                tracing::debug!(%error, "keyring unavailable");
                None
            }
        }
    }

    fn store_file(&self, json: &str) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::SessionStore(format!("mkdir {}: {e}", parent.display()))
            })?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                    tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
                }
            }
        }
        fs::write(&self.path, json).map_err(|e| {
            AuthError::SessionStore(format!("write {}: {e}", self.path.display()))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                AuthError::SessionStore(format!("chmod {}: {e}", self.path.display()))
            })?;
        }

        Ok(())
    }

    fn load_file(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .filter(|s| !s.trim().is_empty())
    }
}
