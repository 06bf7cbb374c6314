//! Signed-in user and bearer token, optionally persisted to a JSON file.
//!
//! # Design
//! The store is owned by the [`Session`](crate::session::Session) rather than
//! living in a global. A store built with [`AuthStore::in_memory`] never
//! touches disk; one built with [`AuthStore::load`] rewrites its file on
//! every change so a later process picks up the same sign-in.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::User;

#[derive(Debug, thiserror::Error)]
pub enum AuthStoreError {
    #[error("auth file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("auth file {} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthStore {
    path: Option<PathBuf>,
    state: AuthState,
}

impl AuthStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: AuthState::default(),
        }
    }

    /// Open the store backed by `path`. A missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AuthStoreError> {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => AuthState::default(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| AuthStoreError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => AuthState::default(),
            Err(source) => return Err(AuthStoreError::Io { path, source }),
        };
        tracing::debug!(path = %path.display(), signed_in = state.user.is_some(), "auth store loaded");
        Ok(Self {
            path: Some(path),
            state,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.user.is_some() && self.state.token.is_some()
    }

    /// Store a fresh sign-in. The in-memory state only changes once the
    /// file has been written.
    pub fn set(&mut self, user: User, token: String) -> Result<(), AuthStoreError> {
        self.commit(AuthState {
            user: Some(user),
            token: Some(token),
        })
    }

    /// Replace the user after a profile edit, keeping the token.
    pub fn set_user(&mut self, user: User) -> Result<(), AuthStoreError> {
        self.commit(AuthState {
            user: Some(user),
            token: self.state.token.clone(),
        })
    }

    pub fn clear(&mut self) -> Result<(), AuthStoreError> {
        self.state = AuthState::default();
        let Some(path) = &self.path else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(AuthStoreError::Io {
                path: path.clone(),
                source,
            }),
        }
    }

    fn commit(&mut self, state: AuthState) -> Result<(), AuthStoreError> {
        if let Some(path) = &self.path {
            write_private(path, &state)?;
        }
        self.state = state;
        Ok(())
    }
}

/// Write the state readable by the owner only; it holds a bearer token.
fn write_private(path: &Path, state: &AuthState) -> Result<(), AuthStoreError> {
    let text = serde_json::to_string_pretty(state).map_err(|source| AuthStoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let io_err = |source| AuthStoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        // An existing file keeps its old mode on open.
        if path.exists() {
            fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
        }
    }
    let mut file = options.open(path).map_err(io_err)?;
    file.write_all(text.as_bytes()).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 7,
            nome: "Admin".to_string(),
            email: "admin@clinica.com".to_string(),
            avatar: None,
        }
    }

    #[test]
    fn missing_file_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::load(dir.path().join("auth.json")).unwrap();
        assert!(store.current_user().is_none());
        assert!(store.token().is_none());
        assert!(!store.is_signed_in());
    }

    #[test]
    fn set_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        let mut store = AuthStore::load(&path).unwrap();
        store.set(user(), "tok".to_string()).unwrap();

        let reloaded = AuthStore::load(&path).unwrap();
        assert_eq!(reloaded.current_user(), Some(&user()));
        assert_eq!(reloaded.token(), Some("tok"));
    }

    #[test]
    fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        let mut store = AuthStore::load(&path).unwrap();
        store.set(user(), "tok".to_string()).unwrap();
        store.clear().unwrap();
        assert!(!path.exists());
        assert!(store.current_user().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(AuthStore::load(&path), Err(AuthStoreError::Json { .. })));
    }

    #[test]
    fn set_user_keeps_token() {
        let mut store = AuthStore::in_memory();
        store.set(user(), "tok".to_string()).unwrap();
        let mut renamed = user();
        renamed.nome = "Ana".to_string();
        store.set_user(renamed).unwrap();
        assert_eq!(store.current_user().map(|u| u.nome.as_str()), Some("Ana"));
        assert_eq!(store.token(), Some("tok"));
        assert!(store.path().is_none());
    }

    #[test]
    fn failed_write_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AuthStore::load(dir.path().join("missing").join("auth.json")).unwrap();
        assert!(matches!(
            store.set(user(), "tok".to_string()),
            Err(AuthStoreError::Io { .. })
        ));
        assert!(!store.is_signed_in());
        assert!(store.current_user().is_none());
        assert!(matches!(store.set_user(user()), Err(AuthStoreError::Io { .. })));
        assert!(store.current_user().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn auth_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(&path, "").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        let mut store = AuthStore::load(&path).unwrap();
        store.set(user(), "tok".to_string()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
