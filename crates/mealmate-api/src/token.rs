//! Bearer token storage.
//!
//! Exactly one token is held at a time. A persistent store mirrors it to a
//! single file (`~/.config/mealmate/auth_token`) so it survives restarts
//! until logout or rejection by the remote service.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

/// File name of the persisted token inside the config directory.
pub const TOKEN_FILE_NAME: &str = "auth_token";

/// Return the mealmate config directory.
///
/// Uses XDG layout: `$XDG_CONFIG_HOME/mealmate` or `~/.config/mealmate`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("mealmate");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("mealmate")
}

/// Default location of the persisted token.
pub fn default_token_path() -> PathBuf {
    config_dir().join(TOKEN_FILE_NAME)
}

/// Shared handle to the held bearer token.
///
/// Cloning is cheap; all clones see the same token. The Session Manager
/// writes it, the gateway reads it and discards it when it is rejected.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    token: RwLock<Option<String>>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// A store that forgets the token when the process exits.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A store backed by `path`, loading any token already saved there.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let token = read_token_file(&path);
        debug!(path = %path.display(), loaded = token.is_some(), "opened token store");
        Self {
            inner: Arc::new(Inner {
                token: RwLock::new(token),
                path: Some(path),
            }),
        }
    }

    /// The currently held token, if any.
    pub fn get(&self) -> Option<String> {
        self.read_guard().clone()
    }

    pub fn is_present(&self) -> bool {
        self.read_guard().is_some()
    }

    /// Replace the held token.
    ///
    /// Persistence failures are logged; the in-memory token is still set so
    /// the current process keeps working.
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let mut guard = self.write_guard();
        if let Some(path) = &self.inner.path {
            if let Err(e) = write_token_file(path, &token) {
                warn!(path = %path.display(), error = %e, "failed to persist auth token");
            }
        }
        *guard = Some(token);
    }

    /// Discard the held token. Returns whether a token was present.
    pub fn clear(&self) -> bool {
        let mut guard = self.write_guard();
        let had_token = guard.take().is_some();
        self.remove_file();
        had_token
    }

    /// Discard `token` after the remote service rejected it.
    ///
    /// Returns `false` only when a different token has been set since
    /// `token` was read; that newer token is kept.
    pub fn discard_rejected(&self, token: &str) -> bool {
        let mut guard = self.write_guard();
        match guard.as_deref() {
            Some(held) if held != token => false,
            Some(_) => {
                *guard = None;
                self.remove_file();
                true
            }
            None => true,
        }
    }

    fn remove_file(&self) {
        let Some(path) = &self.inner.path else {
            return;
        };
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to remove persisted auth token");
            }
        }
    }

    /// Path of the backing file, if this store is persistent.
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, Option<String>> {
        self.inner
            .token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
        self.inner
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn read_token_file(path: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(path).ok()?;
    let token = contents.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

/// Write the token, creating parent dirs as needed. Sets file permissions to
/// 0600 on Unix.
fn write_token_file(path: &Path, token: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, token)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
