//! Persisted login session.
//!
//! Holds the access token and its expiry, survives restarts via a JSON
//! file, and broadcasts sign-in/sign-out/expiry so the console can send
//! the user back to the login prompt from anywhere in the process.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use fs2::FileExt;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use super::credentials::AccessToken;

/// `expiresIn` values below this are durations, above it unix timestamps.
const ABSOLUTE_EXPIRY_THRESHOLD: u64 = 1_000_000_000;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// An access token and the unix time (seconds) after which it is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: AccessToken,
    pub expires_at: u64,
}

impl Session {
    /// Builds a session from a login grant.
    ///
    /// `expires_in` is accepted both as an absolute unix timestamp and as
    /// a number of seconds from `now`.
    pub fn from_grant(access_token: AccessToken, expires_in: u64, now: u64) -> Self {
        let expires_at = if expires_in >= ABSOLUTE_EXPIRY_THRESHOLD {
            expires_in
        } else {
            now.saturating_add(expires_in)
        };
        Self {
            access_token,
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at
    }
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
    /// Rejected by the server or past its expiry; the user must log in again.
    Expired,
}

/// Shared session handle. Cloning shares the same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    current: RwLock<Option<Session>>,
    path: Option<PathBuf>,
    events: watch::Sender<SessionEvent>,
}

impl SessionStore {
    /// A session that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::with_state(None, None)
    }

    /// Opens the session persisted at `path`.
    ///
    /// A missing file means signed out. An unreadable JSON body is logged
    /// and treated as signed out rather than failing startup.
    pub fn open(path: PathBuf) -> Result<Self, SessionError> {
        let session = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Session>(&content) {
                Ok(session) => Some(session),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "Ignoring corrupt session file"
                    );
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => return Err(SessionError::Io { path, source: err }),
        };

        Ok(Self::with_state(session, Some(path)))
    }

    fn with_state(session: Option<Session>, path: Option<PathBuf>) -> Self {
        let initial = if session.is_some() {
            SessionEvent::SignedIn
        } else {
            SessionEvent::SignedOut
        };
        let (events, _) = watch::channel(initial);
        Self {
            inner: Arc::new(SessionInner {
                current: RwLock::new(session),
                path,
                events,
            }),
        }
    }

    /// Path of the backing file, if persisted.
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.current.read().clone()
    }

    pub fn sign_in(&self, session: Session) -> Result<(), SessionError> {
        self.persist(Some(&session))?;
        *self.inner.current.write() = Some(session);
        self.inner.events.send_replace(SessionEvent::SignedIn);
        tracing::info!("Signed in");
        Ok(())
    }

    /// Explicit logout requested by the user.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.inner.current.write().take();
        self.inner.events.send_replace(SessionEvent::SignedOut);
        tracing::info!("Signed out");
        self.persist(None)
    }

    /// Drops the session after the server rejected it.
    ///
    /// Persistence failures are logged, not returned: the caller is in the
    /// middle of surfacing a different error.
    pub fn invalidate(&self) {
        let had_session = self.inner.current.write().take().is_some();
        if had_session {
            tracing::warn!("Session invalidated, login required");
        }
        self.inner.events.send_replace(SessionEvent::Expired);
        if let Err(err) = self.persist(None) {
            tracing::warn!(error = %err, "Failed to clear persisted session");
        }
    }

    /// True when a token is present and not past its expiry.
    ///
    /// An expired session is cleared on the spot and reported as `Expired`.
    pub fn is_authenticated(&self) -> bool {
        self.bearer().is_some()
    }

    /// The token to attach to API calls, if the session is valid.
    pub fn bearer(&self) -> Option<AccessToken> {
        let now = unix_now();
        {
            let guard = self.inner.current.read();
            match guard.as_ref() {
                None => return None,
                Some(session) if session.access_token.is_empty() => return None,
                Some(session) if !session.is_expired_at(now) => {
                    return Some(session.access_token.clone());
                }
                Some(_) => {}
            }
        }
        tracing::info!("Session expired");
        self.invalidate();
        None
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    fn persist(&self, session: Option<&Session>) -> Result<(), SessionError> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };
        let io_err = |source| SessionError::Io {
            path: path.clone(),
            source,
        };

        let Some(session) = session else {
            return match fs::remove_file(path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(io_err(err)),
            };
        };

        let body = serde_json::to_vec_pretty(session)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(io_err)?;
        // Lock before truncating so a concurrent reader never sees a half-written file.
        FileExt::lock_exclusive(&file).map_err(io_err)?;
        file.set_len(0).map_err(io_err)?;
        file.write_all(&body).map_err(io_err)?;
        file.flush().map_err(io_err)?;
        Ok(())
    }
}

/// Seconds since the unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
