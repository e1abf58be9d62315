//! Transient success and error messages.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// How long a toast stays visible.
pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub message: String,
    pub expires_at: Instant,
}

/// Shared toast queue. Cloning shares the queue.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Mutex<NotifierInner>>,
    ttl: Duration,
}

#[derive(Default)]
struct NotifierInner {
    next_id: u64,
    toasts: VecDeque<Toast>,
}

impl NotifierInner {
    fn prune(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires_at > now);
    }
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(NotifierInner::default())),
            ttl,
        }
    }

    pub fn push(&self, level: ToastLevel, message: impl Into<String>) -> u64 {
        let message = message.into();
        tracing::debug!(?level, %message, "Toast");
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.toasts.push_back(Toast {
            id,
            level,
            message,
            expires_at: Instant::now() + self.ttl,
        });
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(ToastLevel::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(ToastLevel::Error, message)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(ToastLevel::Info, message)
    }

    /// Toasts still within their time-to-live, oldest first.
    pub fn active(&self) -> Vec<Toast> {
        let mut inner = self.inner.lock();
        inner.prune(Instant::now());
        inner.toasts.iter().cloned().collect()
    }

    /// Removes and returns every live toast.
    pub fn drain(&self) -> Vec<Toast> {
        let mut inner = self.inner.lock();
        inner.prune(Instant::now());
        inner.toasts.drain(..).collect()
    }

    pub fn dismiss(&self, id: u64) {
        self.inner.lock().toasts.retain(|toast| toast.id != id);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL)
    }
}
