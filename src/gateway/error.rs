//! Uniform error shape for every remote call.

use thiserror::Error;

use super::wire::error_message;

/// Classification of a failed gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Session missing, expired, or rejected.
    Unauthorized,
    /// The addressed user does not exist.
    NotFound,
    /// The server rejected the submitted input.
    Validation,
    /// Transport failure or timeout; safe to retry.
    Network,
    /// Anything the other kinds don't cover.
    Unknown,
}

impl ErrorKind {
    /// Message used when the response body carries none.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Your session has expired. Please login again.",
            Self::NotFound => "The requested user was not found",
            Self::Validation => "The submitted data was rejected",
            Self::Network => "Network error. Please check your connection and try again.",
            Self::Unknown => "An unexpected error occurred",
        }
    }
}

/// Errors returned by [`UserGateway`](super::UserGateway) and
/// [`AuthGateway`](super::AuthGateway) operations.
///
/// `Clone` because one failed load is delivered to every coalesced reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Network { message: String },

    #[error("{message}")]
    Unknown {
        message: String,
        status: Option<u16>,
    },
}

impl GatewayError {
    /// Builds an error of `kind` with an explicit message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Unauthorized => Self::Unauthorized { message },
            ErrorKind::NotFound => Self::NotFound { message },
            ErrorKind::Validation => Self::Validation { message },
            ErrorKind::Network => Self::Network { message },
            ErrorKind::Unknown => Self::Unknown {
                message,
                status: None,
            },
        }
    }

    /// Builds an error of `kind` with the kind's generic message.
    pub fn of_kind(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }

    /// Maps a non-success HTTP status and its body.
    ///
    /// The body's `result.message` wins over the generic message.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let kind = kind_for_status(status);
        let message = error_message(body).unwrap_or_else(|| kind.default_message().to_string());
        match kind {
            ErrorKind::Unknown => Self::Unknown {
                message,
                status: Some(status),
            },
            other => Self::new(other, message),
        }
    }

    /// Maps a transport-level failure (connect, timeout, broken body).
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Network {
                message: "Request timed out".to_string(),
            };
        }
        if err.is_decode() {
            return Self::Unknown {
                message: format!("Malformed response: {}", err),
                status: err.status().map(|s| s.as_u16()),
            };
        }
        Self::Network {
            message: format!("{} ({})", ErrorKind::Network.default_message(), err),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Network { .. } => ErrorKind::Network,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized { message }
            | Self::NotFound { message }
            | Self::Validation { message }
            | Self::Network { message }
            | Self::Unknown { message, .. } => message,
        }
    }

    /// Re-running the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Short tag for structured logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::NotFound { .. } => "not_found",
            Self::Validation { .. } => "validation",
            Self::Network { .. } => "network",
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// HTTP status to error kind.
pub fn kind_for_status(status: u16) -> ErrorKind {
    match status {
        401 => ErrorKind::Unauthorized,
        404 => ErrorKind::NotFound,
        400 | 409 | 422 => ErrorKind::Validation,
        408 | 502 | 503 | 504 => ErrorKind::Network,
        _ => ErrorKind::Unknown,
    }
}
