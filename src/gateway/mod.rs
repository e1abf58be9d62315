//! Remote user API.
//!
//! [`UserGateway`] and [`AuthGateway`] are the seams the cache, the
//! mutation coordinator, and the views depend on; [`HttpGateway`] is the
//! `reqwest` implementation. Each operation is exactly one round trip and
//! fails with a [`GatewayError`].

mod error;
mod http;
pub mod wire;

pub use error::{kind_for_status, ErrorKind, GatewayError};
pub use http::HttpGateway;

use async_trait::async_trait;

use crate::model::{User, UserId, UserInput};
use crate::session::{AccessToken, Credentials};

/// CRUD operations on user records.
#[async_trait]
pub trait UserGateway: Send + Sync {
    /// `GET /api/users?search=`; no search parameter when `search` is `None`.
    async fn list(&self, search: Option<&str>) -> Result<Vec<User>, GatewayError>;

    /// `GET /api/users/{id}`
    async fn get(&self, id: &UserId) -> Result<User, GatewayError>;

    /// `POST /api/users`
    async fn create(&self, input: &UserInput) -> Result<User, GatewayError>;

    /// `PUT /api/users/{id}`
    async fn update(&self, id: &UserId, input: &UserInput) -> Result<User, GatewayError>;

    /// `DELETE /api/users/{id}`
    async fn delete(&self, id: &UserId) -> Result<(), GatewayError>;
}

/// Token issued by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub access_token: AccessToken,
    /// Raw `expiresIn` as sent by the server.
    pub expires_in: u64,
    pub message: Option<String>,
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// `POST /api/login`. Never requires or touches an existing session.
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, GatewayError>;
}
