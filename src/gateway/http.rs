use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::Serialize;

use crate::config::ApiConfig;
use crate::model::{User, UserId, UserInput};
use crate::session::{AccessToken, Credentials, SessionStore};

use super::error::{ErrorKind, GatewayError};
use super::wire::{self, LoginPayload, UserPayload, UsersPayload};
use super::{AuthGateway, LoginGrant, UserGateway};

const LOGIN_FAILED_MESSAGE: &str = "Invalid Credentials!";

/// `reqwest`-backed gateway for the user API.
///
/// Reads the bearer token from the shared [`SessionStore`] on every call
/// and invalidates it when the server answers 401.
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    session: SessionStore,
}

impl HttpGateway {
    pub fn new(config: &ApiConfig, session: SessionStore) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| GatewayError::Unknown {
            message: format!("Invalid base URL '{}': {}", config.base_url, e),
            status: None,
        })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| GatewayError::Unknown {
                message: format!("Failed to build HTTP client: {}", e),
                status: None,
            })?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` + `/api/<segments...>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Unknown {
                message: format!("Base URL '{}' cannot carry a path", self.base_url),
                status: None,
            })?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    /// Sends an authorized request and returns the raw success body.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Vec<u8>, GatewayError> {
        let Some(token) = self.session.bearer() else {
            tracing::debug!(%method, %url, "No valid session, refusing request");
            return Err(GatewayError::of_kind(ErrorKind::Unauthorized));
        };

        let mut builder = self
            .client
            .request(method.clone(), url.clone())
            .bearer_auth(token.expose());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!(%method, %url, "Sending request");
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(&e))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::from_transport(&e))?;

        if status.is_success() {
            return Ok(bytes.to_vec());
        }

        let err = GatewayError::from_response(status.as_u16(), &bytes);
        tracing::warn!(
            %method,
            %url,
            status = status.as_u16(),
            error_type = err.error_type(),
            error = %err,
            "Request failed"
        );
        if err.kind() == ErrorKind::Unauthorized {
            self.session.invalidate();
        }
        Err(err)
    }
}

#[async_trait]
impl UserGateway for HttpGateway {
    async fn list(&self, search: Option<&str>) -> Result<Vec<User>, GatewayError> {
        let mut url = self.endpoint(&["users"])?;
        if let Some(term) = search.filter(|s| !s.is_empty()) {
            url.query_pairs_mut().append_pair("search", term);
        }
        let body = self.send::<()>(Method::GET, url, None).await?;
        let envelope = wire::decode::<UsersPayload>(&body)?;
        Ok(envelope.result.data.users)
    }

    async fn get(&self, id: &UserId) -> Result<User, GatewayError> {
        let url = self.endpoint(&["users", id.as_str()])?;
        let body = self.send::<()>(Method::GET, url, None).await?;
        Ok(wire::decode::<UserPayload>(&body)?.result.data.user)
    }

    async fn create(&self, input: &UserInput) -> Result<User, GatewayError> {
        let url = self.endpoint(&["users"])?;
        let body = self.send(Method::POST, url, Some(input)).await?;
        Ok(wire::decode::<UserPayload>(&body)?.result.data.user)
    }

    async fn update(&self, id: &UserId, input: &UserInput) -> Result<User, GatewayError> {
        let url = self.endpoint(&["users", id.as_str()])?;
        let body = self.send(Method::PUT, url, Some(input)).await?;
        Ok(wire::decode::<UserPayload>(&body)?.result.data.user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), GatewayError> {
        let url = self.endpoint(&["users", id.as_str()])?;
        self.send::<()>(Method::DELETE, url, None).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, GatewayError> {
        let url = self.endpoint(&["login"])?;
        tracing::debug!(%url, email = %credentials.email, "Logging in");

        let response = self
            .client
            .post(url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(&e))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::from_transport(&e))?;

        if status.as_u16() == 401 {
            let message =
                wire::error_message(&bytes).unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string());
            return Err(GatewayError::Unauthorized { message });
        }
        if !status.is_success() {
            return Err(GatewayError::from_response(status.as_u16(), &bytes));
        }

        let envelope = wire::decode::<LoginPayload>(&bytes)?;
        Ok(LoginGrant {
            access_token: AccessToken::new(envelope.result.data.access_token),
            expires_in: envelope.result.data.expires_in,
            message: envelope.result.message,
        })
    }
}
