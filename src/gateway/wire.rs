//! JSON envelopes used by the user API.
//!
//! Every success body is `{status?, result: {data, message?}}`; error
//! bodies are `{result: {message}, status}`.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::model::User;

use super::error::GatewayError;

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status: Option<u16>,
    pub result: ApiResult<T>,
}

#[derive(Debug, Deserialize)]
pub struct ApiResult<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsersPayload {
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub user: User,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    result: Option<ErrorResult>,
}

#[derive(Debug, Deserialize)]
struct ErrorResult {
    #[serde(default)]
    message: Option<String>,
}

/// Decodes a success body into its envelope.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<ApiEnvelope<T>, GatewayError> {
    serde_json::from_slice(body).map_err(|e| GatewayError::Unknown {
        message: format!("Malformed response: {}", e),
        status: None,
    })
}

/// `result.message` of an error body, when present and non-empty.
pub fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()?
        .result?
        .message
        .filter(|m| !m.trim().is_empty())
}
