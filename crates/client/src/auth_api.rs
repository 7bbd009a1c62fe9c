//! Anonymous authentication endpoints.

use reqwest::Method;
use serde_json::Value;

use elite_auth::BearerToken;

use crate::rest::is_truthy;
use crate::{ClientError, LoginRequest, RegistrationRequest, RestClient};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTRATION_PATH: &str = "/auth/registration";

#[derive(Debug, Clone)]
pub struct AuthApi {
    rest: RestClient,
}

impl AuthApi {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// Exchange credentials for a bearer token.
    ///
    /// `Ok(None)` means the backend answered with something falsy (`null`,
    /// `false`, an empty string): the credentials were not accepted.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Option<BearerToken>, ClientError> {
        let body = self
            .rest
            .request(Method::POST, LOGIN_PATH)
            .json(credentials)
            .send_text()
            .await?;

        Ok(token_from_body(&body))
    }

    /// Register a new account; returns the backend's verdict.
    pub async fn registration(&self, payload: &RegistrationRequest) -> Result<bool, ClientError> {
        let reply = self
            .rest
            .request(Method::POST, REGISTRATION_PATH)
            .json(payload)
            .send_value()
            .await?;
        Ok(is_truthy(&reply))
    }
}

/// The login reply is either a JSON string, kept verbatim, or the bare token
/// text, trimmed of surrounding whitespace.
fn token_from_body(body: &str) -> Option<BearerToken> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(token)) => BearerToken::new(token),
        Ok(other) => {
            if is_truthy(&other) {
                tracing::warn!("login reply is JSON but not a token string; treating as rejected");
            }
            None
        }
        Err(_) => BearerToken::new(trimmed),
    }
}
