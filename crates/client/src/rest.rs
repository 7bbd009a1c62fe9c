//! Shared REST transport.

use std::future::Future;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use elite_auth::BearerToken;

use crate::{ClientConfig, ClientError};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Thin wrapper over `reqwest::Client` bound to one backend.
///
/// Holds no credentials: the bearer token is attached per request through
/// [`ApiRequest::bearer`], so a logged-out caller can never leak a stale
/// header.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start building a request for `path` (relative to the base url).
    pub fn request(&self, method: Method, path: &str) -> ApiRequest {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        ApiRequest {
            inner: self.http.request(method.clone(), url),
            method,
            path: path.to_string(),
            request_id: Uuid::now_v7(),
            cancel: None,
        }
    }
}

/// A request under construction.
#[must_use = "requests do nothing until sent"]
pub struct ApiRequest {
    inner: reqwest::RequestBuilder,
    method: Method,
    path: String,
    request_id: Uuid,
    cancel: Option<CancellationToken>,
}

impl ApiRequest {
    /// Attach `Authorization: Bearer <token>`; `None` leaves the header out.
    pub fn bearer(mut self, token: Option<&BearerToken>) -> Self {
        if let Some(token) = token {
            self.inner = self.inner.bearer_auth(token.as_str());
        }
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.inner = self.inner.json(body);
        self
    }

    /// Abort the request (including body download) once `token` is cancelled.
    pub fn cancel_on(mut self, token: &CancellationToken) -> Self {
        self.cancel = Some(token.clone());
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Send and deserialize a JSON response body.
    pub async fn send_json<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        let cancel = self.cancel.clone();
        with_cancel(cancel, async move {
            let resp = self.execute().await?;
            resp.json::<T>()
                .await
                .map_err(|e| ClientError::Parse(e.to_string()))
        })
        .await
    }

    /// Send and return the body as JSON; an empty body is `Value::Null`.
    pub async fn send_value(self) -> Result<Value, ClientError> {
        let text = self.send_text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Send and return the raw body text.
    pub async fn send_text(self) -> Result<String, ClientError> {
        let cancel = self.cancel.clone();
        with_cancel(cancel, async move {
            let resp = self.execute().await?;
            resp.text().await.map_err(ClientError::from)
        })
        .await
    }

    async fn execute(self) -> Result<reqwest::Response, ClientError> {
        let ApiRequest {
            inner,
            method,
            path,
            request_id,
            ..
        } = self;

        let resp = inner
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(%method, %path, %request_id, error = %e, "request failed");
                ClientError::from(e)
            })?;

        let status = resp.status();
        tracing::debug!(%method, %path, %request_id, status = status.as_u16(), "request completed");

        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(%method, %path, %request_id, error = %e, "failed to read error body");
                    String::new()
                }
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp)
    }
}

async fn with_cancel<T>(
    cancel: Option<CancellationToken>,
    work: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    match cancel {
        Some(cancel) => {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ClientError::Cancelled),
                res = work => res,
            }
        }
        None => work.await,
    }
}

/// Truthiness of a backend reply, the way the admin UI has always read
/// `true`/`"token"`/`{...}` versus `false`/`""`/`null`/`0`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
