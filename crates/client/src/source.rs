use reqwest::Method;

use elite_auth::BearerToken;

use crate::{ApiRequest, RestClient};

/// Read-only view of the current bearer token.
///
/// Implementors must not hand out a token after logout; request builders ask
/// again for every call.
pub trait TokenSource: Send + Sync {
    fn bearer(&self) -> Option<BearerToken>;
}

/// A fixed token (or none), e.g. for scripts or tests.
impl TokenSource for Option<BearerToken> {
    fn bearer(&self) -> Option<BearerToken> {
        self.clone()
    }
}

impl<T: TokenSource + ?Sized> TokenSource for std::sync::Arc<T> {
    fn bearer(&self) -> Option<BearerToken> {
        (**self).bearer()
    }
}

/// Client for endpoints that require a signed-in user.
#[derive(Debug, Clone)]
pub struct AuthorizedClient<T> {
    rest: RestClient,
    tokens: T,
}

impl<T: TokenSource> AuthorizedClient<T> {
    pub fn new(rest: RestClient, tokens: T) -> Self {
        Self { rest, tokens }
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// Build a request carrying whatever token is current right now.
    pub fn request(&self, method: Method, path: &str) -> ApiRequest {
        let token = self.tokens.bearer();
        self.rest.request(method, path).bearer(token.as_ref())
    }
}
