//! Session state and its named operations.

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use elite_auth::{BearerToken, UserIdentity, identity_from_token};
use elite_client::{AuthApi, LoginRequest, RegistrationRequest, TokenSource};

use crate::{FileTokenStorage, SessionError, TokenStorage};

/// Point-in-time view of the session.
///
/// `user` is present only when `token` decodes and has not expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: Option<BearerToken>,
    pub is_authenticated: bool,
    pub user: Option<UserIdentity>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            token: None,
            is_authenticated: false,
            user: None,
        }
    }
}

/// Process-wide owner of the bearer token.
///
/// The token sits in a watch channel whose sender never leaves this struct, so
/// [`login`](Self::login) and [`logout`](Self::logout) are the only writers.
/// Authentication is never stored: it is recomputed from the token.
pub struct SessionStore<S = FileTokenStorage> {
    api: AuthApi,
    storage: S,
    token: watch::Sender<Option<BearerToken>>,
}

impl<S: TokenStorage> SessionStore<S> {
    /// Rebuild the session from persisted storage (application start).
    ///
    /// Unreadable storage starts the session anonymous.
    pub fn restore(api: AuthApi, storage: S) -> Self {
        let persisted = match storage.load() {
            Ok(raw) => raw.and_then(BearerToken::new),
            Err(e) => {
                error!(error = %e, "failed to read persisted token; starting anonymous");
                None
            }
        };
        if persisted.is_some() {
            debug!("restored persisted session token");
        }

        let (token, _) = watch::channel(persisted);
        Self { api, storage, token }
    }

    /// Read-only handle for request builders and observers.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.token.subscribe(),
        }
    }

    /// The raw current token, valid or not.
    pub fn token(&self) -> Option<BearerToken> {
        self.token.borrow().clone()
    }

    /// Send credentials to the backend and keep the returned token.
    ///
    /// Returns `Ok(false)` when the backend answers with a falsy value; storage
    /// is left untouched in that case. Transport failures propagate.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<bool, SessionError> {
        let Some(token) = self.api.login(credentials).await? else {
            info!(username = %credentials.username, "login rejected");
            return Ok(false);
        };

        self.storage.save(token.as_str())?;
        self.token.send_replace(Some(token));
        info!(username = %credentials.username, "logged in");
        Ok(true)
    }

    /// Forward a registration; no local state changes.
    pub async fn registration(&self, payload: &RegistrationRequest) -> Result<bool, SessionError> {
        let accepted = self.api.registration(payload).await?;
        info!(username = %payload.username, accepted, "registration submitted");
        Ok(accepted)
    }

    /// Drop the token from memory and storage. Safe to call when logged out.
    pub fn logout(&self) {
        let previous = self.token.send_replace(None);
        if let Err(e) = self.storage.clear() {
            error!(error = %e, "failed to remove persisted token");
        }
        if previous.is_some() {
            info!("logged out");
        }
    }

    /// Evaluate the session at `now` without side effects.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Session {
        let Some(token) = self.token() else {
            return Session::anonymous();
        };
        let user = identity_from_token(&token, now).ok();
        Session {
            token: Some(token),
            is_authenticated: user.is_some(),
            user,
        }
    }

    /// Check the token and log out when it is malformed or expired.
    ///
    /// Call this at application start and before protected work.
    pub fn validate_and_refresh(&self) -> Session {
        self.validate_and_refresh_at(Utc::now())
    }

    pub fn validate_and_refresh_at(&self, now: DateTime<Utc>) -> Session {
        let Some(token) = self.token() else {
            return Session::anonymous();
        };

        match identity_from_token(&token, now) {
            Ok(user) => Session {
                token: Some(token),
                is_authenticated: true,
                user: Some(user),
            },
            Err(e) => {
                warn!(error = %e, "token validation error; logging out");
                self.logout();
                Session::anonymous()
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.validate_and_refresh().is_authenticated
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.validate_and_refresh().user
    }
}

/// Observer side of the session token.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<Option<BearerToken>>,
}

impl SessionHandle {
    pub fn current(&self) -> Option<BearerToken> {
        self.rx.borrow().clone()
    }

    /// Wait for the next login/logout. Returns `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

impl TokenSource for SessionHandle {
    fn bearer(&self) -> Option<BearerToken> {
        self.current()
    }
}
