//! `elite-client` — REST access to the Elite admin backend.
//!
//! [`RestClient`] is the shared transport. Every request is built explicitly:
//! the caller decides whether a bearer token is attached, and may tie the
//! request to a [`CancellationToken`](tokio_util::sync::CancellationToken).
//! Endpoints are grouped into [`AuthApi`] (anonymous) and
//! [`AuthorizedClient`] (token read per call from a [`TokenSource`]).

pub mod auth_api;
pub mod config;
pub mod error;
pub mod lookups;
pub mod models;
pub mod rest;
pub mod source;
pub mod users;

pub use auth_api::AuthApi;
pub use config::ClientConfig;
pub use error::ClientError;
pub use models::{
    CodeModel, CountryModel, LoginRequest, RegistrationRequest, UserModel, UserPatchRequest,
};
pub use reqwest::Method;
pub use rest::{ApiRequest, RestClient, is_truthy};
pub use source::{AuthorizedClient, TokenSource};
