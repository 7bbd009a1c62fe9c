//! `elite-auth` — bearer token and identity model (no IO).
//!
//! Decodes the payload of the backend-issued JWT, validates its time window and
//! derives the [`UserIdentity`] the rest of the client works with. Signature
//! verification is the backend's job; this crate only reads claims.

pub mod claims;
pub mod identity;
pub mod roles;
pub mod token;

pub use claims::{TokenClaims, TokenError, validate_claims};
pub use identity::UserIdentity;
pub use roles::Role;
pub use token::{BearerToken, decode_claims, identity_from_token};
