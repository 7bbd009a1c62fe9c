//! `elite-core` — shared primitives for the Elite admin client.
//!
//! Nothing in here performs IO; identifiers and the domain error model are
//! shared by the auth, client, session and form layers.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{CodeId, CountryId, UserId};
