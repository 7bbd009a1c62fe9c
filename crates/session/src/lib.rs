//! `elite-session` — who is signed in, backed by a persisted bearer token.
//!
//! [`SessionStore`] is the single writer of the token. Everything else reads
//! it through a [`SessionHandle`], which implements
//! [`TokenSource`](elite_client::TokenSource) so request builders pick up the
//! current token (or its absence) on every call.

pub mod error;
pub mod storage;
pub mod store;

pub use error::{SessionError, StorageError};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TOKEN_KEY, TokenStorage};
pub use store::{Session, SessionHandle, SessionStore};
