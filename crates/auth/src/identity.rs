use serde::{Deserialize, Serialize};

use crate::{Role, TokenClaims};

/// Who is signed in, as derived from a valid token.
///
/// Never persisted; recomputed from the token whenever it is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub username: String,
    pub roles: Vec<Role>,
}

impl UserIdentity {
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.matches(name))
    }
}

impl From<TokenClaims> for UserIdentity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            username: claims.sub,
            roles: claims.roles,
        }
    }
}
