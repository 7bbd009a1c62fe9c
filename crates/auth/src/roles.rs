use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};

/// Role granted to the signed-in user.
///
/// Roles are opaque strings at this layer; the admin UI only displays them
/// and checks membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare ignoring a Spring-style `ROLE_` prefix and letter case.
    pub fn matches(&self, name: &str) -> bool {
        let own = self.as_str();
        let own = own.strip_prefix("ROLE_").unwrap_or(own);
        let other = name.strip_prefix("ROLE_").unwrap_or(name);
        own.eq_ignore_ascii_case(other)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shapes the `roles` claim shows up in.
#[derive(Deserialize)]
#[serde(untagged)]
enum RolesClaim {
    One(String),
    Many(Vec<RoleEntry>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RoleEntry {
    Name(String),
    Authority { authority: String },
    Named { name: String },
    Role { role: String },
}

impl RoleEntry {
    fn into_role(self) -> Role {
        match self {
            RoleEntry::Name(s)
            | RoleEntry::Authority { authority: s }
            | RoleEntry::Named { name: s }
            | RoleEntry::Role { role: s } => Role::new(s),
        }
    }
}

/// Deserialize the `roles` claim; `null` and a missing claim yield no roles.
pub(crate) fn deserialize_roles<'de, D>(deserializer: D) -> Result<Vec<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let claim = Option::<RolesClaim>::deserialize(deserializer)?;
    Ok(match claim {
        None => Vec::new(),
        Some(RolesClaim::One(s)) if s.trim().is_empty() => Vec::new(),
        Some(RolesClaim::One(s)) => vec![Role::new(s)],
        Some(RolesClaim::Many(entries)) => entries.into_iter().map(RoleEntry::into_role).collect(),
    })
}
