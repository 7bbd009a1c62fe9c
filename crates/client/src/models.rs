//! Wire models of the admin backend.

use serde::{Deserialize, Deserializer, Serialize};

use elite_core::{CodeId, CountryId, UserId};

/// Credentials for `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl core::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Payload for `POST /auth/registration`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub address: String,
    pub phone: String,
    pub country: String,
}

impl core::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Partial update of a user (`PATCH /user/{id}`).
///
/// Reference fields (`gender`, `country`) carry the selected id as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatchRequest {
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub address: String,
    pub phone: String,
    pub country: String,
}

/// A user as returned by `GET /user/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserModel {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: Option<CodeModel>,
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone: Option<String>,
    #[serde(default)]
    pub country: Option<CountryModel>,
}

/// Entry of the country lookup list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryModel {
    pub id: CountryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nice_name: String,
    /// Two-letter ISO code.
    #[serde(default, alias = "isp")]
    pub iso: Option<String>,
    #[serde(default, alias = "phonecode")]
    pub phone_code: Option<i64>,
}

impl CountryModel {
    /// Label shown in selection inputs.
    pub fn display_name(&self) -> &str {
        if self.nice_name.is_empty() {
            &self.name
        } else {
            &self.nice_name
        }
    }

    /// Lower-case ISO code as used by flag image hosts.
    pub fn flag_code(&self) -> Option<String> {
        self.iso
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn flag_url(&self) -> Option<String> {
        self.flag_code()
            .map(|code| format!("https://flagcdn.com/16x12/{code}.png"))
    }
}

/// Entry of a code table (e.g. the `GENDER` codes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeModel {
    pub id: CodeId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Uint(u64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Uint(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    }))
}
