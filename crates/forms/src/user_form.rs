//! User add/edit page controller.

use std::str::FromStr;

use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use elite_client::lookups::GENDER_CODE_TYPE;
use elite_client::{
    AuthorizedClient, ClientError, CodeModel, CountryModel, TokenSource, UserModel,
    UserPatchRequest,
};
use elite_core::{DomainError, UserId};

use crate::{FieldErrors, FieldSchema, FormSchema, FormState, FormValues};

/// Route of the user listing the page returns to after saving.
pub const LISTING_ROUTE: &str = "/config/user";

pub const UPDATED_MESSAGE: &str = "User has been successfully updated!!!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UserField {
    Username,
    Email,
    FirstName,
    LastName,
    Gender,
    Address,
    Phone,
    Country,
}

impl UserField {
    pub const ALL: [UserField; 8] = [
        UserField::Username,
        UserField::Email,
        UserField::FirstName,
        UserField::LastName,
        UserField::Gender,
        UserField::Address,
        UserField::Phone,
        UserField::Country,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserField::Username => "username",
            UserField::Email => "email",
            UserField::FirstName => "first_name",
            UserField::LastName => "last_name",
            UserField::Gender => "gender",
            UserField::Address => "address",
            UserField::Phone => "phone",
            UserField::Country => "country",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserField::Username => "Username",
            UserField::Email => "Email",
            UserField::FirstName => "First Name",
            UserField::LastName => "Last Name",
            UserField::Gender => "Gender",
            UserField::Address => "Address",
            UserField::Phone => "Phone",
            UserField::Country => "Country",
        }
    }
}

impl core::fmt::Display for UserField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown user field '{s}'")))
    }
}

/// Validation rules of the user form.
pub fn user_schema() -> FormSchema {
    let required = |field: UserField| {
        FieldSchema::new(field.as_str()).required(format!("{} is required.", field.label()))
    };
    let ten_digits = Regex::new(r"^\d{10}$").expect("phone pattern is valid");

    FormSchema::new()
        .field(required(UserField::Username))
        .field(required(UserField::Email).email("Invalid email format"))
        .field(required(UserField::FirstName))
        .field(required(UserField::LastName))
        .field(required(UserField::Gender))
        .field(required(UserField::Address))
        .field(required(UserField::Phone).matches(ten_digits, "Phone number must be 10 digits"))
        .field(required(UserField::Country))
}

/// Create-mode defaults: every field empty.
pub fn default_values() -> FormValues {
    UserField::ALL.into_iter().map(|f| (f.as_str(), "")).collect()
}

/// Form values for an existing user; nested references become their ids.
pub fn values_from_user(user: &UserModel) -> FormValues {
    let gender = user
        .gender
        .as_ref()
        .map(|g| g.id.to_string())
        .unwrap_or_default();
    let country = user
        .country
        .as_ref()
        .map(|c| c.id.to_string())
        .unwrap_or_default();

    [
        (UserField::Username, user.username.clone()),
        (UserField::Email, user.email.clone()),
        (UserField::FirstName, user.first_name.clone()),
        (UserField::LastName, user.last_name.clone()),
        (UserField::Gender, gender),
        (UserField::Address, user.address.clone()),
        (UserField::Phone, user.phone.clone().unwrap_or_default()),
        (UserField::Country, country),
    ]
    .into_iter()
    .map(|(f, v)| (f.as_str(), v))
    .collect()
}

pub fn patch_from_values(values: &FormValues) -> UserPatchRequest {
    let get = |f: UserField| values.get(f.as_str()).to_string();
    UserPatchRequest {
        username: get(UserField::Username),
        email: get(UserField::Email),
        password: None,
        first_name: get(UserField::FirstName),
        last_name: get(UserField::LastName),
        gender: get(UserField::Gender),
        address: get(UserField::Address),
        phone: get(UserField::Phone),
        country: get(UserField::Country),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(UserId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::Success(msg) => msg,
        }
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Schema validation failed; nothing was sent.
    Invalid(FieldErrors),

    /// The backend confirmed the update; the form was reset.
    Saved {
        notification: Notification,
        redirect: &'static str,
    },

    /// The backend answered with a falsy body; nothing else happens.
    NotSaved,

    /// The page has no create path; nothing was sent.
    CreateUnsupported,
}

#[derive(Debug, Default)]
pub enum LoadStatus {
    Loaded,
    #[default]
    Skipped,
    Failed(ClientError),
    Cancelled,
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded)
    }
}

/// What `on_init` managed to load. Each fetch succeeds or fails on its own.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub countries: LoadStatus,
    pub genders: LoadStatus,
    pub user: LoadStatus,
}

/// One entry of a selection input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub icon_url: Option<String>,
}

/// Orchestrates loading, validating and saving one user.
///
/// All requests race the controller's cancellation token; deactivating (or
/// dropping) the controller aborts whatever is still in flight.
pub struct UserFormController<T> {
    client: AuthorizedClient<T>,
    mode: FormMode,
    form: FormState,
    countries: Vec<CountryModel>,
    genders: Vec<CodeModel>,
    cancel: CancellationToken,
}

impl<T: TokenSource> UserFormController<T> {
    pub fn new(client: AuthorizedClient<T>, id: Option<UserId>) -> Self {
        let mode = match id {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        };
        Self {
            client,
            mode,
            form: FormState::new(user_schema(), default_values()),
            countries: Vec::new(),
            genders: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Build from the raw `:id` route parameter (absent means create mode).
    pub fn from_route(client: AuthorizedClient<T>, id: Option<&str>) -> Result<Self, DomainError> {
        let id = id.map(str::parse::<UserId>).transpose()?;
        Ok(Self::new(client, id))
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add User",
            FormMode::Edit(_) => "Edit User",
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn countries(&self) -> &[CountryModel] {
        &self.countries
    }

    pub fn genders(&self) -> &[CodeModel] {
        &self.genders
    }

    pub fn country_options(&self) -> Vec<SelectOption> {
        self.countries
            .iter()
            .map(|c| SelectOption {
                value: c.id.to_string(),
                label: c.display_name().to_string(),
                icon_url: c.flag_url(),
            })
            .collect()
    }

    pub fn gender_options(&self) -> Vec<SelectOption> {
        self.genders
            .iter()
            .map(|g| SelectOption {
                value: g.id.to_string(),
                label: g.name.clone(),
                icon_url: None,
            })
            .collect()
    }

    pub fn set_value(&mut self, field: UserField, value: impl Into<String>) {
        self.form.set_value(field.as_str(), value);
    }

    pub fn blur(&mut self, field: UserField) {
        self.form.blur(field.as_str());
    }

    pub fn visible_error(&self, field: UserField) -> Option<&str> {
        self.form.visible_error(field.as_str())
    }

    /// Load lookup lists and, in edit mode, the user being edited.
    ///
    /// The three fetches run concurrently with no ordering between them.
    pub async fn on_init(&mut self) -> LoadReport {
        let mode = self.mode;
        let cancel = self.cancel.clone();
        let client = &self.client;

        let (countries, genders, user) = tokio::join!(
            client.get_countries(&cancel),
            client.get_code_details_by_type_code(GENDER_CODE_TYPE, &cancel),
            async {
                match mode {
                    FormMode::Edit(id) => Some(client.get_user_detail_by_id(id, &cancel).await),
                    FormMode::Create => None,
                }
            },
        );

        let mut report = LoadReport {
            countries: self.settle("countries", countries, |this, list| this.countries = list),
            genders: self.settle("genders", genders, |this, list| this.genders = list),
            user: LoadStatus::Skipped,
        };
        if let Some(user) = user {
            report.user = self.settle("user", user, |this, user| {
                this.form.reinitialize(values_from_user(&user));
            });
        }
        report
    }

    fn settle<V>(
        &mut self,
        what: &'static str,
        result: Result<V, ClientError>,
        apply: impl FnOnce(&mut Self, V),
    ) -> LoadStatus {
        if self.cancel.is_cancelled() {
            return LoadStatus::Cancelled;
        }
        match result {
            Ok(value) => {
                apply(self, value);
                LoadStatus::Loaded
            }
            Err(ClientError::Cancelled) => LoadStatus::Cancelled,
            Err(e) => {
                warn!(error = %e, what, "failed to load form data");
                LoadStatus::Failed(e)
            }
        }
    }

    /// Validate and, in edit mode, send the partial update.
    ///
    /// Transport failures propagate; a falsy backend reply is `NotSaved`.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, ClientError> {
        if !self.form.validate_for_submit() {
            return Ok(SubmitOutcome::Invalid(self.form.errors().clone()));
        }

        let id = match self.mode {
            FormMode::Edit(id) => id,
            FormMode::Create => {
                warn!("user form submitted in create mode; no create endpoint is wired");
                return Ok(SubmitOutcome::CreateUnsupported);
            }
        };

        let payload = patch_from_values(self.form.values());
        if !self.client.patch_user_detail(id, &payload, &self.cancel).await? {
            warn!(%id, "backend did not confirm user update");
            return Ok(SubmitOutcome::NotSaved);
        }

        info!(%id, "user updated");
        self.form.reset();
        Ok(SubmitOutcome::Saved {
            notification: Notification::Success(UPDATED_MESSAGE.to_string()),
            redirect: LISTING_ROUTE,
        })
    }

    /// Abort in-flight requests; later results are discarded.
    pub fn deactivate(&self) {
        self.cancel.cancel();
    }

    /// Token that deactivates this controller when cancelled, for whoever
    /// owns the page lifecycle (router, window, signal handler).
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl<T> Drop for UserFormController<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elite_core::{CodeId, CountryId};

    fn user(gender: Option<u64>, country: Option<u64>, phone: Option<&str>) -> UserModel {
        UserModel {
            id: UserId::new(42),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            gender: gender.map(|id| CodeModel {
                id: CodeId::new(id),
                name: "Female".to_string(),
                code: None,
            }),
            address: "1 Main St".to_string(),
            phone: phone.map(str::to_string),
            country: country.map(|id| CountryModel {
                id: CountryId::new(id),
                name: "INDIA".to_string(),
                nice_name: "India".to_string(),
                iso: Some("IN".to_string()),
                phone_code: Some(91),
            }),
        }
    }

    #[test]
    fn nested_references_become_id_strings() {
        let values = values_from_user(&user(Some(3), Some(99), Some("5551234567")));
        assert_eq!(values.get("gender"), "3");
        assert_eq!(values.get("country"), "99");
        assert_eq!(values.get("phone"), "5551234567");
        assert!(user_schema().validate(&values).is_empty());
    }

    #[test]
    fn missing_references_become_empty_and_fail_validation() {
        let values = values_from_user(&user(None, None, None));
        assert_eq!(values.get("gender"), "");
        let errors = user_schema().validate(&values);
        assert_eq!(errors.get("gender"), Some("Gender is required."));
        assert_eq!(errors.get("country"), Some("Country is required."));
        assert_eq!(errors.get("phone"), Some("Phone is required."));
    }

    #[test]
    fn schema_messages() {
        let errors = user_schema().validate(&default_values());
        assert_eq!(errors.len(), 8);
        assert_eq!(errors.get("first_name"), Some("First Name is required."));
        assert_eq!(errors.get("last_name"), Some("Last Name is required."));
    }

    #[test]
    fn patch_carries_form_values_without_password() {
        let values = values_from_user(&user(Some(3), Some(99), Some("5551234567")));
        let patch = patch_from_values(&values);
        assert_eq!(patch.gender, "3");
        assert_eq!(patch.country, "99");
        assert!(patch.password.is_none());
    }

    #[test]
    fn field_names_parse() {
        assert_eq!("first_name".parse::<UserField>().unwrap(), UserField::FirstName);
        assert!("password".parse::<UserField>().is_err());
    }
}
