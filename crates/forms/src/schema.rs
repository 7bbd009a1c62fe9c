//! Declarative validation schema.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email pattern is valid")
});

/// Flat field-name → string mapping, the shape every form works on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `field`; unknown fields read as empty.
    pub fn get(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One error message per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone)]
pub enum Rule {
    Email { message: String },
    Pattern { regex: Regex, message: String },
}

impl Rule {
    fn check(&self, value: &str) -> Option<&str> {
        match self {
            Rule::Email { message } => (!EMAIL.is_match(value)).then_some(message.as_str()),
            Rule::Pattern { regex, message } => (!regex.is_match(value)).then_some(message.as_str()),
        }
    }
}

/// Rules for a single field.
///
/// A blank value reports only the `required` message (if any); otherwise the
/// first failing rule wins.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    name: String,
    required: Option<String>,
    rules: Vec<Rule>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: None,
            rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = Some(message.into());
        self
    }

    pub fn email(mut self, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Email {
            message: message.into(),
        });
        self
    }

    pub fn matches(mut self, regex: Regex, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Pattern {
            regex,
            message: message.into(),
        });
        self
    }

    /// Only the empty string is missing; whitespace counts as a value.
    pub fn check(&self, value: &str) -> Option<&str> {
        if value.is_empty() {
            return self.required.as_deref();
        }
        self.rules.iter().find_map(|rule| rule.check(value))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    fields: Vec<FieldSchema>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter()
    }

    pub fn validate(&self, values: &FormValues) -> FieldErrors {
        FieldErrors(
            self.fields
                .iter()
                .filter_map(|f| {
                    f.check(values.get(f.name()))
                        .map(|msg| (f.name().to_string(), msg.to_string()))
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSchema::new("email").email("Invalid email format").required("Email is required."))
            .field(
                FieldSchema::new("phone")
                    .matches(Regex::new(r"^\d{10}$").unwrap(), "Phone number must be 10 digits")
                    .required("Phone is required."),
            )
            .field(FieldSchema::new("nickname"))
    }

    #[test]
    fn blank_values_report_required() {
        let errors = schema().validate(&FormValues::new());
        assert_eq!(errors.get("email"), Some("Email is required."));
        assert_eq!(errors.get("phone"), Some("Phone is required."));
        assert_eq!(errors.get("nickname"), None);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn format_rules_apply_to_filled_values() {
        let values: FormValues = [("email", "not-an-email"), ("phone", "12345")].into_iter().collect();
        let errors = schema().validate(&values);
        assert_eq!(errors.get("email"), Some("Invalid email format"));
        assert_eq!(errors.get("phone"), Some("Phone number must be 10 digits"));
    }

    #[test]
    fn whitespace_satisfies_required() {
        let name = FieldSchema::new("address").required("Address is required.");
        assert_eq!(name.check(""), Some("Address is required."));
        assert_eq!(name.check("   "), None);
    }

    #[test]
    fn valid_values_pass() {
        let values: FormValues = [("email", "alice@example.com"), ("phone", "5551234567")]
            .into_iter()
            .collect();
        assert!(schema().validate(&values).is_empty());
    }

    #[test]
    fn email_shapes() {
        let email = FieldSchema::new("email").email("bad");
        for ok in ["a@b.co", "first.last+tag@sub.example.org"] {
            assert_eq!(email.check(ok), None, "{ok}");
        }
        for bad in ["a@", "@b.com", "a b@c.com", "a@b", "a@@b.com"] {
            assert_eq!(email.check(bad), Some("bad"), "{bad}");
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: exactly ten digits is the only accepted phone shape.
            #[test]
            fn phone_accepts_only_ten_digits(digits in "[0-9]{1,15}") {
                let values: FormValues = [("email", "a@b.co"), ("phone", digits.as_str())].into_iter().collect();
                let errors = schema().validate(&values);
                prop_assert_eq!(errors.get("phone").is_none(), digits.len() == 10);
            }
        }
    }
}
