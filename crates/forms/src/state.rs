//! Form values, touched fields and inline error visibility.

use std::collections::BTreeSet;

use crate::{FieldErrors, FormSchema, FormValues};

/// Live state of one form.
///
/// Errors are recomputed on every change but only become visible for a field
/// once it has been touched, or for every field once a submit was attempted.
#[derive(Debug, Clone)]
pub struct FormState {
    schema: FormSchema,
    initial: FormValues,
    values: FormValues,
    touched: BTreeSet<String>,
    submit_attempted: bool,
    errors: FieldErrors,
}

impl FormState {
    pub fn new(schema: FormSchema, initial: FormValues) -> Self {
        let errors = schema.validate(&initial);
        Self {
            schema,
            values: initial.clone(),
            initial,
            touched: BTreeSet::new(),
            submit_attempted: false,
            errors,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn initial_values(&self) -> &FormValues {
        &self.initial
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field)
    }

    /// All current errors, visible or not.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    pub fn submit_attempted(&self) -> bool {
        self.submit_attempted
    }

    pub fn is_dirty(&self) -> bool {
        self.values != self.initial
    }

    pub fn set_value(&mut self, field: &str, value: impl Into<String>) {
        self.values.set(field, value);
        self.revalidate();
    }

    /// The user left `field`.
    pub fn blur(&mut self, field: &str) {
        self.touched.insert(field.to_string());
        self.revalidate();
    }

    /// Inline message for `field`, if it should be shown.
    pub fn visible_error(&self, field: &str) -> Option<&str> {
        if self.submit_attempted || self.touched.contains(field) {
            self.errors.get(field)
        } else {
            None
        }
    }

    /// Mark a submit attempt and report whether the values are valid.
    pub fn validate_for_submit(&mut self) -> bool {
        self.submit_attempted = true;
        self.touched
            .extend(self.schema.fields().map(|f| f.name().to_string()));
        self.revalidate();
        self.errors.is_empty()
    }

    /// Replace the initial values (e.g. once the entity has loaded) and start over.
    pub fn reinitialize(&mut self, initial: FormValues) {
        self.initial = initial;
        self.reset();
    }

    /// Back to the initial values with nothing touched.
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.touched.clear();
        self.submit_attempted = false;
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.errors = self.schema.validate(&self.values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldSchema;

    fn form() -> FormState {
        let schema = FormSchema::new()
            .field(FieldSchema::new("username").required("Username is required."))
            .field(FieldSchema::new("email").required("Email is required.").email("Invalid email format"));
        let initial = [("username", ""), ("email", "")].into_iter().collect();
        FormState::new(schema, initial)
    }

    #[test]
    fn errors_hidden_until_touched() {
        let mut form = form();
        assert_eq!(form.errors().len(), 2);
        assert_eq!(form.visible_error("username"), None);

        form.blur("username");
        assert_eq!(form.visible_error("username"), Some("Username is required."));
        assert_eq!(form.visible_error("email"), None);
    }

    #[test]
    fn submit_attempt_reveals_every_error() {
        let mut form = form();
        assert!(!form.validate_for_submit());
        assert_eq!(form.visible_error("email"), Some("Email is required."));
        assert!(form.is_touched("email"));
    }

    #[test]
    fn editing_clears_the_error() {
        let mut form = form();
        form.blur("email");
        form.set_value("email", "nope");
        assert_eq!(form.visible_error("email"), Some("Invalid email format"));
        form.set_value("email", "a@b.co");
        assert_eq!(form.visible_error("email"), None);
        assert!(form.is_dirty());
    }

    #[test]
    fn reinitialize_then_reset_returns_to_loaded_values() {
        let mut form = form();
        form.reinitialize([("username", "alice"), ("email", "a@b.co")].into_iter().collect());
        assert!(!form.is_dirty());

        form.set_value("username", "bob");
        form.validate_for_submit();
        form.reset();

        assert_eq!(form.value("username"), "alice");
        assert!(!form.submit_attempted());
        assert!(!form.is_touched("username"));
        assert!(form.errors().is_empty());
    }
}
