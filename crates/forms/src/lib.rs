//! `elite-forms` — entity form state and the user add/edit controller.
//!
//! Rendering is left to the caller. This crate owns what a form page decides:
//! which values are current, which fields were touched, which inline errors
//! are visible, and what happens on submit.

pub mod schema;
pub mod state;
pub mod user_form;

pub use schema::{FieldErrors, FieldSchema, FormSchema, FormValues, Rule};
pub use state::FormState;
pub use user_form::{
    FormMode, LoadReport, LoadStatus, Notification, SelectOption, SubmitOutcome, UserField,
    UserFormController,
};
