//! Library-style form whose state lives behind a reducer.
//!
//! The form is configured with its fields and their rules; every edit is a
//! [`FormAction`] run through [`FormReducer`]. On a valid submit the values
//! go to the parent's handler.

use crate::forms::contact_form::email_pattern;
use crate::forms::validation::{FieldErrors, FieldName, FieldRules};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use todo_forms_core::{SmallVec, effect::Effect, reducer::Reducer};
use todo_forms_macros::Action;
use todo_forms_runtime::telemetry::FormMetrics;

const FORM: &str = "redux";

/// Submitted field values, by field name
pub type FormValues = BTreeMap<String, String>;

/// Edits to the form
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormAction {
    /// Command: a field's value changed
    #[command]
    Change {
        /// Field name
        field: String,
        /// New value
        value: String,
    },

    /// Command: a field lost focus
    #[command]
    Blur {
        /// Field name
        field: String,
    },

    /// Command: validate everything for submission
    #[command]
    Submit,

    /// Event: the submit handler accepted the values
    #[event]
    SubmitSucceeded,

    /// Command: back to the initial values
    #[command]
    Reset,
}

/// The form's local state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormState {
    /// Current values; every configured field has an entry
    pub values: FormValues,
    /// Fields that have lost focus at least once
    pub touched: BTreeSet<String>,
    /// Errors from the last validation
    pub errors: FieldErrors,
    /// Number of submit attempts
    pub submit_count: u32,
    /// The last submit reached the handler
    pub submitted: bool,
}

/// A configured field
#[derive(Clone, Debug)]
pub struct FormField {
    /// Field name
    pub name: String,
    /// Field rules
    pub rules: FieldRules,
}

/// Reducer owning a [`FormState`]
#[derive(Clone, Debug)]
pub struct FormReducer {
    fields: Arc<[FormField]>,
}

impl FormReducer {
    /// Reducer for `fields`
    #[must_use]
    pub fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields: fields.into(),
        }
    }

    /// State with every configured field empty
    #[must_use]
    pub fn initial_state(&self) -> FormState {
        FormState {
            values: self
                .fields
                .iter()
                .map(|field| (field.name.clone(), String::new()))
                .collect(),
            ..FormState::default()
        }
    }

    fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }

    fn validate_field(field: &FormField, state: &mut FormState) {
        let value = state.values.get(&field.name).map_or("", String::as_str);
        let result = field.rules.check(value);
        state.errors.set(FieldName::named(field.name.clone()), result);
    }
}

impl Reducer for FormReducer {
    type State = FormState;
    type Action = FormAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            FormAction::Change { field, value } => {
                let Some(config) = self.field(&field) else {
                    tracing::debug!(%field, "Change for unregistered field ignored");
                    return SmallVec::new();
                };
                state.values.insert(field, value);
                state.submitted = false;
                if state.submit_count > 0 {
                    Self::validate_field(config, state);
                }
            },
            FormAction::Blur { field } => {
                if self.field(&field).is_some() {
                    state.touched.insert(field);
                }
            },
            FormAction::Submit => {
                state.submit_count += 1;
                state.submitted = false;
                state.touched = self.fields.iter().map(|f| f.name.clone()).collect();
                state.errors.clear();
                for field in self.fields.iter() {
                    Self::validate_field(field, state);
                }
            },
            FormAction::SubmitSucceeded => {
                state.submitted = true;
            },
            FormAction::Reset => {
                *state = self.initial_state();
            },
        }

        SmallVec::new()
    }
}

/// A form driven by [`FormReducer`]
#[derive(Clone, Debug)]
pub struct ReduxForm {
    reducer: FormReducer,
    state: FormState,
}

impl ReduxForm {
    /// Form over `fields`
    #[must_use]
    pub fn new(fields: Vec<FormField>) -> Self {
        let reducer = FormReducer::new(fields);
        let state = reducer.initial_state();
        Self { reducer, state }
    }

    /// The demo form: first name, last name and email
    #[must_use]
    pub fn contact() -> Self {
        Self::new(vec![
            FormField {
                name: "firstName".to_string(),
                rules: FieldRules::new(),
            },
            FormField {
                name: "lastName".to_string(),
                rules: FieldRules::new(),
            },
            FormField {
                name: "email".to_string(),
                rules: FieldRules::new().pattern(email_pattern(), "Invalid email format"),
            },
        ])
    }

    /// Run `action` through the reducer
    pub fn dispatch(&mut self, action: FormAction) {
        tracing::trace!(action = action.action_type(), "Form action");
        let _ = self.reducer.reduce(&mut self.state, action, &());
    }

    /// Set a field's value
    pub fn change(&mut self, field: &str, value: impl Into<String>) {
        self.dispatch(FormAction::Change {
            field: field.to_string(),
            value: value.into(),
        });
    }

    /// Mark a field as touched
    pub fn blur(&mut self, field: &str) {
        self.dispatch(FormAction::Blur {
            field: field.to_string(),
        });
    }

    /// Validate and hand the values to `on_submit`
    ///
    /// # Errors
    ///
    /// Returns the field errors when validation fails. `on_submit` is not called.
    pub fn submit<F>(&mut self, on_submit: F) -> Result<(), FieldErrors>
    where
        F: FnOnce(FormValues),
    {
        self.dispatch(FormAction::Submit);

        if !self.state.errors.is_empty() {
            FormMetrics::record_rejected(FORM);
            return Err(self.state.errors.clone());
        }

        FormMetrics::record_submitted(FORM);
        on_submit(self.state.values.clone());
        self.dispatch(FormAction::SubmitSucceeded);
        Ok(())
    }

    /// Back to the initial values
    pub fn reset(&mut self) {
        self.dispatch(FormAction::Reset);
    }

    /// Current form state
    #[must_use]
    pub const fn state(&self) -> &FormState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_forms_testing::{ReducerTest, assertions};

    #[test]
    fn change_updates_registered_fields_only() {
        let reducer = ReduxForm::contact().reducer;
        let initial = reducer.initial_state();

        ReducerTest::new(reducer)
            .with_env(())
            .given_state(initial)
            .when_actions([
                FormAction::Change {
                    field: "firstName".to_string(),
                    value: "Ada".to_string(),
                },
                FormAction::Change {
                    field: "nickname".to_string(),
                    value: "x".to_string(),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.values["firstName"], "Ada");
                assert!(!state.values.contains_key("nickname"));
                assert_eq!(state.values.len(), 3);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn submit_hands_values_to_parent() {
        let mut form = ReduxForm::contact();
        form.change("firstName", "Ada");
        form.change("lastName", "Lovelace");
        form.change("email", "ada@example.org");
        form.blur("email");

        let mut received = None;
        form.submit(|values| received = Some(values)).unwrap();

        let values = received.unwrap();
        assert_eq!(values["lastName"], "Lovelace");
        assert!(form.state().submitted);
        assert_eq!(form.state().submit_count, 1);
        assert!(form.state().touched.contains("email"));
    }

    #[test]
    fn invalid_email_blocks_submit() {
        let mut form = ReduxForm::contact();
        form.change("email", "not-an-email");

        let mut called = false;
        let errors = form.submit(|_| called = true).unwrap_err();

        assert!(!called);
        assert!(!form.state().submitted);
        assert_eq!(
            errors.get(&FieldName::named("email")),
            Some("Invalid email format")
        );

        form.change("email", "ada@example.org");
        assert!(form.state().errors.is_empty());
    }

    #[test]
    fn empty_optional_fields_pass() {
        let mut form = ReduxForm::contact();
        assert!(form.submit(|_| {}).is_ok());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut form = ReduxForm::contact();
        form.change("firstName", "Ada");
        form.submit(|_| {}).unwrap();

        form.reset();

        assert_eq!(*form.state(), form.reducer.initial_state());
    }

    #[test]
    fn action_tags() {
        assert_eq!(FormAction::SubmitSucceeded.action_type(), "SUBMIT_SUCCEEDED");
        assert!(FormAction::SubmitSucceeded.is_event());
        assert_eq!(
            serde_json::to_value(FormAction::Blur {
                field: "email".to_string()
            })
            .unwrap()["type"],
            "BLUR"
        );
    }
}
