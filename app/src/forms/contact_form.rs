//! Contact form with declarative field rules and a dynamic list of phone numbers.
//!
//! Fields: `username`, `channel`, `email` and `phNumbers.{i}.number`. The
//! phone number list starts with one empty entry; the first entry can never be
//! removed.

use crate::forms::field_array::{FieldArray, FieldArrayError, FieldKey};
use crate::forms::validation::{FieldErrors, FieldName, FieldRules, ValidationMode};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;
use todo_forms_runtime::telemetry::FormMetrics;

const FORM: &str = "contact";

/// Address rejected by the `notAdmin` check
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Domain suffix rejected by the `notBlackListed` check
pub const BLOCKED_DOMAIN: &str = "baddomain.com";

#[allow(clippy::unwrap_used)] // Literal pattern
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

static USERNAME_RULES: LazyLock<FieldRules> =
    LazyLock::new(|| FieldRules::new().required("Username is required"));

static CHANNEL_RULES: LazyLock<FieldRules> =
    LazyLock::new(|| FieldRules::new().required("Channel is required"));

static EMAIL_RULES: LazyLock<FieldRules> = LazyLock::new(|| {
    FieldRules::new()
        .required("Email is required")
        .pattern(EMAIL_PATTERN.clone(), "Invalid email format")
        .validate("notAdmin", not_admin)
        .validate("notBlackListed", not_black_listed)
});

static PHONE_RULES: LazyLock<FieldRules> =
    LazyLock::new(|| FieldRules::new().required("Phone number cannot be empty"));

fn not_admin(value: &str) -> Result<(), &'static str> {
    if value == ADMIN_EMAIL {
        Err("Enter a different email")
    } else {
        Ok(())
    }
}

fn not_black_listed(value: &str) -> Result<(), &'static str> {
    if value.ends_with(BLOCKED_DOMAIN) {
        Err("This domain is not supported")
    } else {
        Ok(())
    }
}

/// The email pattern shared by the form demos
#[must_use]
pub fn email_pattern() -> Regex {
    EMAIL_PATTERN.clone()
}

/// One phone number entry
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    /// The number as typed
    pub number: String,
}

/// Values handed to the submit handler
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactValues {
    /// Login name
    pub username: String,
    /// Contact address
    pub email: String,
    /// Channel name
    pub channel: String,
    /// Phone numbers in entry order
    #[serde(rename = "phNumbers")]
    pub phone_numbers: Vec<PhoneNumber>,
}

/// Errors from editing the contact form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactFormError {
    /// The form has no such field
    #[error("unknown field: {0}")]
    UnknownField(FieldName),

    /// Phone number list rejected the operation
    #[error(transparent)]
    PhoneNumbers(#[from] FieldArrayError),
}

/// The contact form's local state
#[derive(Clone, Debug)]
pub struct ContactForm {
    username: String,
    email: String,
    channel: String,
    phone_numbers: FieldArray<PhoneNumber>,
    errors: FieldErrors,
    mode: ValidationMode,
    submit_count: u32,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::new(ValidationMode::default())
    }
}

impl ContactForm {
    /// Empty form with one empty phone number
    #[must_use]
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            channel: String::new(),
            phone_numbers: FieldArray::default(),
            errors: FieldErrors::new(),
            mode,
            submit_count: 0,
        }
    }

    /// Rules for `field`, or `None` if the form has no such field
    fn rules(&self, field: &FieldName) -> Option<&'static FieldRules> {
        match field {
            FieldName::Username => Some(&*USERNAME_RULES),
            FieldName::Channel => Some(&*CHANNEL_RULES),
            FieldName::Email => Some(&*EMAIL_RULES),
            FieldName::PhoneNumber(index) if *index < self.phone_numbers.len() => {
                Some(&*PHONE_RULES)
            },
            FieldName::PhoneNumber(_) | FieldName::Named(_) => None,
        }
    }

    /// Current value of `field`
    #[must_use]
    pub fn value(&self, field: &FieldName) -> Option<&str> {
        match field {
            FieldName::Username => Some(&self.username),
            FieldName::Channel => Some(&self.channel),
            FieldName::Email => Some(&self.email),
            FieldName::PhoneNumber(index) => self
                .phone_numbers
                .get(*index)
                .map(|phone| phone.number.as_str()),
            FieldName::Named(_) => None,
        }
    }

    /// Type into `field`
    ///
    /// # Errors
    ///
    /// Returns [`ContactFormError::UnknownField`] if the form has no such field.
    pub fn set_value(
        &mut self,
        field: &FieldName,
        value: impl Into<String>,
    ) -> Result<(), ContactFormError> {
        let value = value.into();
        let slot = match field {
            FieldName::Username => &mut self.username,
            FieldName::Channel => &mut self.channel,
            FieldName::Email => &mut self.email,
            FieldName::PhoneNumber(index) => match self.phone_numbers.get_mut(*index) {
                Some(phone) => &mut phone.number,
                None => return Err(ContactFormError::UnknownField(field.clone())),
            },
            FieldName::Named(_) => return Err(ContactFormError::UnknownField(field.clone())),
        };
        *slot = value;

        if self.mode.validates_on_change(self.submit_count) {
            self.validate_field(field);
        }
        Ok(())
    }

    /// Field lost focus
    ///
    /// # Errors
    ///
    /// Returns [`ContactFormError::UnknownField`] if the form has no such field.
    pub fn blur(&mut self, field: &FieldName) -> Result<(), ContactFormError> {
        if self.rules(field).is_none() {
            return Err(ContactFormError::UnknownField(field.clone()));
        }
        if self.mode.validates_on_blur() {
            self.validate_field(field);
        }
        Ok(())
    }

    /// Append an empty phone number, returning its key
    pub fn add_phone_number(&mut self) -> FieldKey {
        self.phone_numbers.append(PhoneNumber::default())
    }

    /// Remove the phone number at `index`
    ///
    /// Errors recorded for later entries move down with them.
    ///
    /// # Errors
    ///
    /// Returns [`ContactFormError::PhoneNumbers`] for index 0 or an index past
    /// the last entry.
    pub fn remove_phone_number(&mut self, index: usize) -> Result<PhoneNumber, ContactFormError> {
        let removed = self.phone_numbers.remove(index)?;

        self.errors.rekey(|field| match field {
            FieldName::PhoneNumber(i) if i == index => None,
            FieldName::PhoneNumber(i) if i > index => Some(FieldName::PhoneNumber(i - 1)),
            other => Some(other),
        });

        Ok(removed)
    }

    /// Returns true if the remove control is offered for `index`
    #[must_use]
    pub fn can_remove_phone_number(&self, index: usize) -> bool {
        self.phone_numbers.can_remove(index)
    }

    /// Phone number entries with their keys
    pub fn phone_numbers(&self) -> impl Iterator<Item = (FieldKey, &PhoneNumber)> {
        self.phone_numbers.entries()
    }

    fn validate_field(&mut self, field: &FieldName) {
        let result = match (self.rules(field), self.value(field)) {
            (Some(rules), Some(value)) => rules.check(value),
            _ => None,
        };
        self.errors.set(field.clone(), result);
    }

    fn fields(&self) -> Vec<FieldName> {
        let phones = (0..self.phone_numbers.len()).map(FieldName::PhoneNumber);
        [FieldName::Username, FieldName::Channel, FieldName::Email]
            .into_iter()
            .chain(phones)
            .collect()
    }

    /// Validate every field, replacing the recorded errors
    ///
    /// Returns true if every field passed.
    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        for field in self.fields() {
            self.validate_field(&field);
        }
        self.errors.is_empty()
    }

    /// Submit the form
    ///
    /// Validates every field; only when all pass is `on_valid` called with the
    /// values.
    ///
    /// # Errors
    ///
    /// Returns the field errors when validation fails. `on_valid` is not called.
    pub fn submit<F>(&mut self, on_valid: F) -> Result<(), FieldErrors>
    where
        F: FnOnce(ContactValues),
    {
        self.submit_count += 1;

        if !self.validate() {
            tracing::debug!(errors = self.errors.len(), "Contact form rejected");
            FormMetrics::record_rejected(FORM);
            return Err(self.errors.clone());
        }

        let values = self.values();
        tracing::info!(?values, "Form submitted with data");
        FormMetrics::record_submitted(FORM);
        on_valid(values);
        Ok(())
    }

    /// Current values
    #[must_use]
    pub fn values(&self) -> ContactValues {
        ContactValues {
            username: self.username.clone(),
            email: self.email.clone(),
            channel: self.channel.clone(),
            phone_numbers: self.phone_numbers.to_vec(),
        }
    }

    /// Errors from the last validation
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Number of submit attempts
    #[must_use]
    pub const fn submit_count(&self) -> u32 {
        self.submit_count
    }

    /// Validation mode
    #[must_use]
    pub const fn mode(&self) -> ValidationMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use todo_forms_testing::properties;

    fn filled() -> ContactForm {
        let mut form = ContactForm::default();
        form.set_value(&FieldName::Username, "bret").unwrap();
        form.set_value(&FieldName::Channel, "news").unwrap();
        form.set_value(&FieldName::Email, "user@gooddomain.com").unwrap();
        form.set_value(&FieldName::PhoneNumber(0), "9876543210").unwrap();
        form
    }

    fn email_error(email: &str) -> Option<&'static str> {
        EMAIL_RULES.check(email)
    }

    #[test]
    fn email_rules() {
        assert_eq!(email_error(""), Some("Email is required"));
        assert_eq!(email_error("not-an-email"), Some("Invalid email format"));
        assert_eq!(email_error("admin@example.com"), Some("Enter a different email"));
        assert_eq!(email_error("user@baddomain.com"), Some("This domain is not supported"));
        assert_eq!(email_error("user@gooddomain.com"), None);
    }

    #[test]
    fn empty_username_blocks_submit() {
        let mut form = filled();
        form.set_value(&FieldName::Username, "").unwrap();

        let mut called = false;
        let result = form.submit(|_| called = true);

        let errors = result.unwrap_err();
        assert_eq!(errors.get(&FieldName::Username), Some("Username is required"));
        assert_eq!(errors.len(), 1);
        assert!(!called);
        assert_eq!(form.submit_count(), 1);
    }

    #[test]
    fn blank_form_reports_every_required_field() {
        let mut form = ContactForm::default();
        form.add_phone_number();

        let errors = form.submit(|_| {}).unwrap_err();

        let listed: Vec<_> = errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        assert_eq!(
            listed,
            vec![
                "username: Username is required",
                "channel: Channel is required",
                "email: Email is required",
                "phNumbers.0.number: Phone number cannot be empty",
                "phNumbers.1.number: Phone number cannot be empty",
            ]
        );
    }

    #[test]
    fn valid_submit_hands_values_to_handler() {
        let mut form = filled();
        form.add_phone_number();
        form.set_value(&FieldName::PhoneNumber(1), "8123456789").unwrap();

        let mut received = None;
        form.submit(|values| received = Some(values)).unwrap();

        let values = received.unwrap();
        assert_eq!(values.username, "bret");
        assert_eq!(
            values.phone_numbers,
            vec![
                PhoneNumber {
                    number: "9876543210".to_string()
                },
                PhoneNumber {
                    number: "8123456789".to_string()
                },
            ]
        );
        assert!(form.errors().is_empty());
        assert_eq!(
            serde_json::to_value(&values).unwrap()["phNumbers"][1]["number"],
            "8123456789"
        );
    }

    #[test]
    fn phone_numbers_are_not_format_checked() {
        let mut form = filled();
        form.set_value(&FieldName::PhoneNumber(0), "call me").unwrap();
        assert!(form.submit(|_| {}).is_ok());
    }

    #[test]
    fn edits_revalidate_after_failed_submit() {
        let mut form = ContactForm::default();
        form.set_value(&FieldName::Email, "admin@example.com").unwrap();
        assert!(form.errors().is_empty());

        assert!(form.submit(|_| {}).is_err());
        assert_eq!(form.errors().get(&FieldName::Email), Some("Enter a different email"));

        form.set_value(&FieldName::Email, "user@gooddomain.com").unwrap();
        assert!(!form.errors().contains(&FieldName::Email));
        assert!(form.errors().contains(&FieldName::Username));
    }

    #[test]
    fn on_change_mode_validates_immediately() {
        let mut form = ContactForm::new(ValidationMode::OnChange);
        form.set_value(&FieldName::Email, "nope").unwrap();
        assert_eq!(form.errors().get(&FieldName::Email), Some("Invalid email format"));
    }

    #[test]
    fn on_blur_mode_validates_on_blur_only() {
        let mut form = ContactForm::new(ValidationMode::OnBlur);
        form.set_value(&FieldName::Channel, "").unwrap();
        assert!(form.errors().is_empty());

        form.blur(&FieldName::Channel).unwrap();
        assert_eq!(form.errors().get(&FieldName::Channel), Some("Channel is required"));
    }

    #[test]
    fn removing_phone_number_shifts_errors() {
        let mut form = filled();
        form.add_phone_number();
        form.add_phone_number();
        form.set_value(&FieldName::PhoneNumber(1), "1").unwrap();
        assert!(form.submit(|_| {}).is_err());
        assert!(form.errors().contains(&FieldName::PhoneNumber(2)));

        let removed = form.remove_phone_number(1).unwrap();
        assert_eq!(removed.number, "1");

        assert!(!form.errors().contains(&FieldName::PhoneNumber(2)));
        assert_eq!(
            form.errors().get(&FieldName::PhoneNumber(1)),
            Some("Phone number cannot be empty")
        );
    }

    #[test]
    fn first_phone_number_cannot_be_removed() {
        let mut form = ContactForm::default();
        assert!(!form.can_remove_phone_number(0));
        assert_eq!(
            form.remove_phone_number(0),
            Err(ContactFormError::PhoneNumbers(FieldArrayError::FirstEntryLocked))
        );
        assert_eq!(form.phone_numbers().count(), 1);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut form = ContactForm::default();
        assert_eq!(
            form.set_value(&FieldName::PhoneNumber(3), "1"),
            Err(ContactFormError::UnknownField(FieldName::PhoneNumber(3)))
        );
        assert!(form.blur(&FieldName::named("firstName")).is_err());
    }

    proptest! {
        #[test]
        fn any_typed_username_clears_required_error(name in properties::non_blank_text()) {
            let mut form = filled();
            form.set_value(&FieldName::Username, "").unwrap();
            let rejected = form.submit(|_| {});
            prop_assert!(rejected.is_err());

            form.set_value(&FieldName::Username, name).unwrap();
            prop_assert!(!form.errors().contains(&FieldName::Username));
            let accepted = form.submit(|_| {});
            prop_assert!(accepted.is_ok());
        }

        #[test]
        fn well_formed_addresses_pass_unless_blocked(email in properties::well_formed_email()) {
            let expected = if email == ADMIN_EMAIL {
                Some("Enter a different email")
            } else if email.ends_with(BLOCKED_DOMAIN) {
                Some("This domain is not supported")
            } else {
                None
            };
            prop_assert_eq!(email_error(&email), expected);
        }

        #[test]
        fn any_blocked_domain_is_rejected(local in "[a-z0-9]{1,10}", sub in "[a-z]{0,5}") {
            let email = format!("{local}@{sub}{BLOCKED_DOMAIN}");
            prop_assert_eq!(email_error(&email), Some("This domain is not supported"));
        }
    }
}
