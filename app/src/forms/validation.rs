//! Field rules and validation results.
//!
//! A field carries an ordered list of [`Rule`]s. Validation walks them in
//! order and reports the first failure, so a missing value reports the
//! required message rather than a pattern mismatch.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Custom check: `Ok(())` when the value passes, otherwise the message
pub type Check = fn(&str) -> Result<(), &'static str>;

/// Path of a form field
///
/// Ordered the way the contact form lays its fields out, so error listings
/// follow the form top to bottom.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldName {
    /// `username`
    Username,
    /// `channel`
    Channel,
    /// `email`
    Email,
    /// `phNumbers.{index}.number`
    PhoneNumber(usize),
    /// Any other field, by name
    Named(String),
}

impl FieldName {
    /// Field with an arbitrary name
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Username => f.write_str("username"),
            Self::Channel => f.write_str("channel"),
            Self::Email => f.write_str("email"),
            Self::PhoneNumber(index) => write!(f, "phNumbers.{index}.number"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// A single validation rule
#[derive(Clone, Debug)]
pub enum Rule {
    /// The value must not be empty
    Required(&'static str),
    /// The value must match the pattern
    Pattern(Regex, &'static str),
    /// A named custom check
    Validate(&'static str, Check),
}

/// Ordered rules for one field
#[derive(Clone, Debug, Default)]
pub struct FieldRules {
    rules: Vec<Rule>,
}

impl FieldRules {
    /// No rules: every value passes
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Require a non-empty value
    #[must_use]
    pub fn required(mut self, message: &'static str) -> Self {
        self.rules.push(Rule::Required(message));
        self
    }

    /// Require the value to match `pattern`
    #[must_use]
    pub fn pattern(mut self, pattern: Regex, message: &'static str) -> Self {
        self.rules.push(Rule::Pattern(pattern, message));
        self
    }

    /// Add a named custom check
    #[must_use]
    pub fn validate(mut self, name: &'static str, check: Check) -> Self {
        self.rules.push(Rule::Validate(name, check));
        self
    }

    /// The rules in evaluation order
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Check `value`, returning the first failing rule's message
    ///
    /// An empty value only fails `Required`; pattern and custom checks apply
    /// to values that were actually entered.
    #[must_use]
    pub fn check(&self, value: &str) -> Option<&'static str> {
        if value.is_empty() {
            return self.rules.iter().find_map(|rule| match rule {
                Rule::Required(message) => Some(*message),
                Rule::Pattern(..) | Rule::Validate(..) => None,
            });
        }

        self.rules.iter().find_map(|rule| match rule {
            Rule::Required(_) => None,
            Rule::Pattern(pattern, message) => (!pattern.is_match(value)).then_some(*message),
            Rule::Validate(name, check) => check(value).err().inspect(|message| {
                tracing::trace!(rule = *name, reason = *message, "Custom check failed");
            }),
        })
    }
}

/// Per-field error messages, in field order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<FieldName, &'static str>,
}

impl FieldErrors {
    /// No errors
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }

    /// Record `message` for `field`, replacing any earlier one
    pub fn insert(&mut self, field: FieldName, message: &'static str) {
        self.errors.insert(field, message);
    }

    /// Set or clear `field`'s error from a check result
    pub fn set(&mut self, field: FieldName, result: Option<&'static str>) {
        match result {
            Some(message) => self.insert(field, message),
            None => {
                self.errors.remove(&field);
            },
        }
    }

    /// Remove `field`'s error
    pub fn remove(&mut self, field: &FieldName) -> Option<&'static str> {
        self.errors.remove(field)
    }

    /// Message for `field`, if it failed
    #[must_use]
    pub fn get(&self, field: &FieldName) -> Option<&'static str> {
        self.errors.get(field).copied()
    }

    /// Returns true if `field` failed
    #[must_use]
    pub fn contains(&self, field: &FieldName) -> bool {
        self.errors.contains_key(field)
    }

    /// Number of failing fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if every field passed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Drop every error
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Failing fields and their messages, in field order
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &'static str)> {
        self.errors.iter().map(|(field, message)| (field, *message))
    }

    /// Rebuild the map, renaming or dropping fields
    pub(crate) fn rekey(&mut self, mut f: impl FnMut(FieldName) -> Option<FieldName>) {
        self.errors = std::mem::take(&mut self.errors)
            .into_iter()
            .filter_map(|(field, message)| f(field).map(|field| (field, message)))
            .collect();
    }
}

/// When fields are validated besides on submit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationMode {
    /// Only on submit; after a failed submit, edited fields re-validate
    #[default]
    OnSubmit,
    /// When a field loses focus
    OnBlur,
    /// On every edit
    OnChange,
}

impl ValidationMode {
    /// Should an edit re-validate the field?
    #[must_use]
    pub const fn validates_on_change(self, submit_count: u32) -> bool {
        matches!(self, Self::OnChange) || submit_count > 0
    }

    /// Should losing focus validate the field?
    #[must_use]
    pub const fn validates_on_blur(self) -> bool {
        matches!(self, Self::OnBlur)
    }
}

/// Error returned when parsing an unknown validation mode
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown validation mode: {0}")]
pub struct ParseModeError(String);

impl FromStr for ValidationMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "onSubmit" | "on_submit" | "submit" => Ok(Self::OnSubmit),
            "onBlur" | "on_blur" | "blur" => Ok(Self::OnBlur),
            "onChange" | "on_change" | "change" => Ok(Self::OnChange),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits() -> FieldRules {
        FieldRules::new()
            .required("Needed")
            .pattern(Regex::new(r"^\d+$").unwrap(), "Digits only")
            .validate("notZero", |v| if v == "0" { Err("Not zero") } else { Ok(()) })
    }

    #[test]
    fn first_failing_rule_wins() {
        let rules = digits();
        assert_eq!(rules.check(""), Some("Needed"));
        assert_eq!(rules.check("12a"), Some("Digits only"));
        assert_eq!(rules.check("0"), Some("Not zero"));
        assert_eq!(rules.check("42"), None);
    }

    #[test]
    fn empty_optional_value_skips_other_rules() {
        let rules = FieldRules::new().pattern(Regex::new(r"^\d+$").unwrap(), "Digits only");
        assert_eq!(rules.check(""), None);
        assert_eq!(rules.check("x"), Some("Digits only"));
    }

    #[test]
    fn field_paths() {
        assert_eq!(FieldName::Username.to_string(), "username");
        assert_eq!(FieldName::PhoneNumber(2).to_string(), "phNumbers.2.number");
        assert_eq!(FieldName::named("firstName").to_string(), "firstName");
    }

    #[test]
    fn errors_iterate_in_field_order() {
        let mut errors = FieldErrors::new();
        errors.insert(FieldName::PhoneNumber(1), "p1");
        errors.insert(FieldName::Email, "e");
        errors.insert(FieldName::Username, "u");
        errors.insert(FieldName::PhoneNumber(0), "p0");

        let order: Vec<_> = errors.iter().map(|(field, _)| field.to_string()).collect();
        assert_eq!(
            order,
            vec!["username", "email", "phNumbers.0.number", "phNumbers.1.number"]
        );

        errors.set(FieldName::Email, None);
        assert!(!errors.contains(&FieldName::Email));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn rekey_renames_and_drops() {
        let mut errors = FieldErrors::new();
        errors.insert(FieldName::PhoneNumber(0), "a");
        errors.insert(FieldName::PhoneNumber(2), "c");
        errors.insert(FieldName::Username, "u");

        errors.rekey(|field| match field {
            FieldName::PhoneNumber(0) => None,
            FieldName::PhoneNumber(i) => Some(FieldName::PhoneNumber(i - 1)),
            other => Some(other),
        });

        assert_eq!(errors.get(&FieldName::PhoneNumber(1)), Some("c"));
        assert_eq!(errors.get(&FieldName::Username), Some("u"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn validation_modes() {
        assert_eq!("onBlur".parse(), Ok(ValidationMode::OnBlur));
        assert_eq!("change".parse(), Ok(ValidationMode::OnChange));
        assert!("sometimes".parse::<ValidationMode>().is_err());

        assert!(!ValidationMode::OnSubmit.validates_on_change(0));
        assert!(ValidationMode::OnSubmit.validates_on_change(1));
        assert!(ValidationMode::OnChange.validates_on_change(0));
        assert!(ValidationMode::OnBlur.validates_on_blur());
        assert_eq!(ValidationMode::default(), ValidationMode::OnSubmit);
    }
}
