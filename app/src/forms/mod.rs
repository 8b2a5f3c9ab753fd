//! The three form demos.
//!
//! - [`redux_form::ReduxForm`]: form state owned by a reducer, values handed
//!   to the parent's submit handler
//! - [`multi_entry::MultipleEntryForm`]: a hand-managed list of name/email rows
//! - [`contact_form::ContactForm`]: declarative field rules plus a dynamic
//!   phone number array
//!
//! None of them touch the shared store. Validation failures are data
//! ([`validation::FieldErrors`]), never errors.

pub mod contact_form;
pub mod field_array;
pub mod multi_entry;
pub mod redux_form;
pub mod validation;

pub use contact_form::{ContactForm, ContactFormError, ContactValues, PhoneNumber};
pub use field_array::{FieldArray, FieldArrayError, FieldKey};
pub use multi_entry::{Entry, EntryError, MultipleEntryForm};
pub use redux_form::{FormAction, FormField, FormReducer, FormState, FormValues, ReduxForm};
pub use validation::{FieldErrors, FieldName, FieldRules, Rule, ValidationMode};
