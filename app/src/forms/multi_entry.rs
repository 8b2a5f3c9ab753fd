//! Hand-managed list of name/email rows.
//!
//! No validation: submit hands over whatever was typed.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use todo_forms_runtime::telemetry::FormMetrics;

const FORM: &str = "multiple_entry";

/// One row of the form
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Name column
    pub name: String,
    /// Email column
    pub email: String,
}

/// Errors from editing rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EntryError {
    /// No row at the index
    #[error("no entry at index {index} (len {len})")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of rows
        len: usize,
    },
}

/// The form's rows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultipleEntryForm {
    entries: Vec<Entry>,
}

impl Default for MultipleEntryForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipleEntryForm {
    /// Form with one empty row
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: vec![Entry::default()],
        }
    }

    /// Append an empty row
    pub fn add_entry(&mut self) {
        self.entries.push(Entry::default());
    }

    /// Remove the row at `index`; any row may go, including the last one
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::OutOfRange`] if there is no such row.
    pub fn remove_entry(&mut self, index: usize) -> Result<Entry, EntryError> {
        self.check(index)?;
        Ok(self.entries.remove(index))
    }

    /// Set the name of row `index`
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::OutOfRange`] if there is no such row.
    pub fn set_name(&mut self, index: usize, name: impl Into<String>) -> Result<(), EntryError> {
        self.check(index)?;
        self.entries[index].name = name.into();
        Ok(())
    }

    /// Set the email of row `index`
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::OutOfRange`] if there is no such row.
    pub fn set_email(&mut self, index: usize, email: impl Into<String>) -> Result<(), EntryError> {
        self.check(index)?;
        self.entries[index].email = email.into();
        Ok(())
    }

    /// Hand the rows to `on_submit`
    pub fn submit<F>(&self, on_submit: F)
    where
        F: FnOnce(&[Entry]),
    {
        tracing::info!(entries = ?self.entries, "Multiple entry form submitted");
        FormMetrics::record_submitted(FORM);
        on_submit(&self.entries);
    }

    /// Current rows
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    const fn check(&self, index: usize) -> Result<(), EntryError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(EntryError::OutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }
}
