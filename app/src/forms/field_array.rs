//! A dynamically sized group of sub-fields edited as a unit.

use thiserror::Error;

/// Stable identity of a field array entry
///
/// Keys survive removals of other entries, so a view can keep per-entry
/// widgets attached to the right row while indices shift.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey(u64);

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "field-{}", self.0)
    }
}

/// Errors from removing field array entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldArrayError {
    /// The first entry is always present
    #[error("the first entry cannot be removed")]
    FirstEntryLocked,

    /// No entry at the index
    #[error("no entry at index {index} (len {len})")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of entries
        len: usize,
    },
}

/// Ordered entries that always contain at least one element
#[derive(Clone, Debug)]
pub struct FieldArray<T> {
    entries: Vec<(FieldKey, T)>,
    next_key: u64,
}

impl<T> FieldArray<T> {
    /// Creates an array holding only `first`
    pub fn new(first: T) -> Self {
        Self {
            entries: vec![(FieldKey(0), first)],
            next_key: 1,
        }
    }

    /// Appends an entry, returning its key
    pub fn append(&mut self, value: T) -> FieldKey {
        let key = FieldKey(self.next_key);
        self.next_key += 1;
        self.entries.push((key, value));
        key
    }

    /// Returns true if the entry at `index` may be removed
    #[must_use]
    pub fn can_remove(&self, index: usize) -> bool {
        index > 0 && index < self.entries.len()
    }

    /// Removes and returns the entry at `index`
    ///
    /// # Errors
    ///
    /// - [`FieldArrayError::FirstEntryLocked`] for index 0
    /// - [`FieldArrayError::OutOfRange`] past the last entry
    pub fn remove(&mut self, index: usize) -> Result<T, FieldArrayError> {
        if index >= self.entries.len() {
            return Err(FieldArrayError::OutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        if index == 0 {
            return Err(FieldArrayError::FirstEntryLocked);
        }
        Ok(self.entries.remove(index).1)
    }

    /// Number of entries, never zero
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|(_, value)| value)
    }

    /// Mutable entry at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).map(|(_, value)| value)
    }

    /// Key of the entry at `index`
    #[must_use]
    pub fn key(&self, index: usize) -> Option<FieldKey> {
        self.entries.get(index).map(|(key, _)| *key)
    }

    /// Current index of the entry with `key`
    #[must_use]
    pub fn position(&self, key: FieldKey) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    /// Entries in order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Keys and entries in order
    pub fn entries(&self) -> impl Iterator<Item = (FieldKey, &T)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }
}

impl<T: Clone> FieldArray<T> {
    /// Clones the entries out, in order
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T: Default> Default for FieldArray<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
