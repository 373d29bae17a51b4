//! Fixed-length value sequences.

use crate::error::{ValueError, ValueResult};
use crate::value::Value;
use std::ops::Index;

/// A fixed-length sequence of [`Value`]s, one per field of a record.
///
/// The length is chosen at construction and never changes. Indexed access
/// through [`ValueSet::at`] is bounds-checked and reports an error instead
/// of panicking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueSet {
    values: Box<[Value]>,
}

impl ValueSet {
    /// Creates a set of `len` empty values.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![Value::new(); len].into_boxed_slice(),
        }
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the set has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn out_of_range(&self, index: usize) -> ValueError {
        ValueError::IndexOutOfRange {
            index,
            len: self.values.len(),
        }
    }

    /// Returns the value at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::IndexOutOfRange`] if `index >= len()`.
    pub fn at(&self, index: usize) -> ValueResult<&Value> {
        self.values.get(index).ok_or_else(|| self.out_of_range(index))
    }

    /// Returns the value at `index` for in-place modification.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::IndexOutOfRange`] if `index >= len()`.
    pub fn at_mut(&mut self, index: usize) -> ValueResult<&mut Value> {
        let len = self.values.len();
        self.values
            .get_mut(index)
            .ok_or(ValueError::IndexOutOfRange { index, len })
    }

    /// Replaces the value at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::IndexOutOfRange`] if `index >= len()`.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> ValueResult<()> {
        *self.at_mut(index)? = value.into();
        Ok(())
    }

    /// Iterates over the values in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Returns the values as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the set and returns its values.
    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        self.values.into_vec()
    }
}

/// Unchecked positional access.
///
/// # Panics
///
/// Panics if `index >= len()`. Use [`ValueSet::at`] for a checked lookup.
impl Index<usize> for ValueSet {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

impl From<Vec<Value>> for ValueSet {
    fn from(values: Vec<Value>) -> Self {
        Self {
            values: values.into_boxed_slice(),
        }
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
