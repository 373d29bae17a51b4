//! Enumeration member sets.

use crate::error::{ValueError, ValueResult};
use crate::value::EnumValue;

/// An ordered set of enum members.
///
/// Member texts are non-empty and unique, and so are member integers, so a
/// member can be resolved from either half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSet {
    members: Vec<EnumValue>,
}

impl EnumSet {
    /// Builds a set from `(text, value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidArgument`] if the set is empty, a text is
    /// empty, or a text or integer appears twice.
    pub fn new<I, S>(pairs: I) -> ValueResult<Self>
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        let mut members: Vec<EnumValue> = Vec::new();
        for (text, value) in pairs {
            let text = text.into();
            if text.is_empty() {
                return Err(ValueError::invalid_argument("enum member text is empty"));
            }
            if members.iter().any(|m| m.text() == text) {
                return Err(ValueError::invalid_argument(format!(
                    "duplicate enum text: {text}"
                )));
            }
            if members.iter().any(|m| m.value() == value) {
                return Err(ValueError::invalid_argument(format!(
                    "duplicate enum value: {value}"
                )));
            }
            members.push(EnumValue::new(value, text));
        }
        if members.is_empty() {
            return Err(ValueError::invalid_argument("enum set is empty"));
        }
        Ok(Self { members })
    }

    /// Finds the member with integer `value`.
    #[must_use]
    pub fn by_value(&self, value: i32) -> Option<&EnumValue> {
        self.members.iter().find(|m| m.value() == value)
    }

    /// Finds the member with text `text`.
    #[must_use]
    pub fn by_text(&self, text: &str) -> Option<&EnumValue> {
        self.members.iter().find(|m| m.text() == text)
    }

    /// Returns true if `member` is in this set with the same integer and text.
    #[must_use]
    pub fn contains(&self, member: &EnumValue) -> bool {
        self.by_value(member.value()) == Some(member)
    }

    /// Iterates over the members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &EnumValue> {
        self.members.iter()
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; an enum set has at least one member.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
