//! Runtime-typed value.

use crate::convert;
use crate::enum_set::EnumSet;
use crate::error::{ValueError, ValueResult};
use std::cmp::Ordering;
use std::fmt;

/// The type tag of a [`Value`], also used to declare field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    /// No value.
    #[default]
    Empty,
    /// A primary key in the representation the backend chose.
    PrimaryKey,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// UTF-8 text.
    Text,
    /// Enumeration member (integer + text resolved against an [`EnumSet`]).
    Enum,
    /// Untyped scalar. As a field type, accepts any non-empty value.
    Any,
    /// Optimistic-concurrency revision marker.
    Revision,
}

impl ValueType {
    /// Returns the lowercase name of this type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::PrimaryKey => "primary_key",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Text => "text",
            Self::Enum => "enum",
            Self::Any => "any",
            Self::Revision => "revision",
        }
    }

    /// Returns true for the four fixed-width integer types.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int32 | Self::UInt32 | Self::Int64 | Self::UInt64)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A backend-chosen scalar, carried by primary-key, any and revision values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Text.
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::UInt(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        Self::UInt(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A member of an [`EnumSet`]: an integer and its text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    value: i32,
    text: String,
}

impl EnumValue {
    /// Creates an enum member.
    pub fn new(value: i32, text: impl Into<String>) -> Self {
        Self {
            value,
            text: text.into(),
        }
    }

    /// Returns the integer of this member.
    #[must_use]
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Returns the text of this member.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The tagged payload of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Datum {
    /// No value.
    #[default]
    Empty,
    /// A primary key.
    PrimaryKey(Scalar),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// Owned UTF-8 text.
    Text(String),
    /// Enumeration member.
    Enum(EnumValue),
    /// Untyped scalar.
    Any(Scalar),
    /// Revision marker.
    Revision(Scalar),
}

/// A single typed datum exchanged with a backend.
///
/// A value carries exactly one [`Datum`] plus a primary-key flag. The flag is
/// independent of the tag: an `Int64` value read from a key column is still
/// an `Int64`, it is just also marked as the row's primary key.
///
/// Cloning a value deep-copies any owned text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Value {
    datum: Datum,
    primary_key: bool,
}

impl Value {
    /// Creates an empty value.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a signed 32-bit value.
    #[must_use]
    pub fn int32(n: i32) -> Self {
        Datum::Int32(n).into()
    }

    /// Creates an unsigned 32-bit value.
    #[must_use]
    pub fn uint32(n: u32) -> Self {
        Datum::UInt32(n).into()
    }

    /// Creates a signed 64-bit value.
    #[must_use]
    pub fn int64(n: i64) -> Self {
        Datum::Int64(n).into()
    }

    /// Creates an unsigned 64-bit value.
    #[must_use]
    pub fn uint64(n: u64) -> Self {
        Datum::UInt64(n).into()
    }

    /// Creates a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Datum::Text(s.into()).into()
    }

    /// Creates an enum value from an already resolved member.
    #[must_use]
    pub fn enumeration(member: EnumValue) -> Self {
        Datum::Enum(member).into()
    }

    /// Creates a primary-key value. The primary-key flag is set as well.
    pub fn primary_key(key: impl Into<Scalar>) -> Self {
        Self {
            datum: Datum::PrimaryKey(key.into()),
            primary_key: true,
        }
    }

    /// Creates an untyped value.
    pub fn any(scalar: impl Into<Scalar>) -> Self {
        Datum::Any(scalar.into()).into()
    }

    /// Creates a revision value.
    pub fn revision(scalar: impl Into<Scalar>) -> Self {
        Datum::Revision(scalar.into()).into()
    }

    /// Returns the payload of this value.
    #[must_use]
    pub fn datum(&self) -> &Datum {
        &self.datum
    }

    /// Returns the type tag of this value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self.datum {
            Datum::Empty => ValueType::Empty,
            Datum::PrimaryKey(_) => ValueType::PrimaryKey,
            Datum::Int32(_) => ValueType::Int32,
            Datum::UInt32(_) => ValueType::UInt32,
            Datum::Int64(_) => ValueType::Int64,
            Datum::UInt64(_) => ValueType::UInt64,
            Datum::Text(_) => ValueType::Text,
            Datum::Enum(_) => ValueType::Enum,
            Datum::Any(_) => ValueType::Any,
            Datum::Revision(_) => ValueType::Revision,
        }
    }

    /// Returns true if this value holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.datum, Datum::Empty)
    }

    /// Returns true if this value holds something.
    #[must_use]
    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    /// Clears the payload and the primary-key flag.
    pub fn reset(&mut self) {
        self.datum = Datum::Empty;
        self.primary_key = false;
    }

    /// Marks this value as the primary key of its row.
    pub fn mark_primary_key(&mut self) {
        self.primary_key = true;
    }

    /// Returns true if this value is marked as a primary key.
    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    // Setters replace the payload in place and leave the primary-key flag alone.

    /// Sets a signed 32-bit payload.
    pub fn set_int32(&mut self, n: i32) {
        self.datum = Datum::Int32(n);
    }

    /// Sets an unsigned 32-bit payload.
    pub fn set_uint32(&mut self, n: u32) {
        self.datum = Datum::UInt32(n);
    }

    /// Sets a signed 64-bit payload.
    pub fn set_int64(&mut self, n: i64) {
        self.datum = Datum::Int64(n);
    }

    /// Sets an unsigned 64-bit payload.
    pub fn set_uint64(&mut self, n: u64) {
        self.datum = Datum::UInt64(n);
    }

    /// Sets a text payload, copying `text`.
    pub fn set_text(&mut self, text: &str) {
        self.datum = Datum::Text(text.to_string());
    }

    /// Sets a text payload from the first `len` bytes of `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if `len` exceeds the text or does not fall on a
    /// character boundary. The value is unchanged on error.
    pub fn set_text_len(&mut self, text: &str, len: usize) -> ValueResult<()> {
        let prefix = text.get(..len).ok_or_else(|| {
            ValueError::invalid_argument(format!(
                "length {len} is not a character boundary of a {}-byte text",
                text.len()
            ))
        })?;
        self.datum = Datum::Text(prefix.to_string());
        Ok(())
    }

    /// Sets an enum payload by integer, resolving its text in `set`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::EnumNotInSet`] if `set` has no such member.
    pub fn set_enum_value(&mut self, value: i32, set: &EnumSet) -> ValueResult<()> {
        let member = set
            .by_value(value)
            .ok_or_else(|| ValueError::not_in_set(value.to_string()))?;
        self.datum = Datum::Enum(member.clone());
        Ok(())
    }

    /// Sets an enum payload by text, resolving its integer in `set`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::EnumNotInSet`] if `set` has no such member.
    pub fn set_enum_text(&mut self, text: &str, set: &EnumSet) -> ValueResult<()> {
        let member = set.by_text(text).ok_or_else(|| ValueError::not_in_set(text))?;
        self.datum = Datum::Enum(member.clone());
        Ok(())
    }

    /// Sets a primary-key payload and marks the value as a primary key.
    pub fn set_primary_key(&mut self, key: impl Into<Scalar>) {
        self.datum = Datum::PrimaryKey(key.into());
        self.primary_key = true;
    }

    /// Sets an untyped payload.
    pub fn set_any(&mut self, scalar: impl Into<Scalar>) {
        self.datum = Datum::Any(scalar.into());
    }

    /// Sets a revision payload.
    pub fn set_revision(&mut self, scalar: impl Into<Scalar>) {
        self.datum = Datum::Revision(scalar.into());
    }

    /// Returns the payload if this is an `Int32` value.
    #[must_use]
    pub fn as_int32(&self) -> Option<i32> {
        match self.datum {
            Datum::Int32(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the payload if this is a `UInt32` value.
    #[must_use]
    pub fn as_uint32(&self) -> Option<u32> {
        match self.datum {
            Datum::UInt32(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the payload if this is an `Int64` value.
    #[must_use]
    pub fn as_int64(&self) -> Option<i64> {
        match self.datum {
            Datum::Int64(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the payload if this is a `UInt64` value.
    #[must_use]
    pub fn as_uint64(&self) -> Option<u64> {
        match self.datum {
            Datum::UInt64(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the payload if this is a `Text` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.datum {
            Datum::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the member if this is an `Enum` value.
    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumValue> {
        match &self.datum {
            Datum::Enum(member) => Some(member),
            _ => None,
        }
    }

    /// Returns the key if this is a `PrimaryKey` value.
    #[must_use]
    pub fn as_primary_key(&self) -> Option<&Scalar> {
        match &self.datum {
            Datum::PrimaryKey(key) => Some(key),
            _ => None,
        }
    }

    /// Returns the scalar if this is an `Any` value.
    #[must_use]
    pub fn as_any(&self) -> Option<&Scalar> {
        match &self.datum {
            Datum::Any(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Returns the scalar if this is a `Revision` value.
    #[must_use]
    pub fn as_revision(&self) -> Option<&Scalar> {
        match &self.datum {
            Datum::Revision(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Converts to `i32`. See [`convert::to_int32`].
    ///
    /// # Errors
    ///
    /// Returns a conversion error if the value is empty, incompatible,
    /// unparseable or out of range.
    pub fn to_int32(&self) -> ValueResult<i32> {
        convert::to_int32(self)
    }

    /// Converts to `u32`. See [`convert::to_uint32`].
    ///
    /// # Errors
    ///
    /// Same as [`Value::to_int32`].
    pub fn to_uint32(&self) -> ValueResult<u32> {
        convert::to_uint32(self)
    }

    /// Converts to `i64`. See [`convert::to_int64`].
    ///
    /// # Errors
    ///
    /// Same as [`Value::to_int32`].
    pub fn to_int64(&self) -> ValueResult<i64> {
        convert::to_int64(self)
    }

    /// Converts to `u64`. See [`convert::to_uint64`].
    ///
    /// # Errors
    ///
    /// Same as [`Value::to_int32`].
    pub fn to_uint64(&self) -> ValueResult<u64> {
        convert::to_uint64(self)
    }

    /// Converts to text. See [`convert::to_text`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty.
    pub fn to_text(&self) -> ValueResult<String> {
        convert::to_text(self)
    }

    /// Compares two values. See [`convert::compare`].
    ///
    /// # Errors
    ///
    /// Returns an error if either value is empty or the tags are not
    /// comparable.
    pub fn compare(&self, other: &Self) -> ValueResult<Ordering> {
        convert::compare(self, other)
    }
}

impl From<Datum> for Value {
    fn from(datum: Datum) -> Self {
        Self {
            datum,
            primary_key: false,
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::int32(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::uint32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::int64(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::uint64(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::text(s)
    }
}

impl From<EnumValue> for Value {
    fn from(member: EnumValue) -> Self {
        Self::enumeration(member)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.datum {
            Datum::Empty => f.write_str("(empty)"),
            Datum::Int32(n) => write!(f, "{n}"),
            Datum::UInt32(n) => write!(f, "{n}"),
            Datum::Int64(n) => write!(f, "{n}"),
            Datum::UInt64(n) => write!(f, "{n}"),
            Datum::Text(s) => f.write_str(s),
            Datum::Enum(member) => f.write_str(member.text()),
            Datum::PrimaryKey(s) | Datum::Any(s) | Datum::Revision(s) => write!(f, "{s}"),
        }
    }
}
