//! Object schema: fields and field lists.

use crate::convert;
use crate::enum_set::EnumSet;
use crate::error::{ValueError, ValueResult};
use crate::value::{Value, ValueType};
use crate::value_set::ValueSet;

/// One named, typed column of an object.
///
/// A field is "not empty" when it has a name and a type other than
/// [`ValueType::Empty`]. Enum fields carry the [`EnumSet`] their values are
/// checked against; other fields carry none.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Field {
    name: String,
    value_type: ValueType,
    enum_set: Option<EnumSet>,
}

impl Field {
    /// Creates a non-enum field.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidArgument`] if the name is empty, the type
    /// is [`ValueType::Empty`], or the type is [`ValueType::Enum`] (use
    /// [`Field::enumeration`] instead).
    pub fn new(name: impl Into<String>, value_type: ValueType) -> ValueResult<Self> {
        let field = Self {
            name: name.into(),
            value_type,
            enum_set: None,
        };
        field.validate()?;
        Ok(field)
    }

    /// Creates an enum field resolving against `set`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidArgument`] if the name is empty.
    pub fn enumeration(name: impl Into<String>, set: EnumSet) -> ValueResult<Self> {
        let field = Self {
            name: name.into(),
            value_type: ValueType::Enum,
            enum_set: Some(set),
        };
        field.validate()?;
        Ok(field)
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Returns the enum set, if this is an enum field.
    #[must_use]
    pub fn enum_set(&self) -> Option<&EnumSet> {
        self.enum_set.as_ref()
    }

    /// Renames the field.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidArgument`] if `name` is empty.
    pub fn set_name(&mut self, name: impl Into<String>) -> ValueResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValueError::invalid_argument("field name is empty"));
        }
        self.name = name;
        Ok(())
    }

    /// Changes the declared type. Switching away from enum drops the set.
    pub fn set_value_type(&mut self, value_type: ValueType) {
        self.value_type = value_type;
        if value_type != ValueType::Enum {
            self.enum_set = None;
        }
    }

    /// Attaches an enum set and makes this an enum field.
    pub fn set_enum_set(&mut self, set: EnumSet) {
        self.value_type = ValueType::Enum;
        self.enum_set = Some(set);
    }

    /// Returns true if the field has a name and a non-empty type.
    #[must_use]
    pub fn is_not_empty(&self) -> bool {
        !self.name.is_empty() && self.value_type != ValueType::Empty
    }

    /// Checks the field is usable as schema.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidArgument`] for an empty field, an enum
    /// field without a set, or a set on a non-enum field.
    pub fn validate(&self) -> ValueResult<()> {
        if self.name.is_empty() {
            return Err(ValueError::invalid_argument("field name is empty"));
        }
        if self.value_type == ValueType::Empty {
            return Err(ValueError::invalid_argument(format!(
                "field {} has no type",
                self.name
            )));
        }
        match (self.value_type, &self.enum_set) {
            (ValueType::Enum, None) => Err(ValueError::invalid_argument(format!(
                "enum field {} has no enum set",
                self.name
            ))),
            (ty, Some(_)) if ty != ValueType::Enum => Err(ValueError::invalid_argument(
                format!("field {} is {ty} but carries an enum set", self.name),
            )),
            _ => Ok(()),
        }
    }

    /// Checks that `value` may be stored in this field.
    ///
    /// `Any` fields accept every non-empty value. Enum fields require the
    /// member to be in the field's set. Every other type requires the exact
    /// tag.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch, [`ValueError::Empty`] or
    /// [`ValueError::EnumNotInSet`].
    pub fn check(&self, value: &Value) -> ValueResult<()> {
        if self.value_type == ValueType::Any {
            return if value.is_empty() {
                Err(ValueError::Empty)
            } else {
                Ok(())
            };
        }
        if value.value_type() != self.value_type {
            return Err(ValueError::mismatch(self.value_type, value.value_type()));
        }
        if let (Some(set), Some(member)) = (&self.enum_set, value.as_enum()) {
            if !set.contains(member) {
                return Err(ValueError::not_in_set(member.text()));
            }
        }
        Ok(())
    }

    /// Converts a raw backend value to this field's declared type.
    ///
    /// Empty values pass through unchanged. Primary-key fields produce a
    /// primary-key value with the flag set.
    ///
    /// # Errors
    ///
    /// Returns the conversion error if the raw value cannot be represented
    /// in the declared type.
    pub fn coerce(&self, raw: &Value) -> ValueResult<Value> {
        if raw.is_empty() {
            return Ok(Value::new());
        }
        let mut value = match self.value_type {
            ValueType::Empty => {
                return Err(ValueError::invalid_argument(format!(
                    "field {} has no type",
                    self.name
                )));
            }
            ValueType::PrimaryKey => Value::primary_key(convert::to_scalar(raw)?),
            ValueType::Int32 => Value::int32(convert::to_int32(raw)?),
            ValueType::UInt32 => Value::uint32(convert::to_uint32(raw)?),
            ValueType::Int64 => Value::int64(convert::to_int64(raw)?),
            ValueType::UInt64 => Value::uint64(convert::to_uint64(raw)?),
            ValueType::Text => Value::text(convert::to_text(raw)?),
            ValueType::Enum => {
                let set = self.enum_set.as_ref().ok_or_else(|| {
                    ValueError::invalid_argument(format!(
                        "enum field {} has no enum set",
                        self.name
                    ))
                })?;
                Value::enumeration(convert::to_enum(raw, set)?)
            }
            ValueType::Any => Value::any(convert::to_scalar(raw)?),
            ValueType::Revision => Value::revision(convert::to_scalar(raw)?),
        };
        if raw.is_primary_key() {
            value.mark_primary_key();
        }
        Ok(value)
    }
}

/// The ordered schema of one record.
///
/// Insertion order is preserved and names are unique. Fields can only be
/// appended; the list is built once and then read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldList {
    fields: Vec<Field>,
}

impl FieldList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::DuplicateField`] if the name is taken, or the
    /// field's validation error.
    pub fn push(&mut self, field: Field) -> ValueResult<()> {
        field.validate()?;
        if self.find(field.name()).is_some() {
            return Err(ValueError::DuplicateField {
                name: field.name().to_string(),
            });
        }
        self.fields.push(field);
        Ok(())
    }

    /// Builder form of [`FieldList::push`].
    ///
    /// # Errors
    ///
    /// Same as [`FieldList::push`].
    pub fn with(mut self, field: Field) -> ValueResult<Self> {
        self.push(field)?;
        Ok(self)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates front to back.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// Returns the field at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Finds a field by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Returns the position of the named field.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Checks a value set against this schema position by position.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidArgument`] if the lengths differ, or the
    /// first per-field check failure.
    pub fn check(&self, values: &ValueSet) -> ValueResult<()> {
        if values.len() != self.fields.len() {
            return Err(ValueError::invalid_argument(format!(
                "field list has {} fields but value set has {} values",
                self.fields.len(),
                values.len()
            )));
        }
        self.fields
            .iter()
            .zip(values.iter())
            .try_for_each(|(field, value)| field.check(value))
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
