//! Objects: schema-checked CRUD against a connection's backend.

use crate::connection::Connection;
use crate::error::{CoreError, CoreResult};
use crate::result::ResultList;
use objdb_backend::{BackendMeta, ClauseList, JoinList, ObjectDesc};
use objdb_value::{convert, FieldList, Value, ValueSet, ValueType};
use tracing::debug;

/// A table, its primary key and its schema, bound to a connection.
///
/// Every operation validates its arguments against the schema before the
/// backend is contacted, so a malformed request never reaches storage.
///
/// # Example
///
/// ```rust
/// use objdb_backend::{BackendConfig, Clause, ClauseList};
/// use objdb_core::Connection;
/// use objdb_value::{Field, FieldList, Value, ValueSet, ValueType};
///
/// let conn = Connection::open(&BackendConfig::memory("doc")).unwrap();
/// let fields = FieldList::new()
///     .with(Field::new("name", ValueType::Text).unwrap())
///     .unwrap();
/// let people = conn.object("people", "id", fields.clone()).unwrap();
///
/// people
///     .create(&fields, &ValueSet::from(vec![Value::text("Alice")]))
///     .unwrap();
///
/// let alice = ClauseList::from(Clause::equal("name", "Alice"));
/// let rows: Vec<ValueSet> = people
///     .read(None, Some(&alice))
///     .unwrap()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(rows.len(), 1);
/// ```
#[derive(Debug)]
pub struct Object<'c> {
    conn: &'c Connection,
    table: String,
    primary_key: String,
    fields: FieldList,
    meta: BackendMeta,
}

impl<'c> Object<'c> {
    /// Creates an object.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] if the table or primary-key
    /// name is empty, or if the schema declares the primary-key field with
    /// a type other than primary-key or an integer.
    pub fn new(
        conn: &'c Connection,
        table: impl Into<String>,
        primary_key: impl Into<String>,
        fields: FieldList,
    ) -> CoreResult<Self> {
        let table = table.into();
        let primary_key = primary_key.into();
        if table.is_empty() {
            return Err(CoreError::invalid_argument("table name is empty"));
        }
        if primary_key.is_empty() {
            return Err(CoreError::invalid_argument("primary key name is empty"));
        }
        if let Some(field) = fields.find(&primary_key) {
            let ty = field.value_type();
            if ty != ValueType::PrimaryKey && !ty.is_integer() {
                return Err(CoreError::invalid_argument(format!(
                    "primary key {primary_key} cannot be declared as {ty}"
                )));
            }
        }
        Ok(Self {
            conn,
            table,
            primary_key,
            fields,
            meta: BackendMeta::new(),
        })
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the primary-key column name.
    #[must_use]
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Returns the schema.
    #[must_use]
    pub fn fields(&self) -> &FieldList {
        &self.fields
    }

    /// Returns the backend cache owned by this object.
    #[must_use]
    pub fn meta(&self) -> &BackendMeta {
        &self.meta
    }

    fn desc(&self) -> ObjectDesc<'_> {
        ObjectDesc::new(&self.table, &self.primary_key, &self.fields, &self.meta)
    }

    /// Checks that `fields` is a subset of the schema and `values` fits it.
    fn validate(&self, fields: &FieldList, values: &ValueSet) -> CoreResult<()> {
        if fields.is_empty() {
            return Err(CoreError::invalid_argument("field list is empty"));
        }
        for field in fields {
            let declared = self.fields.find(field.name()).ok_or_else(|| {
                CoreError::invalid_argument(format!(
                    "field {} is not part of {}",
                    field.name(),
                    self.table
                ))
            })?;
            if declared.value_type() != field.value_type()
                || declared.enum_set() != field.enum_set()
            {
                return Err(CoreError::invalid_argument(format!(
                    "field {} is declared as {} in {}, not {}",
                    field.name(),
                    declared.value_type(),
                    self.table,
                    field.value_type()
                )));
            }
        }
        fields
            .check(values)
            .map_err(|e| CoreError::invalid_argument(e.to_string()))
    }

    /// Inserts one record and returns its primary key.
    ///
    /// `fields` must be a subset of the schema with matching types, and
    /// `values` must pair with it position by position.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] before contacting the backend
    /// if the request does not match the schema, and
    /// [`CoreError::NotConnected`] after disconnect.
    pub fn create(&self, fields: &FieldList, values: &ValueSet) -> CoreResult<Value> {
        self.validate(fields, values)?;
        let backend = self.conn.backend()?;

        let key = backend.create(&self.desc(), fields, values)?;
        debug!(table = %self.table, key = %key, "created record");
        if key.is_empty() {
            return Ok(key);
        }
        if key.value_type() == ValueType::PrimaryKey {
            let mut key = key;
            key.mark_primary_key();
            return Ok(key);
        }
        Ok(Value::primary_key(convert::to_scalar(&key)?))
    }

    /// Reads the records matching `joins` and `clauses`.
    ///
    /// `None` means no joins and no filter. Rows are coerced to the schema
    /// lazily as the result list is iterated.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotConnected`] after disconnect, or the backend's
    /// error.
    pub fn read(
        &self,
        joins: Option<&JoinList>,
        clauses: Option<&ClauseList>,
    ) -> CoreResult<ResultList<'_>> {
        let backend = self.conn.backend()?;
        let cursor = backend.read(&self.desc(), joins, clauses)?;
        debug!(
            table = %self.table,
            joins = joins.map_or(0, JoinList::len),
            clauses = clauses.map_or(0, ClauseList::len),
            "opened result list"
        );
        Ok(ResultList::new(&self.fields, cursor))
    }

    /// Sets `fields` to `values` on every record matching `clauses`.
    ///
    /// `clauses` must be given; pass an empty [`ClauseList`] to update every
    /// record. Matching nothing succeeds with 0.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] before contacting the backend
    /// if `clauses` is `None` or the request does not match the schema.
    pub fn update(
        &self,
        fields: &FieldList,
        values: &ValueSet,
        clauses: Option<&ClauseList>,
    ) -> CoreResult<u64> {
        let clauses = require_clauses(clauses, "update")?;
        self.validate(fields, values)?;
        let backend = self.conn.backend()?;

        let affected = backend.update(&self.desc(), fields, values, clauses)?;
        debug!(table = %self.table, affected, "updated records");
        Ok(affected)
    }

    /// Removes every record matching `clauses`.
    ///
    /// `clauses` must be given; pass an empty [`ClauseList`] to remove every
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] if `clauses` is `None`.
    pub fn delete(&self, clauses: Option<&ClauseList>) -> CoreResult<u64> {
        let clauses = require_clauses(clauses, "delete")?;
        let backend = self.conn.backend()?;

        let affected = backend.delete(&self.desc(), clauses)?;
        debug!(table = %self.table, affected, "deleted records");
        Ok(affected)
    }

    /// Counts the records [`Object::read`] would return.
    ///
    /// # Errors
    ///
    /// Same as [`Object::read`].
    pub fn count(&self, joins: Option<&JoinList>, clauses: Option<&ClauseList>) -> CoreResult<u64> {
        let backend = self.conn.backend()?;
        let count = backend.count(&self.desc(), joins, clauses)?;
        debug!(table = %self.table, count, "counted records");
        Ok(count)
    }
}

fn require_clauses<'a>(clauses: Option<&'a ClauseList>, op: &str) -> CoreResult<&'a ClauseList> {
    clauses.ok_or_else(|| {
        CoreError::invalid_argument(format!(
            "{op} needs a clause list; pass an empty one to affect every record"
        ))
    })
}
