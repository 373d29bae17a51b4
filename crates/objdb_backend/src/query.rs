//! Backend-neutral query descriptions: clauses, ordering and joins.
//!
//! These types only describe a query. Engines decide how to run them; the
//! table engine in this crate evaluates them row by row.

use objdb_value::Value;

/// How a clause combines with the clauses before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    /// Both sides must hold.
    #[default]
    And,
    /// Either side must hold.
    Or,
}

/// The test a clause applies to a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClauseKind {
    /// `column = value`
    Equal,
    /// `column <> value`
    NotEqual,
    /// `column < value`
    LessThan,
    /// `column <= value`
    LessOrEqual,
    /// `column >= value`
    GreaterOrEqual,
    /// `column > value`
    GreaterThan,
    /// The column holds no value.
    IsNull,
    /// The column holds a value.
    IsNotNull,
    /// A parenthesised group of clauses.
    Nested(ClauseList),
}

/// One filter term.
///
/// A clause names a column of the object's table, or of a joined table when
/// [`Clause::table`] is set, and compares it against a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    table: Option<String>,
    field: String,
    kind: ClauseKind,
    value: Value,
    operator: Operator,
}

impl Clause {
    fn compare(field: impl Into<String>, kind: ClauseKind, value: impl Into<Value>) -> Self {
        Self {
            table: None,
            field: field.into(),
            kind,
            value: value.into(),
            operator: Operator::And,
        }
    }

    /// `field = value`
    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ClauseKind::Equal, value)
    }

    /// `field <> value`
    pub fn not_equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ClauseKind::NotEqual, value)
    }

    /// `field < value`
    pub fn less_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ClauseKind::LessThan, value)
    }

    /// `field <= value`
    pub fn less_or_equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ClauseKind::LessOrEqual, value)
    }

    /// `field >= value`
    pub fn greater_or_equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ClauseKind::GreaterOrEqual, value)
    }

    /// `field > value`
    pub fn greater_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, ClauseKind::GreaterThan, value)
    }

    /// `field IS NULL`
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::compare(field, ClauseKind::IsNull, Value::new())
    }

    /// `field IS NOT NULL`
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::compare(field, ClauseKind::IsNotNull, Value::new())
    }

    /// A parenthesised group. Ordering and limit of `group` are ignored.
    #[must_use]
    pub fn nested(group: ClauseList) -> Self {
        Self {
            table: None,
            field: String::new(),
            kind: ClauseKind::Nested(group),
            value: Value::new(),
            operator: Operator::And,
        }
    }

    /// Qualifies the column with a (joined) table name.
    #[must_use]
    pub fn on_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Sets how this clause combines with the preceding ones.
    #[must_use]
    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    /// Returns the table qualifier.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Returns the column name. Empty for nested groups.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the test this clause applies.
    #[must_use]
    pub fn kind(&self) -> &ClauseKind {
        &self.kind
    }

    /// Returns the comparison operand.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the combining operator.
    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

/// One sort key of a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Column of the object's table to sort on.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

/// A filter plus optional ordering and limit.
///
/// Clauses are combined left to right: each clause's [`Operator`] joins it
/// to the result of everything before it. The operator of the first clause
/// is ignored. An empty list matches every row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClauseList {
    clauses: Vec<Clause>,
    order_by: Vec<OrderBy>,
    limit: Option<usize>,
}

impl ClauseList {
    /// Creates an empty list, matching every row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a clause with its own operator.
    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    /// Appends `clause` joined with AND.
    #[must_use]
    pub fn and(mut self, clause: Clause) -> Self {
        self.push(clause.with_operator(Operator::And));
        self
    }

    /// Appends `clause` joined with OR.
    #[must_use]
    pub fn or(mut self, clause: Clause) -> Self {
        self.push(clause.with_operator(Operator::Or));
        self
    }

    /// Adds a sort key. Earlier keys take precedence.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by.push(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Caps the number of rows returned.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the clauses.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns the sort keys.
    #[must_use]
    pub fn ordering(&self) -> &[OrderBy] {
        &self.order_by
    }

    /// Returns the row limit.
    #[must_use]
    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the number of clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Returns true if there are no clauses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl From<Clause> for ClauseList {
    fn from(clause: Clause) -> Self {
        Self::new().and(clause)
    }
}

/// An equi-join from a bound table to another table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Table already in the query (the object's table or an earlier join).
    pub from_table: String,
    /// Column of `from_table`.
    pub from_field: String,
    /// Table brought into the query.
    pub to_table: String,
    /// Column of `to_table` that must equal `from_field`.
    pub to_field: String,
}

impl Join {
    /// Creates a join `from_table.from_field = to_table.to_field`.
    pub fn new(
        from_table: impl Into<String>,
        from_field: impl Into<String>,
        to_table: impl Into<String>,
        to_field: impl Into<String>,
    ) -> Self {
        Self {
            from_table: from_table.into(),
            from_field: from_field.into(),
            to_table: to_table.into(),
            to_field: to_field.into(),
        }
    }
}

/// An ordered list of joins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JoinList {
    joins: Vec<Join>,
}

impl JoinList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a join.
    pub fn push(&mut self, join: Join) {
        self.joins.push(join);
    }

    /// Builder form of [`JoinList::push`].
    #[must_use]
    pub fn with(mut self, join: Join) -> Self {
        self.push(join);
        self
    }

    /// Returns the joins as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Join] {
        &self.joins
    }

    /// Iterates over the joins in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Join> {
        self.joins.iter()
    }

    /// Returns the number of joins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.joins.len()
    }

    /// Returns true if there are no joins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }
}

impl<'a> IntoIterator for &'a JoinList {
    type Item = &'a Join;
    type IntoIter = std::slice::Iter<'a, Join>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
