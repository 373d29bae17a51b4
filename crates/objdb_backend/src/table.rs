//! The table engine shared by the bundled backends.
//!
//! Tables are sparse: each row maps column names to [`Cell`]s and the key
//! column is never stored, it is the row id. Every change is expressed as a
//! [`Mutation`] so the file backend can log it before applying it.

use crate::cursor::Row;
use crate::desc::ObjectDesc;
use crate::error::{BackendError, BackendResult};
use crate::query::{Clause, ClauseKind, ClauseList, Direction, Join, JoinList, Operator};
use objdb_value::{Datum, Field, FieldList, Scalar, Value, ValueError, ValueSet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Cache key for the resolved column layout of an object.
const COLUMNS_KEY: &str = "objdb.table.columns";

/// A stored column value.
///
/// Storage is width-agnostic: every signed integer is an `Int`, every
/// unsigned one a `UInt`, and enum members are stored by integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Cell {
    Null,
    Int(i64),
    UInt(u64),
    Text(String),
}

impl Cell {
    pub(crate) fn from_value(value: &Value) -> Self {
        match value.datum() {
            Datum::Empty => Self::Null,
            Datum::Int32(n) => Self::Int(i64::from(*n)),
            Datum::Int64(n) => Self::Int(*n),
            Datum::UInt32(n) => Self::UInt(u64::from(*n)),
            Datum::UInt64(n) => Self::UInt(*n),
            Datum::Text(s) => Self::Text(s.clone()),
            Datum::Enum(member) => Self::Int(i64::from(member.value())),
            Datum::PrimaryKey(s) | Datum::Any(s) | Datum::Revision(s) => match s {
                Scalar::Int(n) => Self::Int(*n),
                Scalar::UInt(n) => Self::UInt(*n),
                Scalar::Text(t) => Self::Text(t.clone()),
            },
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::new(),
            Self::Int(n) => Value::int64(*n),
            Self::UInt(n) => Value::uint64(*n),
            Self::Text(s) => Value::text(s.clone()),
        }
    }

    fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Int(n) => Some(i128::from(*n)),
            Self::UInt(n) => Some(i128::from(*n)),
            _ => None,
        }
    }

    /// Join equality: numbers across signedness, text exactly, null never.
    fn joins_with(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => match (self.as_integer(), other.as_integer()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Total order for sorting: nulls, then numbers, then text.
    fn sort_cmp(&self, other: &Self) -> Ordering {
        fn rank(cell: &Cell) -> u8 {
            match cell {
                Cell::Null => 0,
                Cell::Int(_) | Cell::UInt(_) => 1,
                Cell::Text(_) => 2,
            }
        }
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.as_bytes().cmp(b.as_bytes()),
            _ => match (self.as_integer(), other.as_integer()) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => rank(self).cmp(&rank(other)),
            },
        }
    }
}

/// One logged change to the table store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Mutation {
    Insert {
        table: String,
        key_column: String,
        id: u64,
        cells: Vec<(String, Cell)>,
    },
    Update {
        table: String,
        ids: Vec<u64>,
        cells: Vec<(String, Cell)>,
    },
    Delete {
        table: String,
        ids: Vec<u64>,
    },
}

impl Mutation {
    /// Returns the key an insert assigns, or an empty value.
    pub(crate) fn generated_key(&self) -> Value {
        match self {
            Self::Insert { id, .. } => Value::primary_key(*id),
            _ => Value::new(),
        }
    }

    /// Returns true if applying this mutation changes nothing.
    pub(crate) fn is_noop(&self) -> bool {
        match self {
            Self::Insert { .. } => false,
            Self::Update { ids, .. } | Self::Delete { ids, .. } => ids.is_empty(),
        }
    }
}

type Columns = BTreeMap<String, Cell>;

#[derive(Debug, Clone, Default)]
struct Table {
    key_column: String,
    next_id: u64,
    rows: BTreeMap<u64, Columns>,
}

impl Table {
    fn cell(&self, id: u64, row: &Columns, column: &str) -> Cell {
        if column == self.key_column {
            Cell::UInt(id)
        } else {
            row.get(column).cloned().unwrap_or(Cell::Null)
        }
    }
}

/// The schema columns an object may reference, resolved once per object.
#[derive(Debug)]
struct ColumnLayout {
    names: Vec<String>,
}

impl ColumnLayout {
    fn resolve(desc: &ObjectDesc<'_>) -> Self {
        let mut names: Vec<String> = desc.fields.iter().map(|f| f.name().to_string()).collect();
        if !names.iter().any(|n| n == desc.primary_key) {
            names.push(desc.primary_key.to_string());
        }
        Self { names }
    }

    fn contains(&self, column: &str) -> bool {
        self.names.iter().any(|n| n == column)
    }
}

/// A table bound into a query: the object's own table or a joined one.
struct Bound<'a> {
    name: &'a str,
    table: &'a Table,
    id: u64,
    row: &'a Columns,
}

impl Bound<'_> {
    fn cell(&self, column: &str) -> Cell {
        self.table.cell(self.id, self.row, column)
    }
}

/// All tables of one backend.
#[derive(Debug, Default)]
pub(crate) struct TableStore {
    tables: BTreeMap<String, Table>,
}

impl TableStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub(crate) fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |t| t.rows.len())
    }

    fn layout(desc: &ObjectDesc<'_>) -> Arc<ColumnLayout> {
        desc.meta
            .get_or_insert_with(COLUMNS_KEY, || ColumnLayout::resolve(desc))
    }

    fn object_table<'a>(&'a self, desc: &ObjectDesc<'_>) -> BackendResult<Option<&'a Table>> {
        match self.tables.get(desc.table) {
            Some(table) if table.key_column != desc.primary_key => {
                Err(BackendError::invalid_query(format!(
                    "table {} is keyed by {}, not {}",
                    desc.table, table.key_column, desc.primary_key
                )))
            }
            found => Ok(found),
        }
    }

    fn cells(
        desc: &ObjectDesc<'_>,
        fields: &FieldList,
        values: &ValueSet,
    ) -> BackendResult<Vec<(String, Cell)>> {
        if fields.len() != values.len() {
            return Err(BackendError::invalid_query(format!(
                "{} fields but {} values",
                fields.len(),
                values.len()
            )));
        }
        fields
            .iter()
            .zip(values.iter())
            .map(|(field, value)| {
                if field.name() == desc.primary_key {
                    Err(BackendError::invalid_query(format!(
                        "primary key {} is assigned by the engine",
                        desc.primary_key
                    )))
                } else {
                    Ok((field.name().to_string(), Cell::from_value(value)))
                }
            })
            .collect()
    }

    pub(crate) fn plan_insert(
        &self,
        desc: &ObjectDesc<'_>,
        fields: &FieldList,
        values: &ValueSet,
    ) -> BackendResult<Mutation> {
        let cells = Self::cells(desc, fields, values)?;
        let id = self.object_table(desc)?.map_or(1, |t| t.next_id);
        Ok(Mutation::Insert {
            table: desc.table.to_string(),
            key_column: desc.primary_key.to_string(),
            id,
            cells,
        })
    }

    pub(crate) fn plan_update(
        &self,
        desc: &ObjectDesc<'_>,
        fields: &FieldList,
        values: &ValueSet,
        clauses: &ClauseList,
    ) -> BackendResult<Mutation> {
        let cells = Self::cells(desc, fields, values)?;
        let ids = self.matching_ids(desc, None, Some(clauses))?;
        Ok(Mutation::Update {
            table: desc.table.to_string(),
            ids,
            cells,
        })
    }

    pub(crate) fn plan_delete(
        &self,
        desc: &ObjectDesc<'_>,
        clauses: &ClauseList,
    ) -> BackendResult<Mutation> {
        let ids = self.matching_ids(desc, None, Some(clauses))?;
        Ok(Mutation::Delete {
            table: desc.table.to_string(),
            ids,
        })
    }

    /// Applies a mutation and returns the number of rows it touched.
    pub(crate) fn apply(&mut self, mutation: Mutation) -> u64 {
        match mutation {
            Mutation::Insert {
                table,
                key_column,
                id,
                cells,
            } => {
                let table = self.tables.entry(table).or_insert_with(|| Table {
                    key_column,
                    next_id: 1,
                    rows: BTreeMap::new(),
                });
                table.next_id = table.next_id.max(id.saturating_add(1));
                table.rows.insert(id, cells.into_iter().collect());
                1
            }
            Mutation::Update { table, ids, cells } => {
                let Some(table) = self.tables.get_mut(&table) else {
                    return 0;
                };
                let mut affected = 0;
                for id in ids {
                    if let Some(row) = table.rows.get_mut(&id) {
                        for (column, cell) in &cells {
                            row.insert(column.clone(), cell.clone());
                        }
                        affected += 1;
                    }
                }
                affected
            }
            Mutation::Delete { table, ids } => {
                let Some(table) = self.tables.get_mut(&table) else {
                    return 0;
                };
                ids.iter()
                    .filter(|id| table.rows.remove(id).is_some())
                    .count() as u64
            }
        }
    }

    /// Builds raw rows for `ids`, one value per field of the object.
    pub(crate) fn rows(&self, desc: &ObjectDesc<'_>, ids: &[u64]) -> Vec<Row> {
        let Some(table) = self.tables.get(desc.table) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| table.rows.get(id).map(|row| (*id, row)))
            .map(|(id, row)| {
                desc.fields
                    .iter()
                    .map(|field| {
                        let mut value = table.cell(id, row, field.name()).to_value();
                        if field.name() == desc.primary_key {
                            value.mark_primary_key();
                        }
                        value
                    })
                    .collect()
            })
            .collect()
    }

    /// Returns the ids of matching rows in result order.
    pub(crate) fn matching_ids(
        &self,
        desc: &ObjectDesc<'_>,
        joins: Option<&JoinList>,
        clauses: Option<&ClauseList>,
    ) -> BackendResult<Vec<u64>> {
        let layout = Self::layout(desc);
        let empty = ClauseList::new();
        let clauses = clauses.unwrap_or(&empty);
        let joins: &[Join] = joins.map_or(&[], |j| j.as_slice());
        validate(desc, &layout, joins, clauses)?;

        if self.object_table(desc)?.is_none() {
            return Ok(Vec::new());
        }
        let Some((name, table)) = self.tables.get_key_value(desc.table) else {
            return Ok(Vec::new());
        };

        let mut ids = Vec::new();
        for (id, row) in &table.rows {
            let mut bound = vec![Bound {
                name: name.as_str(),
                table,
                id: *id,
                row,
            }];
            if self.search(desc, &mut bound, joins, clauses)? {
                ids.push(*id);
            }
        }

        if !clauses.ordering().is_empty() {
            ids.sort_by(|a, b| {
                let (ra, rb) = (&table.rows[a], &table.rows[b]);
                clauses
                    .ordering()
                    .iter()
                    .map(|key| {
                        let ord = table
                            .cell(*a, ra, &key.field)
                            .sort_cmp(&table.cell(*b, rb, &key.field));
                        match key.direction {
                            Direction::Ascending => ord,
                            Direction::Descending => ord.reverse(),
                        }
                    })
                    .find(|ord| ord.is_ne())
                    .unwrap_or(Ordering::Equal)
            });
        }
        if let Some(limit) = clauses.row_limit() {
            ids.truncate(limit);
        }
        Ok(ids)
    }

    /// Extends `bound` through the remaining joins and reports whether any
    /// complete combination satisfies `clauses`.
    fn search<'a>(
        &'a self,
        desc: &ObjectDesc<'_>,
        bound: &mut Vec<Bound<'a>>,
        joins: &[Join],
        clauses: &ClauseList,
    ) -> BackendResult<bool> {
        let Some((join, rest)) = joins.split_first() else {
            return eval_list(desc, clauses, bound);
        };

        let key = bound
            .iter()
            .find(|b| b.name == join.from_table)
            .map(|b| b.cell(&join.from_field))
            .ok_or_else(|| {
                BackendError::invalid_query(format!(
                    "join source table {} is not part of the query",
                    join.from_table
                ))
            })?;
        let Some((name, target)) = self.tables.get_key_value(join.to_table.as_str()) else {
            return Ok(false);
        };

        for (id, row) in &target.rows {
            if !target.cell(*id, row, &join.to_field).joins_with(&key) {
                continue;
            }
            bound.push(Bound {
                name: name.as_str(),
                table: target,
                id: *id,
                row,
            });
            let found = self.search(desc, bound, rest, clauses);
            bound.pop();
            if found? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Rejects queries naming columns the object's schema does not have.
fn validate(
    desc: &ObjectDesc<'_>,
    layout: &ColumnLayout,
    joins: &[Join],
    clauses: &ClauseList,
) -> BackendResult<()> {
    let unknown = |column: &str| {
        BackendError::invalid_query(format!("unknown column {}.{column}", desc.table))
    };

    for key in clauses.ordering() {
        if !layout.contains(&key.field) {
            return Err(unknown(&key.field));
        }
    }
    for join in joins {
        if join.from_table == desc.table && !layout.contains(&join.from_field) {
            return Err(unknown(&join.from_field));
        }
    }
    validate_clauses(desc, layout, clauses, &unknown)
}

fn validate_clauses(
    desc: &ObjectDesc<'_>,
    layout: &ColumnLayout,
    clauses: &ClauseList,
    unknown: &dyn Fn(&str) -> BackendError,
) -> BackendResult<()> {
    for clause in clauses.clauses() {
        match clause.kind() {
            ClauseKind::Nested(group) => validate_clauses(desc, layout, group, unknown)?,
            kind => {
                let own_table = clause.table().map_or(true, |t| t == desc.table);
                if own_table && !layout.contains(clause.field()) {
                    return Err(unknown(clause.field()));
                }
                let needs_operand = !matches!(kind, ClauseKind::IsNull | ClauseKind::IsNotNull);
                if needs_operand && clause.value().is_empty() {
                    return Err(BackendError::invalid_query(format!(
                        "clause on {} has no operand",
                        clause.field()
                    )));
                }
            }
        }
    }
    Ok(())
}

fn eval_list(
    desc: &ObjectDesc<'_>,
    clauses: &ClauseList,
    bound: &[Bound<'_>],
) -> BackendResult<bool> {
    let mut acc: Option<bool> = None;
    for clause in clauses.clauses() {
        let next = match (acc, clause.operator()) {
            (Some(true), Operator::Or) => true,
            (Some(false), Operator::And) => false,
            _ => eval_clause(desc, clause, bound)?,
        };
        acc = Some(next);
    }
    Ok(acc.unwrap_or(true))
}

fn eval_clause(
    desc: &ObjectDesc<'_>,
    clause: &Clause,
    bound: &[Bound<'_>],
) -> BackendResult<bool> {
    if let ClauseKind::Nested(group) = clause.kind() {
        return eval_list(desc, group, bound);
    }

    let source = match clause.table() {
        None => bound.first(),
        Some(table) => bound.iter().find(|b| b.name == table),
    }
    .ok_or_else(|| {
        BackendError::invalid_query(format!(
            "table {} is not part of the query",
            clause.table().unwrap_or_default()
        ))
    })?;
    let cell = source.cell(clause.field());

    let ordering = match clause.kind() {
        ClauseKind::IsNull => return Ok(cell == Cell::Null),
        ClauseKind::IsNotNull => return Ok(cell != Cell::Null),
        _ if cell == Cell::Null => return Ok(false),
        _ => {
            let operand = operand(desc, clause)?.to_value();
            objdb_value::compare(&cell.to_value(), &operand)?
        }
    };

    Ok(match clause.kind() {
        ClauseKind::Equal => ordering.is_eq(),
        ClauseKind::NotEqual => ordering.is_ne(),
        ClauseKind::LessThan => ordering.is_lt(),
        ClauseKind::LessOrEqual => ordering.is_le(),
        ClauseKind::GreaterOrEqual => ordering.is_ge(),
        ClauseKind::GreaterThan => ordering.is_gt(),
        ClauseKind::IsNull | ClauseKind::IsNotNull | ClauseKind::Nested(_) => false,
    })
}

/// Returns the clause operand as stored.
///
/// Text compared against an enum column of the object's own table names a
/// member of the field's enum set and is matched by member value.
fn operand(desc: &ObjectDesc<'_>, clause: &Clause) -> BackendResult<Cell> {
    let own_table = clause.table().map_or(true, |t| t == desc.table);
    let set = desc
        .fields
        .find(clause.field())
        .filter(|_| own_table)
        .and_then(Field::enum_set);
    match (set, clause.value().as_text()) {
        (Some(set), Some(text)) => {
            let member = set.by_text(text).ok_or_else(|| ValueError::not_in_set(text))?;
            Ok(Cell::Int(i64::from(member.value())))
        }
        _ => Ok(Cell::from_value(clause.value())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desc::BackendMeta;
    use crate::query::{Clause, Join};
    use objdb_value::{Field, ValueType};

    fn people() -> FieldList {
        FieldList::new()
            .with(Field::new("id", ValueType::PrimaryKey).unwrap())
            .unwrap()
            .with(Field::new("name", ValueType::Text).unwrap())
            .unwrap()
            .with(Field::new("born", ValueType::UInt32).unwrap())
            .unwrap()
            .with(Field::new("city_id", ValueType::UInt64).unwrap())
            .unwrap()
    }

    fn cities() -> FieldList {
        FieldList::new()
            .with(Field::new("name", ValueType::Text).unwrap())
            .unwrap()
    }

    fn insert(
        store: &mut TableStore,
        desc: &ObjectDesc<'_>,
        fields: &FieldList,
        values: Vec<Value>,
    ) -> u64 {
        let mutation = store.plan_insert(desc, fields, &values.into()).unwrap();
        let Mutation::Insert { id, .. } = &mutation else {
            panic!("expected insert");
        };
        let id = *id;
        store.apply(mutation);
        id
    }

    struct Fixture {
        store: TableStore,
        fields: FieldList,
        meta: BackendMeta,
    }

    impl Fixture {
        fn new() -> Self {
            let mut store = TableStore::new();
            let fields = people();
            let meta = BackendMeta::new();
            let city_fields = cities();
            let city_meta = BackendMeta::new();
            let city_desc = ObjectDesc::new("cities", "id", &city_fields, &city_meta);
            let paris = insert(&mut store, &city_desc, &city_fields, vec![Value::text("Paris")]);
            let oslo = insert(&mut store, &city_desc, &city_fields, vec![Value::text("Oslo")]);

            let insert_fields = FieldList::new()
                .with(Field::new("name", ValueType::Text).unwrap())
                .unwrap()
                .with(Field::new("born", ValueType::UInt32).unwrap())
                .unwrap()
                .with(Field::new("city_id", ValueType::UInt64).unwrap())
                .unwrap();
            let desc = ObjectDesc::new("people", "id", &fields, &meta);
            for (name, born, city) in [
                ("Alice", 1990, paris),
                ("Bob", 1985, oslo),
                ("Carol", 2001, paris),
            ] {
                insert(
                    &mut store,
                    &desc,
                    &insert_fields,
                    vec![Value::text(name), Value::uint32(born), Value::uint64(city)],
                );
            }
            Self { store, fields, meta }
        }

        fn desc(&self) -> ObjectDesc<'_> {
            ObjectDesc::new("people", "id", &self.fields, &self.meta)
        }

        fn names(&self, joins: Option<&JoinList>, clauses: &ClauseList) -> Vec<String> {
            let desc = self.desc();
            let ids = self.store.matching_ids(&desc, joins, Some(clauses)).unwrap();
            self.store
                .rows(&desc, &ids)
                .iter()
                .map(|row| row[1].to_text().unwrap())
                .collect()
        }
    }

    #[test]
    fn ids_are_generated_in_order() {
        let fx = Fixture::new();
        let desc = fx.desc();
        let ids = fx.store.matching_ids(&desc, None, None).unwrap();
        assert_eq!(ids, [1, 2, 3]);

        let rows = fx.store.rows(&desc, &ids);
        assert_eq!(rows[0][0], Value::primary_key(1u64));
        assert!(rows[0][0].is_primary_key());
        assert_eq!(rows[0][2], Value::uint64(1990));
    }

    #[test]
    fn and_or_left_to_right() {
        let fx = Fixture::new();
        let clauses = ClauseList::new()
            .and(Clause::equal("name", "Alice"))
            .or(Clause::equal("name", "Bob"))
            .and(Clause::greater_than("born", 1980u32));
        assert_eq!(fx.names(None, &clauses), ["Alice", "Bob"]);

        let clauses = ClauseList::new()
            .and(Clause::greater_or_equal("born", 1990u32))
            .and(Clause::nested(
                ClauseList::new()
                    .and(Clause::equal("name", "Carol"))
                    .or(Clause::equal("name", "Bob")),
            ));
        assert_eq!(fx.names(None, &clauses), ["Carol"]);
    }

    #[test]
    fn comparisons_cross_widths() {
        let fx = Fixture::new();
        let clauses = ClauseList::from(Clause::less_than("born", 1990i64));
        assert_eq!(fx.names(None, &clauses), ["Bob"]);
        let clauses = ClauseList::from(Clause::not_equal("born", 1990u64));
        assert_eq!(fx.names(None, &clauses), ["Bob", "Carol"]);
        let clauses = ClauseList::from(Clause::less_or_equal("id", Value::primary_key(2u64)));
        assert_eq!(fx.names(None, &clauses), ["Alice", "Bob"]);
    }

    #[test]
    fn ordering_and_limit() {
        let fx = Fixture::new();
        let clauses = ClauseList::new().order_by("born", Direction::Descending).limit(2);
        assert_eq!(fx.names(None, &clauses), ["Carol", "Alice"]);

        let clauses = ClauseList::new().order_by("name", Direction::Ascending);
        assert_eq!(fx.names(None, &clauses), ["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn null_semantics() {
        let mut fx = Fixture::new();
        let desc = ObjectDesc::new("people", "id", &fx.fields, &fx.meta);
        let partial = FieldList::new()
            .with(Field::new("name", ValueType::Text).unwrap())
            .unwrap();
        let mutation = fx
            .store
            .plan_insert(&desc, &partial, &vec![Value::text("Dave")].into())
            .unwrap();
        fx.store.apply(mutation);

        let clauses = ClauseList::from(Clause::is_null("born"));
        assert_eq!(fx.names(None, &clauses), ["Dave"]);
        let clauses = ClauseList::from(Clause::is_not_null("born"));
        assert_eq!(fx.names(None, &clauses).len(), 3);
        // comparisons never match a null column
        let clauses = ClauseList::from(Clause::not_equal("born", 1u32));
        assert!(!fx.names(None, &clauses).contains(&"Dave".to_string()));
    }

    #[test]
    fn joins_are_semi_joins() {
        let fx = Fixture::new();
        let joins = JoinList::new().with(Join::new("people", "city_id", "cities", "id"));
        let clauses = ClauseList::from(Clause::equal("name", "Paris").on_table("cities"));
        assert_eq!(fx.names(Some(&joins), &clauses), ["Alice", "Carol"]);

        let all = fx.names(Some(&joins), &ClauseList::new());
        assert_eq!(all.len(), 3);

        let nowhere = JoinList::new().with(Join::new("people", "city_id", "planets", "id"));
        assert!(fx.names(Some(&nowhere), &ClauseList::new()).is_empty());
    }

    #[test]
    fn join_from_unbound_table_fails() {
        let fx = Fixture::new();
        let desc = fx.desc();
        let joins = JoinList::new().with(Join::new("cities", "id", "people", "city_id"));
        assert!(matches!(
            fx.store.matching_ids(&desc, Some(&joins), None),
            Err(BackendError::InvalidQuery(_))
        ));
    }

    #[test]
    fn unknown_columns_and_bad_operands() {
        let fx = Fixture::new();
        let desc = fx.desc();
        for clauses in [
            ClauseList::from(Clause::equal("age", 3u32)),
            ClauseList::new().order_by("age", Direction::Ascending),
            ClauseList::from(Clause::equal("name", Value::new())),
        ] {
            assert!(matches!(
                fx.store.matching_ids(&desc, None, Some(&clauses)),
                Err(BackendError::InvalidQuery(_))
            ));
        }

        let clauses = ClauseList::from(Clause::equal("name", 3u32));
        assert!(matches!(
            fx.store.matching_ids(&desc, None, Some(&clauses)),
            Err(BackendError::Value(_))
        ));
    }

    #[test]
    fn enum_columns_match_member_text() {
        let groups = objdb_value::EnumSet::new([("family", 0), ("work", 2)]).unwrap();
        let fields = FieldList::new()
            .with(Field::new("name", ValueType::Text).unwrap())
            .unwrap()
            .with(Field::enumeration("grp", groups.clone()).unwrap())
            .unwrap();
        let meta = BackendMeta::new();
        let desc = ObjectDesc::new("contacts", "id", &fields, &meta);
        let mut store = TableStore::new();
        for (name, grp) in [("Dana", "work"), ("Eve", "family"), ("Finn", "work")] {
            let member = groups.by_text(grp).cloned().unwrap();
            insert(
                &mut store,
                &desc,
                &fields,
                vec![Value::text(name), Value::enumeration(member)],
            );
        }

        let work = ClauseList::from(Clause::equal("grp", "work"));
        assert_eq!(store.matching_ids(&desc, None, Some(&work)).unwrap(), [1, 3]);
        let member = groups.by_text("work").cloned().unwrap();
        let by_member = ClauseList::from(Clause::equal("grp", member));
        assert_eq!(store.matching_ids(&desc, None, Some(&by_member)).unwrap(), [1, 3]);
        let not_work = ClauseList::from(Clause::not_equal("grp", "work"));
        assert_eq!(store.matching_ids(&desc, None, Some(&not_work)).unwrap(), [2]);

        let boss = ClauseList::from(Clause::equal("grp", "boss"));
        assert!(matches!(
            store.matching_ids(&desc, None, Some(&boss)),
            Err(BackendError::Value(ValueError::EnumNotInSet { .. }))
        ));
    }

    #[test]
    fn update_and_delete_plans() {
        let mut fx = Fixture::new();
        let desc = ObjectDesc::new("people", "id", &fx.fields, &fx.meta);
        let born = FieldList::new()
            .with(Field::new("born", ValueType::UInt32).unwrap())
            .unwrap();

        let plan = fx
            .store
            .plan_update(
                &desc,
                &born,
                &vec![Value::uint32(1991)].into(),
                &Clause::equal("name", "Alice").into(),
            )
            .unwrap();
        assert_eq!(fx.store.apply(plan), 1);

        let plan = fx
            .store
            .plan_update(
                &desc,
                &born,
                &vec![Value::uint32(1)].into(),
                &Clause::equal("name", "Zed").into(),
            )
            .unwrap();
        assert!(plan.is_noop());
        assert_eq!(fx.store.apply(plan), 0);

        let plan = fx.store.plan_delete(&desc, &ClauseList::new()).unwrap();
        assert_eq!(fx.store.apply(plan), 3);
        assert_eq!(fx.store.row_count("people"), 0);
        assert_eq!(fx.store.table_count(), 2);
    }

    #[test]
    fn primary_key_cannot_be_written() {
        let fx = Fixture::new();
        let desc = fx.desc();
        let key = FieldList::new()
            .with(Field::new("id", ValueType::PrimaryKey).unwrap())
            .unwrap();
        assert!(fx
            .store
            .plan_insert(&desc, &key, &vec![Value::primary_key(9u64)].into())
            .is_err());
    }

    #[test]
    fn mismatched_key_column_is_rejected() {
        let fx = Fixture::new();
        let desc = ObjectDesc::new("people", "pk", &fx.fields, &fx.meta);
        assert!(fx.store.matching_ids(&desc, None, None).is_err());
    }

    #[test]
    fn layout_is_cached_in_meta() {
        let fx = Fixture::new();
        assert!(fx.meta.is_empty());
        fx.store.matching_ids(&fx.desc(), None, None).unwrap();
        assert_eq!(fx.meta.len(), 1);
    }
}
