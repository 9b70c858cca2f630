//! Sparse column sets for inserts and updates.
//!
//! An entity describes every column it owns; only the columns carrying a
//! meaningful value survive into the statement. Zero numbers, empty
//! strings, `false` and absent optionals are skipped so an update never
//! clobbers a stored value with a default.

use chrono::{DateTime, SecondsFormat, Utc};
use common::EntityId;
use serde_json::Value;

/// A typed column value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl ColumnValue {
    /// Returns true for the zero value of the column's type.
    pub fn is_blank(&self) -> bool {
        match self {
            ColumnValue::Int(v) => *v == 0,
            ColumnValue::Float(v) => *v == 0.0,
            ColumnValue::Text(v) => v.is_empty(),
            ColumnValue::Bool(v) => !*v,
            ColumnValue::Timestamp(_) => false,
            ColumnValue::Null => true,
        }
    }

    /// Returns the value as it appears in a JSON row.
    pub fn to_json(&self) -> Value {
        match self {
            ColumnValue::Int(v) => Value::from(*v),
            ColumnValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ColumnValue::Text(v) => Value::String(v.clone()),
            ColumnValue::Bool(v) => Value::Bool(*v),
            ColumnValue::Timestamp(v) => {
                Value::String(v.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            ColumnValue::Null => Value::Null,
        }
    }
}

impl std::fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnValue::Int(v) => write!(f, "{v}"),
            ColumnValue::Float(v) => write!(f, "{v}"),
            ColumnValue::Text(v) => f.write_str(v),
            ColumnValue::Bool(v) => write!(f, "{v}"),
            ColumnValue::Timestamp(v) => {
                f.write_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            ColumnValue::Null => f.write_str("null"),
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(v: i64) -> Self {
        ColumnValue::Int(v)
    }
}

impl From<i32> for ColumnValue {
    fn from(v: i32) -> Self {
        ColumnValue::Int(i64::from(v))
    }
}

impl From<EntityId> for ColumnValue {
    fn from(v: EntityId) -> Self {
        ColumnValue::Int(v.get())
    }
}

impl From<f64> for ColumnValue {
    fn from(v: f64) -> Self {
        ColumnValue::Float(v)
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        ColumnValue::Text(v)
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::Text(v.to_string())
    }
}

impl From<&String> for ColumnValue {
    fn from(v: &String) -> Self {
        ColumnValue::Text(v.clone())
    }
}

impl From<bool> for ColumnValue {
    fn from(v: bool) -> Self {
        ColumnValue::Bool(v)
    }
}

impl From<DateTime<Utc>> for ColumnValue {
    fn from(v: DateTime<Utc>) -> Self {
        ColumnValue::Timestamp(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    /// Included when the value is not blank.
    NonBlank,
    /// Included when the caller supplied a value, even a blank one.
    Explicit,
    /// Always included.
    Always,
}

/// One column of an entity together with its inclusion rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: &'static str,
    pub value: ColumnValue,
    presence: Presence,
}

impl Column {
    /// A plain column, written only when its value is not the type's zero value.
    pub fn value(name: &'static str, value: impl Into<ColumnValue>) -> Self {
        Self {
            name,
            value: value.into(),
            presence: Presence::NonBlank,
        }
    }

    /// An optional column, written whenever it is `Some`.
    pub fn optional<T: Into<ColumnValue>>(name: &'static str, value: Option<T>) -> Self {
        match value {
            Some(v) => Self {
                name,
                value: v.into(),
                presence: Presence::Explicit,
            },
            None => Self {
                name,
                value: ColumnValue::Null,
                presence: Presence::NonBlank,
            },
        }
    }

    /// A bookkeeping timestamp, always written.
    pub fn stamp(name: &'static str, at: DateTime<Utc>) -> Self {
        Self {
            name,
            value: ColumnValue::Timestamp(at),
            presence: Presence::Always,
        }
    }

    /// Returns true if this column belongs in a sparse statement.
    pub fn is_included(&self) -> bool {
        match self.presence {
            Presence::NonBlank => !self.value.is_blank(),
            Presence::Explicit | Presence::Always => true,
        }
    }
}

/// The columns of one insert or update, after blank values are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseWrite {
    table: &'static str,
    assignments: Vec<(&'static str, ColumnValue)>,
}

impl SparseWrite {
    /// Builds a write for `table` from an entity's columns.
    ///
    /// Blank columns are dropped, as is `id`: identity is assigned by the
    /// store on insert and addressed separately on update.
    pub fn new(table: &'static str, columns: impl IntoIterator<Item = Column>) -> Self {
        let assignments = columns
            .into_iter()
            .filter(|c| c.name != "id" && c.is_included())
            .map(|c| (c.name, c.value))
            .collect();
        Self { table, assignments }
    }

    /// Sets a timestamp column, replacing any value already present.
    pub fn stamp(mut self, name: &'static str, at: DateTime<Utc>) -> Self {
        let value = ColumnValue::Timestamp(at);
        match self.assignments.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.assignments.push((name, value)),
        }
        self
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Returns the `(column, value)` pairs in statement order.
    pub fn assignments(&self) -> &[(&'static str, ColumnValue)] {
        &self.assignments
    }

    /// Returns the column names in statement order.
    pub fn columns(&self) -> Vec<&'static str> {
        self.assignments.iter().map(|(n, _)| *n).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ColumnValue> {
        self.assignments
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Renders the insert statement with positional placeholders.
    pub fn insert_sql(&self) -> String {
        let columns = self.columns().join(", ");
        let placeholders = (1..=self.assignments.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({columns}) VALUES ({placeholders}) RETURNING id",
            self.table
        )
    }

    /// Renders the update statement with positional placeholders; the id binds last.
    ///
    /// Soft-deleted rows are never matched.
    pub fn update_sql(&self) -> String {
        let sets = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, (n, _))| format!("{n} = ${}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE {} SET {sets} WHERE id = ${} AND deleted_at IS NULL",
            self.table,
            self.assignments.len() + 1
        )
    }
}
