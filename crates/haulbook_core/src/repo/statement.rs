//! INSERT/UPDATE statement assembly from whitelisted columns.
//!
//! Column identifiers come from `Column` implementors (fixed per-entity
//! enums); input values only ever become bound parameters.

use chrono::NaiveDate;
use rusqlite::types::Value;

/// A settable column of one entity table.
pub(crate) trait Column: Copy {
    fn name(self) -> &'static str;
}

/// Ordered column/value pairs for one write statement.
#[derive(Debug)]
pub(crate) struct ColumnValues<C: Column> {
    entries: Vec<(C, Value)>,
}

impl<C: Column> ColumnValues<C> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn set(&mut self, column: C, value: Value) {
        self.entries.push((column, value));
    }

    /// `INSERT INTO t ("a", "b") VALUES (?1, ?2) RETURNING <returning>;`
    pub(crate) fn insert_sql(&self, table: &str, returning: &str) -> String {
        let columns = self
            .entries
            .iter()
            .map(|(column, _)| quote(column.name()))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=self.entries.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("INSERT INTO {table} ({columns}) VALUES ({placeholders}) RETURNING {returning};")
    }

    /// `UPDATE t SET "a" = ?1, "b" = ?2 WHERE <id> = ?3 RETURNING <returning>;`
    ///
    /// The identity value must be appended as the final parameter.
    pub(crate) fn update_sql(&self, table: &str, id_column: &str, returning: &str) -> String {
        let assignments = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, (column, _))| format!("{} = ?{}", quote(column.name()), index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let id_index = self.entries.len() + 1;
        format!(
            "UPDATE {table} SET {assignments} WHERE {id_column} = ?{id_index} RETURNING {returning};"
        )
    }

    pub(crate) fn into_params(self) -> Vec<Value> {
        self.entries.into_iter().map(|(_, value)| value).collect()
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{identifier}\"")
}

pub(crate) fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub(crate) fn nullable_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}

pub(crate) fn nullable_int(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

pub(crate) fn nullable_date(value: Option<NaiveDate>) -> Value {
    value.map_or(Value::Null, |date| {
        Value::Text(date.format("%Y-%m-%d").to_string())
    })
}
