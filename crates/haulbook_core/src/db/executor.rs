//! Parameterized statement execution.
//!
//! # Responsibility
//! - Run one statement with positionally bound parameters.
//! - Materialize result rows as ordered field-name/value records.
//! - Classify and log store failures before they propagate.
//!
//! # Invariants
//! - Parameters are bound with `?N` placeholders only.
//! - Parameter values never reach the log; only statement kind, timing,
//!   row counts and error kind do.
//! - No retry is attempted here.

use log::{debug, error};
use rusqlite::ffi;
use rusqlite::types::{FromSql, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type QueryResult<T> = Result<T, QueryError>;

/// Store failure category derived from the SQLite result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// `UNIQUE` or primary-key constraint rejected the write.
    UniqueViolation,
    /// `REFERENCES` constraint rejected the write.
    ForeignKeyViolation,
    /// Connectivity, syntax or any other failure.
    Other,
}

impl QueryErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::UniqueViolation => "unique_violation",
            Self::ForeignKeyViolation => "foreign_key_violation",
            Self::Other => "other",
        }
    }
}

/// Opaque statement failure carrying the underlying SQLite cause.
#[derive(Debug)]
pub struct QueryError {
    kind: QueryErrorKind,
    constraint: Option<String>,
    source: rusqlite::Error,
}

impl QueryError {
    pub fn kind(&self) -> QueryErrorKind {
        self.kind
    }

    /// Failing `table.column` list for unique violations, e.g.
    /// `drivers.identification_number`.
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }

    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        self.kind == QueryErrorKind::UniqueViolation
            && self
                .constraint
                .as_deref()
                .is_some_and(|value| value.split(',').any(|part| part.trim() == column))
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "query failed ({}): {}", self.kind.as_str(), self.source)
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(value: rusqlite::Error) -> Self {
        let (kind, constraint) = classify(&value);
        Self {
            kind,
            constraint,
            source: value,
        }
    }
}

/// Error raised when a record field is absent or has an unexpected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub column: String,
    pub message: String,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "column `{}`: {}", self.column, self.message)
    }
}

impl Error for FieldError {}

/// One result row as ordered `(column, value)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Returns the raw value of `column`, if the row carries it.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Converts one field into `T`.
    pub fn get<T: FromSql>(&self, column: &str) -> Result<T, FieldError> {
        let value = self.value(column).ok_or_else(|| FieldError {
            column: column.to_string(),
            message: "missing from result row".to_string(),
        })?;
        T::column_result(ValueRef::from(value)).map_err(|err| FieldError {
            column: column.to_string(),
            message: err.to_string(),
        })
    }

}

/// Thin statement runner over a borrowed connection.
#[derive(Clone, Copy)]
pub struct QueryExecutor<'conn> {
    conn: &'conn Connection,
}

impl<'conn> QueryExecutor<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Executes a statement and returns every produced row.
    ///
    /// Reads return their rows in store order unless the statement orders
    /// them; writes return rows only when the statement has `RETURNING`.
    pub fn execute(&self, sql: &str, params: &[Value]) -> QueryResult<Vec<Record>> {
        let started_at = Instant::now();
        match self.collect_rows(sql, params) {
            Ok(records) => {
                debug!(
                    "event=query_execute module=db status=ok statement={} duration_ms={} rows={}",
                    statement_kind(sql),
                    started_at.elapsed().as_millis(),
                    records.len()
                );
                Ok(records)
            }
            Err(err) => Err(log_failure(sql, started_at, err.into())),
        }
    }

    /// Executes a write statement and returns the affected-row count.
    pub fn execute_count(&self, sql: &str, params: &[Value]) -> QueryResult<usize> {
        let started_at = Instant::now();
        let outcome = self
            .conn
            .prepare(sql)
            .and_then(|mut stmt| stmt.execute(params_from_iter(params.iter())));
        match outcome {
            Ok(changed) => {
                debug!(
                    "event=query_execute module=db status=ok statement={} duration_ms={} changed={}",
                    statement_kind(sql),
                    started_at.elapsed().as_millis(),
                    changed
                );
                Ok(changed)
            }
            Err(err) => Err(log_failure(sql, started_at, err.into())),
        }
    }

    fn collect_rows(&self, sql: &str, params: &[Value]) -> rusqlite::Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut fields = Vec::with_capacity(columns.len());
            for (index, column) in columns.iter().enumerate() {
                fields.push((column.clone(), row.get::<_, Value>(index)?));
            }
            records.push(Record { fields });
        }
        Ok(records)
    }
}

fn log_failure(sql: &str, started_at: Instant, err: QueryError) -> QueryError {
    error!(
        "event=query_execute module=db status=error statement={} duration_ms={} error_kind={} error={}",
        statement_kind(sql),
        started_at.elapsed().as_millis(),
        err.kind.as_str(),
        err.source
    );
    err
}

fn classify(err: &rusqlite::Error) -> (QueryErrorKind, Option<String>) {
    if let rusqlite::Error::SqliteFailure(failure, message) = err {
        if failure.code == ErrorCode::ConstraintViolation {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    // SQLite reports "UNIQUE constraint failed: table.col[, table.col]".
                    let constraint = message
                        .as_deref()
                        .and_then(|text| text.split_once(": "))
                        .map(|(_, columns)| columns.trim().to_string());
                    return (QueryErrorKind::UniqueViolation, constraint);
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return (QueryErrorKind::ForeignKeyViolation, None);
                }
                _ => {}
            }
        }
    }
    (QueryErrorKind::Other, None)
}

fn statement_kind(sql: &str) -> String {
    sql.split_whitespace()
        .next()
        .unwrap_or("unknown")
        .to_ascii_lowercase()
}
