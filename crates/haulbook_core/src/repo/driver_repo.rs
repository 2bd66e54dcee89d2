//! Driver repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and natural-key lookup over `drivers`.
//! - Surface natural-key collisions as `RepoError::Conflict`.
//!
//! # Invariants
//! - `identification_number` uniqueness is enforced by the store, not here.
//! - Deleting a driver still referenced by a vehicle or trip is rejected
//!   with `RepoError::Referenced`; the cascade lives in `LifecycleService`.

use super::ensure_table_ready;
use super::error::map_write_error;
use super::statement::{nullable_text, text, Column, ColumnValues};
use super::{RepoError, RepoResult};
use crate::db::{QueryErrorKind, QueryExecutor, Record};
use crate::model::driver::{Driver, DriverId, DriverPatch, NewDriver};
use rusqlite::types::Value;
use rusqlite::Connection;

const DRIVERS_TABLE: &str = "drivers";
const DRIVER_COLUMNS_SQL: &str =
    "driver_id, full_name, identification_number, phone_number, operative_license";

/// Column of the natural-key constraint, as SQLite reports it.
pub const DRIVER_NATURAL_KEY: &str = "drivers.identification_number";

/// Caller-settable driver columns. `driver_id` is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverColumn {
    FullName,
    IdentificationNumber,
    PhoneNumber,
    OperativeLicense,
}

impl DriverColumn {
    pub const UPDATABLE: [Self; 4] = [
        Self::FullName,
        Self::IdentificationNumber,
        Self::PhoneNumber,
        Self::OperativeLicense,
    ];
}

impl Column for DriverColumn {
    fn name(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::IdentificationNumber => "identification_number",
            Self::PhoneNumber => "phone_number",
            Self::OperativeLicense => "operative_license",
        }
    }
}

/// Repository interface for driver operations.
pub trait DriverRepository {
    /// Lists every driver ordered by identity.
    fn list(&self) -> RepoResult<Vec<Driver>>;
    fn get_by_id(&self, id: DriverId) -> RepoResult<Option<Driver>>;
    /// Looks a driver up by its natural key.
    fn find_by_identification_number(&self, identification_number: &str)
        -> RepoResult<Option<Driver>>;
    /// Inserts one driver; a natural-key collision is `RepoError::Conflict`.
    fn create(&self, driver: &NewDriver) -> RepoResult<Driver>;
    /// Applies a field-subset patch and returns the updated row.
    fn update(&self, id: DriverId, patch: &DriverPatch) -> RepoResult<Driver>;
    fn delete(&self, id: DriverId) -> RepoResult<()>;
    /// Deletes every driver and returns the removed row count.
    fn delete_all(&self) -> RepoResult<usize>;
}

/// SQLite-backed driver repository.
pub struct SqliteDriverRepository<'conn> {
    executor: QueryExecutor<'conn>,
}

impl<'conn> SqliteDriverRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, DRIVERS_TABLE)?;
        Ok(Self {
            executor: QueryExecutor::new(conn),
        })
    }

    fn query_one(&self, sql: &str, params: &[Value]) -> RepoResult<Option<Driver>> {
        let records = self.executor.execute(sql, params)?;
        records
            .first()
            .map(|record| parse_driver_record(record, ""))
            .transpose()
    }
}

impl DriverRepository for SqliteDriverRepository<'_> {
    fn list(&self) -> RepoResult<Vec<Driver>> {
        let sql = format!("SELECT {DRIVER_COLUMNS_SQL} FROM drivers ORDER BY driver_id ASC;");
        self.executor
            .execute(&sql, &[])?
            .iter()
            .map(|record| parse_driver_record(record, ""))
            .collect()
    }

    fn get_by_id(&self, id: DriverId) -> RepoResult<Option<Driver>> {
        let sql = format!("SELECT {DRIVER_COLUMNS_SQL} FROM drivers WHERE driver_id = ?1;");
        self.query_one(&sql, &[Value::Integer(id)])
    }

    fn find_by_identification_number(
        &self,
        identification_number: &str,
    ) -> RepoResult<Option<Driver>> {
        let sql =
            format!("SELECT {DRIVER_COLUMNS_SQL} FROM drivers WHERE identification_number = ?1;");
        self.query_one(&sql, &[text(identification_number)])
    }

    fn create(&self, driver: &NewDriver) -> RepoResult<Driver> {
        driver.validate()?;

        let mut values = ColumnValues::new();
        values.set(DriverColumn::FullName, text(&driver.full_name));
        values.set(
            DriverColumn::IdentificationNumber,
            text(&driver.identification_number),
        );
        values.set(DriverColumn::PhoneNumber, text(&driver.phone_number));
        if let Some(license) = driver.operative_license.as_deref() {
            values.set(DriverColumn::OperativeLicense, text(license));
        }

        let sql = values.insert_sql(DRIVERS_TABLE, DRIVER_COLUMNS_SQL);
        let records = self
            .executor
            .execute(&sql, &values.into_params())
            .map_err(|err| map_write_error(err, None))?;
        let record = records.first().ok_or_else(|| {
            RepoError::InvalidData("driver insert returned no row".to_string())
        })?;
        parse_driver_record(record, "")
    }

    fn update(&self, id: DriverId, patch: &DriverPatch) -> RepoResult<Driver> {
        if patch.is_empty() {
            return Err(RepoError::NoFields("driver"));
        }
        patch.validate()?;
        let values = patch_values(patch);

        let sql = values.update_sql(DRIVERS_TABLE, "driver_id", DRIVER_COLUMNS_SQL);
        let mut params = values.into_params();
        params.push(Value::Integer(id));

        let records = self
            .executor
            .execute(&sql, &params)
            .map_err(|err| map_write_error(err, None))?;
        match records.first() {
            Some(record) => parse_driver_record(record, ""),
            None => Err(RepoError::NotFound {
                entity: "driver",
                id,
            }),
        }
    }

    fn delete(&self, id: DriverId) -> RepoResult<()> {
        match self.executor.execute_count(
            "DELETE FROM drivers WHERE driver_id = ?1;",
            &[Value::Integer(id)],
        ) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == QueryErrorKind::ForeignKeyViolation => {
                Err(RepoError::Referenced {
                    entity: "driver",
                    id,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn delete_all(&self) -> RepoResult<usize> {
        Ok(self.executor.execute_count("DELETE FROM drivers;", &[])?)
    }
}

/// Builds SET assignments by walking the whitelist in declaration order.
fn patch_values(patch: &DriverPatch) -> ColumnValues<DriverColumn> {
    let mut values = ColumnValues::new();
    for column in DriverColumn::UPDATABLE {
        let value = match column {
            DriverColumn::FullName => patch.full_name.as_deref().map(text),
            DriverColumn::IdentificationNumber => {
                patch.identification_number.as_deref().map(text)
            }
            DriverColumn::PhoneNumber => patch.phone_number.as_deref().map(text),
            DriverColumn::OperativeLicense => patch
                .operative_license
                .as_ref()
                .map(|license| nullable_text(license.as_deref())),
        };
        if let Some(value) = value {
            values.set(column, value);
        }
    }
    values
}

/// Maps a record carrying driver columns, optionally under an alias prefix
/// (joined reads use `driver__`).
pub(crate) fn parse_driver_record(record: &Record, prefix: &str) -> RepoResult<Driver> {
    let column = |name: &str| format!("{prefix}{name}");
    Ok(Driver {
        driver_id: record.get(&column("driver_id"))?,
        full_name: record.get(&column("full_name"))?,
        identification_number: record.get(&column("identification_number"))?,
        phone_number: record.get(&column("phone_number"))?,
        operative_license: record.get(&column("operative_license"))?,
    })
}
