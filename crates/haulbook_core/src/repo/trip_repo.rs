//! Trip repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `trips` and per-driver trip history.
//! - Provide filtered listing with fixed SQL fragments and bound values.
//!
//! # Invariants
//! - Per-driver history is ordered `load_date DESC, load_time DESC,
//!   trip_id DESC`; trips without a date sort last.
//! - A `driver_id` that matches no driver is a validation error.
//! - Stored provinces outside the known list are reported as invalid data.

use super::ensure_table_ready;
use super::error::map_write_error;
use super::statement::{nullable_date, nullable_text, text, Column, ColumnValues};
use super::{RepoError, RepoResult};
use crate::db::{QueryExecutor, Record};
use crate::model::driver::DriverId;
use crate::model::province::Province;
use crate::model::trip::{normalize_load_time, validate_payment, NewTrip, Trip, TripId, TripPatch};
use crate::model::validation::ValidationError;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::Connection;

const TRIPS_TABLE: &str = "trips";
const TRIP_COLUMNS_SQL: &str = "trip_id, driver_id, container_number, load_date, load_time, \
     trip_payment, province, product";
const TRIP_HISTORY_ORDER_SQL: &str = " ORDER BY load_date DESC, load_time DESC, trip_id DESC";

/// Caller-settable trip columns. `trip_id` is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripColumn {
    DriverId,
    ContainerNumber,
    LoadDate,
    LoadTime,
    TripPayment,
    Province,
    Product,
}

impl TripColumn {
    pub const UPDATABLE: [Self; 7] = [
        Self::DriverId,
        Self::ContainerNumber,
        Self::LoadDate,
        Self::LoadTime,
        Self::TripPayment,
        Self::Province,
        Self::Product,
    ];
}

impl Column for TripColumn {
    fn name(self) -> &'static str {
        match self {
            Self::DriverId => "driver_id",
            Self::ContainerNumber => "container_number",
            Self::LoadDate => "load_date",
            Self::LoadTime => "load_time",
            Self::TripPayment => "trip_payment",
            Self::Province => "province",
            Self::Product => "product",
        }
    }
}

/// Filter options for trip listing. Every field is optional and combined
/// with `AND`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripListQuery {
    pub driver_id: Option<DriverId>,
    pub province: Option<Province>,
    /// Case-insensitive substring match.
    pub product: Option<String>,
    /// Case-insensitive substring match.
    pub container_number: Option<String>,
    /// Inclusive lower bound.
    pub load_date_from: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub load_date_to: Option<NaiveDate>,
    /// Decimal text, inclusive.
    pub payment_min: Option<String>,
    /// Decimal text, inclusive.
    pub payment_max: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for trip operations.
pub trait TripRepository {
    /// Lists every trip ordered by identity.
    fn list(&self) -> RepoResult<Vec<Trip>>;
    fn get_by_id(&self, id: TripId) -> RepoResult<Option<Trip>>;
    /// Lists one driver's trips, most recent load first.
    fn list_by_driver(&self, driver_id: DriverId) -> RepoResult<Vec<Trip>>;
    /// Lists trips matching `query`, most recent load first.
    fn list_filtered(&self, query: &TripListQuery) -> RepoResult<Vec<Trip>>;
    fn create(&self, trip: &NewTrip) -> RepoResult<Trip>;
    fn update(&self, id: TripId, patch: &TripPatch) -> RepoResult<Trip>;
    fn delete(&self, id: TripId) -> RepoResult<()>;
    /// Deletes one driver's trips and returns the removed row count.
    fn delete_by_driver(&self, driver_id: DriverId) -> RepoResult<usize>;
    fn delete_all(&self) -> RepoResult<usize>;
}

/// SQLite-backed trip repository.
pub struct SqliteTripRepository<'conn> {
    executor: QueryExecutor<'conn>,
}

impl<'conn> SqliteTripRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, TRIPS_TABLE)?;
        Ok(Self {
            executor: QueryExecutor::new(conn),
        })
    }

    fn query_many(&self, sql: &str, params: &[Value]) -> RepoResult<Vec<Trip>> {
        self.executor
            .execute(sql, params)?
            .iter()
            .map(parse_trip_record)
            .collect()
    }
}

impl TripRepository for SqliteTripRepository<'_> {
    fn list(&self) -> RepoResult<Vec<Trip>> {
        let sql = format!("SELECT {TRIP_COLUMNS_SQL} FROM trips ORDER BY trip_id ASC;");
        self.query_many(&sql, &[])
    }

    fn get_by_id(&self, id: TripId) -> RepoResult<Option<Trip>> {
        let sql = format!("SELECT {TRIP_COLUMNS_SQL} FROM trips WHERE trip_id = ?1;");
        let records = self.executor.execute(&sql, &[Value::Integer(id)])?;
        records.first().map(parse_trip_record).transpose()
    }

    fn list_by_driver(&self, driver_id: DriverId) -> RepoResult<Vec<Trip>> {
        let sql = format!(
            "SELECT {TRIP_COLUMNS_SQL} FROM trips WHERE driver_id = ?1{TRIP_HISTORY_ORDER_SQL};"
        );
        self.query_many(&sql, &[Value::Integer(driver_id)])
    }

    fn list_filtered(&self, query: &TripListQuery) -> RepoResult<Vec<Trip>> {
        for bound in [query.payment_min.as_deref(), query.payment_max.as_deref()]
            .into_iter()
            .flatten()
        {
            validate_payment(bound)?;
        }

        let mut sql = format!("SELECT {TRIP_COLUMNS_SQL} FROM trips WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(driver_id) = query.driver_id {
            sql.push_str(" AND driver_id = ?");
            bind_values.push(Value::Integer(driver_id));
        }
        if let Some(province) = query.province {
            sql.push_str(" AND province = ?");
            bind_values.push(text(province.as_str()));
        }
        if let Some(product) = query.product.as_deref() {
            sql.push_str(" AND instr(lower(product), lower(?)) > 0");
            bind_values.push(text(product));
        }
        if let Some(container) = query.container_number.as_deref() {
            sql.push_str(" AND instr(lower(container_number), lower(?)) > 0");
            bind_values.push(text(container));
        }
        if let Some(from) = query.load_date_from {
            sql.push_str(" AND load_date >= ?");
            bind_values.push(nullable_date(Some(from)));
        }
        if let Some(to) = query.load_date_to {
            sql.push_str(" AND load_date <= ?");
            bind_values.push(nullable_date(Some(to)));
        }
        if let Some(min) = query.payment_min.as_deref() {
            sql.push_str(" AND CAST(trip_payment AS REAL) >= CAST(? AS REAL)");
            bind_values.push(text(min));
        }
        if let Some(max) = query.payment_max.as_deref() {
            sql.push_str(" AND CAST(trip_payment AS REAL) <= CAST(? AS REAL)");
            bind_values.push(text(max));
        }

        sql.push_str(TRIP_HISTORY_ORDER_SQL);

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        self.query_many(&sql, &bind_values)
    }

    fn create(&self, trip: &NewTrip) -> RepoResult<Trip> {
        trip.validate()?;

        let mut values = ColumnValues::new();
        values.set(TripColumn::DriverId, Value::Integer(trip.driver_id));
        if let Some(container) = trip.container_number.as_deref() {
            values.set(TripColumn::ContainerNumber, text(container));
        }
        if let Some(date) = trip.load_date {
            values.set(TripColumn::LoadDate, nullable_date(Some(date)));
        }
        if let Some(time) = trip.load_time.as_deref() {
            values.set(TripColumn::LoadTime, text(&normalize_load_time(time)?));
        }
        if let Some(payment) = trip.trip_payment.as_deref() {
            values.set(TripColumn::TripPayment, text(payment));
        }
        if let Some(province) = trip.province {
            values.set(TripColumn::Province, text(province.as_str()));
        }
        if let Some(product) = trip.product.as_deref() {
            values.set(TripColumn::Product, text(product));
        }

        let sql = values.insert_sql(TRIPS_TABLE, TRIP_COLUMNS_SQL);
        let records = self
            .executor
            .execute(&sql, &values.into_params())
            .map_err(|err| map_write_error(err, Some(trip.driver_id)))?;
        let record = records
            .first()
            .ok_or_else(|| RepoError::InvalidData("trip insert returned no row".to_string()))?;
        parse_trip_record(record)
    }

    fn update(&self, id: TripId, patch: &TripPatch) -> RepoResult<Trip> {
        if patch.is_empty() {
            return Err(RepoError::NoFields("trip"));
        }
        patch.validate()?;
        let values = patch_values(patch)?;

        let sql = values.update_sql(TRIPS_TABLE, "trip_id", TRIP_COLUMNS_SQL);
        let mut params = values.into_params();
        params.push(Value::Integer(id));

        let records = self
            .executor
            .execute(&sql, &params)
            .map_err(|err| map_write_error(err, patch.driver_id))?;
        match records.first() {
            Some(record) => parse_trip_record(record),
            None => Err(RepoError::NotFound { entity: "trip", id }),
        }
    }

    fn delete(&self, id: TripId) -> RepoResult<()> {
        self.executor
            .execute_count("DELETE FROM trips WHERE trip_id = ?1;", &[Value::Integer(id)])?;
        Ok(())
    }

    fn delete_by_driver(&self, driver_id: DriverId) -> RepoResult<usize> {
        Ok(self.executor.execute_count(
            "DELETE FROM trips WHERE driver_id = ?1;",
            &[Value::Integer(driver_id)],
        )?)
    }

    fn delete_all(&self) -> RepoResult<usize> {
        Ok(self.executor.execute_count("DELETE FROM trips;", &[])?)
    }
}

fn patch_values(patch: &TripPatch) -> Result<ColumnValues<TripColumn>, ValidationError> {
    let mut values = ColumnValues::new();
    for column in TripColumn::UPDATABLE {
        let value = match column {
            TripColumn::DriverId => patch.driver_id.map(Value::Integer),
            TripColumn::ContainerNumber => patch
                .container_number
                .as_ref()
                .map(|value| nullable_text(value.as_deref())),
            TripColumn::LoadDate => patch.load_date.map(nullable_date),
            TripColumn::LoadTime => match patch.load_time.as_ref() {
                Some(Some(time)) => Some(text(&normalize_load_time(time)?)),
                Some(None) => Some(Value::Null),
                None => None,
            },
            TripColumn::TripPayment => patch
                .trip_payment
                .as_ref()
                .map(|value| nullable_text(value.as_deref())),
            TripColumn::Province => patch
                .province
                .map(|value| nullable_text(value.map(Province::as_str))),
            TripColumn::Product => patch
                .product
                .as_ref()
                .map(|value| nullable_text(value.as_deref())),
        };
        if let Some(value) = value {
            values.set(column, value);
        }
    }
    Ok(values)
}

fn parse_trip_record(record: &Record) -> RepoResult<Trip> {
    let trip_id: TripId = record.get("trip_id")?;
    let province = match record.get::<Option<String>>("province")? {
        Some(name) => Some(name.parse::<Province>().map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid province `{name}` in trips.province for trip_id={trip_id}"
            ))
        })?),
        None => None,
    };

    Ok(Trip {
        trip_id,
        driver_id: record.get("driver_id")?,
        container_number: record.get("container_number")?,
        load_date: record.get("load_date")?,
        load_time: record.get("load_time")?,
        trip_payment: record.get("trip_payment")?,
        province,
        product: record.get("product")?,
    })
}
