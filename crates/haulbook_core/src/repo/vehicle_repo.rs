//! Vehicle repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `vehicles` with driver-joined reads.
//! - Resolve "vehicle of driver" with one filtered query.
//!
//! # Invariants
//! - Reads left-join `drivers`; driver columns are aliased with a
//!   `driver__` prefix so they never collide with vehicle columns.
//! - Blank identifier strings are stored as NULL.
//! - Updates never leave a vehicle without an identifier.
//! - At most one vehicle per driver (unique index on `vehicles.driver_id`).

use super::driver_repo::parse_driver_record;
use super::ensure_table_ready;
use super::error::map_write_error;
use super::statement::{nullable_int, nullable_text, Column, ColumnValues};
use super::{RepoError, RepoResult};
use crate::db::{QueryExecutor, Record};
use crate::model::driver::DriverId;
use crate::model::non_blank;
use crate::model::vehicle::{NewVehicle, Vehicle, VehicleId, VehiclePatch};
use rusqlite::types::Value;
use rusqlite::Connection;

const VEHICLES_TABLE: &str = "vehicles";
const VEHICLE_JOINED_SELECT_SQL: &str = "SELECT
    v.vehicle_id AS vehicle_id,
    v.\"cuña_circulation_number\" AS cuna_circulation_number,
    v.plancha_circulation_number AS plancha_circulation_number,
    v.\"cuña_plate_number\" AS cuna_plate_number,
    v.plancha_plate_number AS plancha_plate_number,
    v.driver_id AS driver_id,
    d.driver_id AS driver__driver_id,
    d.full_name AS driver__full_name,
    d.identification_number AS driver__identification_number,
    d.phone_number AS driver__phone_number,
    d.operative_license AS driver__operative_license
FROM vehicles v
LEFT JOIN drivers d ON d.driver_id = v.driver_id";

/// Column of the one-vehicle-per-driver constraint, as SQLite reports it.
pub const VEHICLE_DRIVER_KEY: &str = "vehicles.driver_id";

/// Caller-settable vehicle columns. `vehicle_id` is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleColumn {
    CunaCirculationNumber,
    PlanchaCirculationNumber,
    CunaPlateNumber,
    PlanchaPlateNumber,
    DriverId,
}

impl VehicleColumn {
    pub const UPDATABLE: [Self; 5] = [
        Self::CunaCirculationNumber,
        Self::PlanchaCirculationNumber,
        Self::CunaPlateNumber,
        Self::PlanchaPlateNumber,
        Self::DriverId,
    ];
}

impl Column for VehicleColumn {
    fn name(self) -> &'static str {
        match self {
            Self::CunaCirculationNumber => "cuña_circulation_number",
            Self::PlanchaCirculationNumber => "plancha_circulation_number",
            Self::CunaPlateNumber => "cuña_plate_number",
            Self::PlanchaPlateNumber => "plancha_plate_number",
            Self::DriverId => "driver_id",
        }
    }
}

/// Repository interface for vehicle operations.
pub trait VehicleRepository {
    /// Lists every vehicle with its assigned driver embedded.
    fn list(&self) -> RepoResult<Vec<Vehicle>>;
    fn get_by_id(&self, id: VehicleId) -> RepoResult<Option<Vehicle>>;
    /// Returns the vehicle assigned to `driver_id`, if any.
    fn find_by_driver(&self, driver_id: DriverId) -> RepoResult<Option<Vehicle>>;
    /// Inserts one vehicle; requires at least one identifier.
    fn create(&self, vehicle: &NewVehicle) -> RepoResult<Vehicle>;
    fn update(&self, id: VehicleId, patch: &VehiclePatch) -> RepoResult<Vehicle>;
    fn delete(&self, id: VehicleId) -> RepoResult<()>;
    /// Clears `driver_id` on the vehicle assigned to `driver_id`.
    fn unassign_driver(&self, driver_id: DriverId) -> RepoResult<usize>;
    fn delete_all(&self) -> RepoResult<usize>;
}

/// SQLite-backed vehicle repository.
pub struct SqliteVehicleRepository<'conn> {
    executor: QueryExecutor<'conn>,
}

impl<'conn> SqliteVehicleRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, VEHICLES_TABLE)?;
        Ok(Self {
            executor: QueryExecutor::new(conn),
        })
    }

    fn load_required(&self, id: VehicleId) -> RepoResult<Vehicle> {
        self.get_by_id(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("vehicle {id} missing after write")))
    }
}

impl VehicleRepository for SqliteVehicleRepository<'_> {
    fn list(&self) -> RepoResult<Vec<Vehicle>> {
        let sql = format!("{VEHICLE_JOINED_SELECT_SQL} ORDER BY v.vehicle_id ASC;");
        self.executor
            .execute(&sql, &[])?
            .iter()
            .map(parse_vehicle_record)
            .collect()
    }

    fn get_by_id(&self, id: VehicleId) -> RepoResult<Option<Vehicle>> {
        let sql = format!("{VEHICLE_JOINED_SELECT_SQL} WHERE v.vehicle_id = ?1;");
        let records = self.executor.execute(&sql, &[Value::Integer(id)])?;
        records.first().map(parse_vehicle_record).transpose()
    }

    fn find_by_driver(&self, driver_id: DriverId) -> RepoResult<Option<Vehicle>> {
        let sql = format!(
            "{VEHICLE_JOINED_SELECT_SQL} WHERE v.driver_id = ?1 ORDER BY v.vehicle_id ASC LIMIT 1;"
        );
        let records = self.executor.execute(&sql, &[Value::Integer(driver_id)])?;
        records.first().map(parse_vehicle_record).transpose()
    }

    fn create(&self, vehicle: &NewVehicle) -> RepoResult<Vehicle> {
        vehicle.validate()?;

        let mut values = ColumnValues::new();
        let identifiers = [
            (
                VehicleColumn::CunaCirculationNumber,
                &vehicle.cuna_circulation_number,
            ),
            (
                VehicleColumn::PlanchaCirculationNumber,
                &vehicle.plancha_circulation_number,
            ),
            (VehicleColumn::CunaPlateNumber, &vehicle.cuna_plate_number),
            (
                VehicleColumn::PlanchaPlateNumber,
                &vehicle.plancha_plate_number,
            ),
        ];
        for (column, value) in identifiers {
            if let Some(value) = non_blank(value.as_deref()) {
                values.set(column, nullable_text(Some(value)));
            }
        }
        if let Some(driver_id) = vehicle.driver_id {
            values.set(VehicleColumn::DriverId, Value::Integer(driver_id));
        }

        let sql = values.insert_sql(VEHICLES_TABLE, "vehicle_id");
        let records = self
            .executor
            .execute(&sql, &values.into_params())
            .map_err(|err| map_write_error(err, vehicle.driver_id))?;
        let vehicle_id: VehicleId = records
            .first()
            .ok_or_else(|| RepoError::InvalidData("vehicle insert returned no row".to_string()))?
            .get("vehicle_id")?;
        self.load_required(vehicle_id)
    }

    fn update(&self, id: VehicleId, patch: &VehiclePatch) -> RepoResult<Vehicle> {
        if patch.is_empty() {
            return Err(RepoError::NoFields("vehicle"));
        }
        if patch.touches_identifiers() {
            let current = self.get_by_id(id)?.ok_or(RepoError::NotFound {
                entity: "vehicle",
                id,
            })?;
            patch.applied_to(&current).validate()?;
        }

        let values = patch_values(patch);

        let sql = values.update_sql(VEHICLES_TABLE, "vehicle_id", "vehicle_id");
        let mut params = values.into_params();
        params.push(Value::Integer(id));

        let driver_ref = patch.driver_id.flatten();
        let records = self
            .executor
            .execute(&sql, &params)
            .map_err(|err| map_write_error(err, driver_ref))?;
        if records.is_empty() {
            return Err(RepoError::NotFound {
                entity: "vehicle",
                id,
            });
        }
        self.load_required(id)
    }

    fn delete(&self, id: VehicleId) -> RepoResult<()> {
        self.executor.execute_count(
            "DELETE FROM vehicles WHERE vehicle_id = ?1;",
            &[Value::Integer(id)],
        )?;
        Ok(())
    }

    fn unassign_driver(&self, driver_id: DriverId) -> RepoResult<usize> {
        Ok(self.executor.execute_count(
            "UPDATE vehicles SET driver_id = NULL WHERE driver_id = ?1;",
            &[Value::Integer(driver_id)],
        )?)
    }

    fn delete_all(&self) -> RepoResult<usize> {
        Ok(self.executor.execute_count("DELETE FROM vehicles;", &[])?)
    }
}

fn patch_values(patch: &VehiclePatch) -> ColumnValues<VehicleColumn> {
    let mut values = ColumnValues::new();
    for column in VehicleColumn::UPDATABLE {
        let identifier = |value: &Option<Option<String>>| {
            value
                .as_ref()
                .map(|inner| nullable_text(non_blank(inner.as_deref())))
        };
        let value = match column {
            VehicleColumn::CunaCirculationNumber => identifier(&patch.cuna_circulation_number),
            VehicleColumn::PlanchaCirculationNumber => {
                identifier(&patch.plancha_circulation_number)
            }
            VehicleColumn::CunaPlateNumber => identifier(&patch.cuna_plate_number),
            VehicleColumn::PlanchaPlateNumber => identifier(&patch.plancha_plate_number),
            VehicleColumn::DriverId => patch.driver_id.map(nullable_int),
        };
        if let Some(value) = value {
            values.set(column, value);
        }
    }
    values
}

fn parse_vehicle_record(record: &Record) -> RepoResult<Vehicle> {
    let driver = match record.get::<Option<DriverId>>("driver__driver_id")? {
        Some(_) => Some(parse_driver_record(record, "driver__")?),
        None => None,
    };

    Ok(Vehicle {
        vehicle_id: record.get("vehicle_id")?,
        cuna_circulation_number: record.get("cuna_circulation_number")?,
        plancha_circulation_number: record.get("plancha_circulation_number")?,
        cuna_plate_number: record.get("cuna_plate_number")?,
        plancha_plate_number: record.get("plancha_plate_number")?,
        driver_id: record.get("driver_id")?,
        driver,
    })
}
