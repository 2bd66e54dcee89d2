//! Core data access for haulbook: drivers, their vehicles and their trips.
//! Business invariants live here; front-ends only translate.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::HaulbookConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::driver::{Driver, DriverId, DriverPatch, NewDriver};
pub use model::province::Province;
pub use model::trip::{NewTrip, Trip, TripId, TripPatch};
pub use model::validation::ValidationError;
pub use model::vehicle::{NewVehicle, Vehicle, VehicleId, VehiclePatch};
pub use repo::driver_repo::{DriverRepository, SqliteDriverRepository};
pub use repo::trip_repo::{SqliteTripRepository, TripListQuery, TripRepository};
pub use repo::vehicle_repo::{SqliteVehicleRepository, VehicleRepository};
pub use repo::{RepoError, RepoResult};
pub use rusqlite::Connection;
pub use service::fleet_service::{DriverDetail, DriverLink, FleetService, TripDetail};
pub use service::lifecycle_service::{DriverRemoval, LifecycleService, WipeReport};

/// Fleet service over SQLite repositories sharing one connection.
pub type SqliteFleetService<'conn> = FleetService<
    SqliteDriverRepository<'conn>,
    SqliteVehicleRepository<'conn>,
    SqliteTripRepository<'conn>,
>;

/// Builds a [`SqliteFleetService`] over a migrated connection.
pub fn sqlite_fleet_service(conn: &Connection) -> RepoResult<SqliteFleetService<'_>> {
    Ok(FleetService::new(
        SqliteDriverRepository::try_new(conn)?,
        SqliteVehicleRepository::try_new(conn)?,
        SqliteTripRepository::try_new(conn)?,
    ))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, open_db_in_memory, sqlite_fleet_service};

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn fleet_service_builds_on_fresh_database() {
        let conn = open_db_in_memory().unwrap();
        let service = sqlite_fleet_service(&conn).unwrap();
        assert!(service.get_driver_detail(1).unwrap().is_none());
    }

    #[test]
    fn fleet_service_rejects_unmigrated_connection() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        assert!(sqlite_fleet_service(&conn).is_err());
    }
}
