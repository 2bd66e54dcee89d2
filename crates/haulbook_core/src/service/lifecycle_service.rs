//! Multi-entity deletion use-cases.
//!
//! # Responsibility
//! - Wipe all three tables in dependency order.
//! - Remove a driver together with the rows that reference it.
//!
//! # Invariants
//! - Child rows go before parent rows: trips, then vehicles, then drivers.
//! - Each operation runs in one `IMMEDIATE` transaction; any failed step
//!   rolls back every earlier step.

use crate::model::driver::DriverId;
use crate::repo::driver_repo::{DriverRepository, SqliteDriverRepository};
use crate::repo::trip_repo::{SqliteTripRepository, TripRepository};
use crate::repo::vehicle_repo::{SqliteVehicleRepository, VehicleRepository};
use crate::repo::RepoResult;
use log::{error, info};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::time::Instant;

/// Row counts removed by `wipe_all`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WipeReport {
    pub trips: usize,
    pub vehicles: usize,
    pub drivers: usize,
}

/// Outcome of `remove_driver`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DriverRemoval {
    pub trips: usize,
    pub vehicles_unassigned: usize,
    /// False when no driver had the given id.
    pub driver_deleted: bool,
}

/// Lifecycle service over an exclusively borrowed connection.
pub struct LifecycleService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> LifecycleService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Deletes every trip, vehicle and driver, all or nothing.
    pub fn wipe_all(&mut self) -> RepoResult<WipeReport> {
        let started_at = Instant::now();
        let outcome = self.run_wipe();
        match &outcome {
            Ok(report) => info!(
                "event=wipe_all module=service status=ok duration_ms={} trips={} vehicles={} drivers={}",
                started_at.elapsed().as_millis(),
                report.trips,
                report.vehicles,
                report.drivers
            ),
            Err(err) => error!(
                "event=wipe_all module=service status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        outcome
    }

    /// Deletes a driver's trips, unassigns its vehicle and deletes the
    /// driver, all or nothing. A missing driver is not an error.
    pub fn remove_driver(&mut self, driver_id: DriverId) -> RepoResult<DriverRemoval> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removal = {
            let drivers = SqliteDriverRepository::try_new(&tx)?;
            let vehicles = SqliteVehicleRepository::try_new(&tx)?;
            let trips = SqliteTripRepository::try_new(&tx)?;

            let driver_exists = drivers.get_by_id(driver_id)?.is_some();
            let trips_removed = trips.delete_by_driver(driver_id)?;
            let vehicles_unassigned = vehicles.unassign_driver(driver_id)?;
            drivers.delete(driver_id)?;

            DriverRemoval {
                trips: trips_removed,
                vehicles_unassigned,
                driver_deleted: driver_exists,
            }
        };
        tx.commit()?;

        info!(
            "event=driver_remove module=service status=ok driver_id={} trips={} vehicles_unassigned={} deleted={}",
            driver_id, removal.trips, removal.vehicles_unassigned, removal.driver_deleted
        );
        Ok(removal)
    }

    fn run_wipe(&mut self) -> RepoResult<WipeReport> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let report = {
            let trips = SqliteTripRepository::try_new(&tx)?;
            let vehicles = SqliteVehicleRepository::try_new(&tx)?;
            let drivers = SqliteDriverRepository::try_new(&tx)?;

            WipeReport {
                trips: trips.delete_all()?,
                vehicles: vehicles.delete_all()?,
                drivers: drivers.delete_all()?,
            }
        };
        tx.commit()?;
        Ok(report)
    }
}
