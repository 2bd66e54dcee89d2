//! Cross-entity use-case service.
//!
//! # Responsibility
//! - Create a driver together with its vehicle, or a vehicle together with
//!   its driver.
//! - Compose driver/vehicle/trip aggregate reads.
//!
//! # Invariants
//! - Driver creation is idempotent on `identification_number`: the store's
//!   unique constraint decides, and a collision resolves to the existing row.
//! - Re-entry with the vehicle the driver already has links nothing new.
//! - Statements inside one flow run strictly in program order; flows are not
//!   atomic across statements.
//! - Every related-row lookup is a direct filtered query.

use crate::model::driver::{Driver, DriverId, NewDriver};
use crate::model::trip::{Trip, TripId};
use crate::model::vehicle::{NewVehicle, Vehicle};
use crate::repo::driver_repo::{DriverRepository, DRIVER_NATURAL_KEY};
use crate::repo::trip_repo::TripRepository;
use crate::repo::vehicle_repo::{VehicleRepository, VEHICLE_DRIVER_KEY};
use crate::repo::RepoResult;
use log::info;
use serde::Serialize;

/// How a new vehicle obtains its driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverLink {
    /// Assign an already stored driver.
    Existing(DriverId),
    /// Create (or re-use, by natural key) a driver first.
    New(NewDriver),
}

/// Driver with its assigned vehicle and trip history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverDetail {
    pub driver: Driver,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
    /// Most recent load first.
    pub trips: Vec<Trip>,
}

/// Trip with its driver and that driver's vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripDetail {
    pub trip: Trip,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<Driver>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
}

/// Relationship orchestrator over the three entity repositories.
pub struct FleetService<D, V, T>
where
    D: DriverRepository,
    V: VehicleRepository,
    T: TripRepository,
{
    drivers: D,
    vehicles: V,
    trips: T,
}

impl<D, V, T> FleetService<D, V, T>
where
    D: DriverRepository,
    V: VehicleRepository,
    T: TripRepository,
{
    pub fn new(drivers: D, vehicles: V, trips: T) -> Self {
        Self {
            drivers,
            vehicles,
            trips,
        }
    }

    pub fn drivers(&self) -> &D {
        &self.drivers
    }

    pub fn vehicles(&self) -> &V {
        &self.vehicles
    }

    pub fn trips(&self) -> &T {
        &self.trips
    }

    /// Creates a driver, or resolves the existing one with the same
    /// `identification_number`, then optionally creates a vehicle assigned
    /// to it.
    ///
    /// # Errors
    /// - `Validation` when either payload is invalid; the vehicle payload is
    ///   checked before anything is written.
    /// - `Conflict` on `vehicles.driver_id` when the resolved driver already
    ///   has a vehicle with different identifiers.
    pub fn create_driver_with_optional_vehicle(
        &self,
        driver: &NewDriver,
        vehicle: Option<&NewVehicle>,
    ) -> RepoResult<Driver> {
        if let Some(vehicle) = vehicle {
            vehicle.validate()?;
        }

        let resolved = self.resolve_driver(driver)?;

        if let Some(vehicle) = vehicle {
            self.link_vehicle(resolved.driver_id, vehicle)?;
        }

        Ok(resolved)
    }

    /// Creates a vehicle, first resolving its driver from `link`.
    pub fn create_vehicle_with_optional_driver(
        &self,
        vehicle: &NewVehicle,
        link: Option<DriverLink>,
    ) -> RepoResult<Vehicle> {
        vehicle.validate()?;

        let driver_id = match link {
            Some(DriverLink::Existing(driver_id)) => Some(driver_id),
            Some(DriverLink::New(new_driver)) => Some(
                self.create_driver_with_optional_vehicle(&new_driver, None)?
                    .driver_id,
            ),
            None => vehicle.driver_id,
        };

        let payload = NewVehicle {
            driver_id,
            ..vehicle.clone()
        };
        self.vehicles.create(&payload)
    }

    /// Loads a driver with its vehicle and trips, most recent load first.
    pub fn get_driver_detail(&self, driver_id: DriverId) -> RepoResult<Option<DriverDetail>> {
        let Some(driver) = self.drivers.get_by_id(driver_id)? else {
            return Ok(None);
        };
        let vehicle = self.vehicles.find_by_driver(driver_id)?;
        let trips = self.trips.list_by_driver(driver_id)?;

        Ok(Some(DriverDetail {
            driver,
            vehicle,
            trips,
        }))
    }

    /// Loads a trip with its driver and that driver's vehicle.
    pub fn get_trip_detail(&self, trip_id: TripId) -> RepoResult<Option<TripDetail>> {
        let Some(trip) = self.trips.get_by_id(trip_id)? else {
            return Ok(None);
        };
        let driver = self.drivers.get_by_id(trip.driver_id)?;
        let vehicle = match driver.as_ref() {
            Some(driver) => self.vehicles.find_by_driver(driver.driver_id)?,
            None => None,
        };

        Ok(Some(TripDetail {
            trip,
            driver,
            vehicle,
        }))
    }

    /// Insert first; a natural-key collision re-fetches the existing row.
    fn resolve_driver(&self, driver: &NewDriver) -> RepoResult<Driver> {
        match self.drivers.create(driver) {
            Ok(created) => {
                info!(
                    "event=driver_create module=service status=ok outcome=created driver_id={}",
                    created.driver_id
                );
                Ok(created)
            }
            Err(err) if err.is_conflict_on(DRIVER_NATURAL_KEY) => {
                let existing = self
                    .drivers
                    .find_by_identification_number(&driver.identification_number)?
                    .ok_or(err)?;
                info!(
                    "event=driver_create module=service status=ok outcome=existing driver_id={}",
                    existing.driver_id
                );
                Ok(existing)
            }
            Err(err) => Err(err),
        }
    }

    /// Insert first; when the driver already holds a vehicle with the same
    /// identifiers, that vehicle stands.
    fn link_vehicle(&self, driver_id: DriverId, vehicle: &NewVehicle) -> RepoResult<()> {
        let assigned = vehicle.clone().assigned_to(driver_id);
        match self.vehicles.create(&assigned) {
            Ok(created) => {
                info!(
                    "event=vehicle_linked module=service status=ok outcome=created driver_id={} vehicle_id={}",
                    driver_id, created.vehicle_id
                );
                Ok(())
            }
            Err(err) if err.is_conflict_on(VEHICLE_DRIVER_KEY) => {
                let current = self
                    .vehicles
                    .find_by_driver(driver_id)?
                    .filter(|current| vehicle.same_identifiers(current))
                    .ok_or(err)?;
                info!(
                    "event=vehicle_linked module=service status=ok outcome=existing driver_id={} vehicle_id={}",
                    driver_id, current.vehicle_id
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
