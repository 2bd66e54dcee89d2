//! Vehicle records.
//!
//! A vehicle is a tractor unit ("cuña") coupled to a trailer unit
//! ("plancha"); each unit carries its own circulation and plate number.
//!
//! # Invariants
//! - A vehicle is created with at least one non-blank identifier.
//! - At most one vehicle references a given driver.

use crate::model::double_option;
use crate::model::driver::{Driver, DriverId};
use crate::model::non_blank;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Store-assigned vehicle identity.
pub type VehicleId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_id: VehicleId,
    #[serde(rename = "cuña_circulation_number", default)]
    pub cuna_circulation_number: Option<String>,
    #[serde(default)]
    pub plancha_circulation_number: Option<String>,
    #[serde(rename = "cuña_plate_number", default)]
    pub cuna_plate_number: Option<String>,
    #[serde(default)]
    pub plancha_plate_number: Option<String>,
    #[serde(default)]
    pub driver_id: Option<DriverId>,
    /// Populated by joined reads when `driver_id` matches a driver row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<Driver>,
}

/// Create payload for one vehicle. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVehicle {
    #[serde(rename = "cuña_circulation_number", default)]
    pub cuna_circulation_number: Option<String>,
    #[serde(default)]
    pub plancha_circulation_number: Option<String>,
    #[serde(rename = "cuña_plate_number", default)]
    pub cuna_plate_number: Option<String>,
    #[serde(default)]
    pub plancha_plate_number: Option<String>,
    #[serde(default)]
    pub driver_id: Option<DriverId>,
}

impl NewVehicle {
    pub fn with_cuna_plate(plate: impl Into<String>) -> Self {
        Self {
            cuna_plate_number: Some(plate.into()),
            ..Self::default()
        }
    }

    pub fn assigned_to(mut self, driver_id: DriverId) -> Self {
        self.driver_id = Some(driver_id);
        self
    }

    pub fn has_identifier(&self) -> bool {
        [
            &self.cuna_circulation_number,
            &self.plancha_circulation_number,
            &self.cuna_plate_number,
            &self.plancha_plate_number,
        ]
        .into_iter()
        .any(|value| non_blank(value.as_deref()).is_some())
    }

    /// True when `vehicle` stores exactly these identifiers, blanks read as
    /// absent.
    pub fn same_identifiers(&self, vehicle: &Vehicle) -> bool {
        let same = |wanted: &Option<String>, stored: &Option<String>| {
            non_blank(wanted.as_deref()) == non_blank(stored.as_deref())
        };
        same(&self.cuna_circulation_number, &vehicle.cuna_circulation_number)
            && same(
                &self.plancha_circulation_number,
                &vehicle.plancha_circulation_number,
            )
            && same(&self.cuna_plate_number, &vehicle.cuna_plate_number)
            && same(&self.plancha_plate_number, &vehicle.plancha_plate_number)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_identifier() {
            return Err(ValidationError::NoVehicleIdentifier);
        }
        Ok(())
    }
}

/// Field-subset update for one vehicle. Every column is nullable, so
/// `Some(None)` clears it; `driver_id: Some(None)` unassigns the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VehiclePatch {
    #[serde(
        rename = "cuña_circulation_number",
        default,
        deserialize_with = "double_option"
    )]
    pub cuna_circulation_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub plancha_circulation_number: Option<Option<String>>,
    #[serde(
        rename = "cuña_plate_number",
        default,
        deserialize_with = "double_option"
    )]
    pub cuna_plate_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub plancha_plate_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub driver_id: Option<Option<DriverId>>,
}

impl VehiclePatch {
    pub fn is_empty(&self) -> bool {
        self.cuna_circulation_number.is_none()
            && self.plancha_circulation_number.is_none()
            && self.cuna_plate_number.is_none()
            && self.plancha_plate_number.is_none()
            && self.driver_id.is_none()
    }

    pub fn touches_identifiers(&self) -> bool {
        self.cuna_circulation_number.is_some()
            || self.plancha_circulation_number.is_some()
            || self.cuna_plate_number.is_some()
            || self.plancha_plate_number.is_some()
    }

    /// Identifiers `current` would carry after this patch, as a create
    /// payload so the creation rules can be checked against it.
    pub fn applied_to(&self, current: &Vehicle) -> NewVehicle {
        let merge = |patched: &Option<Option<String>>, stored: &Option<String>| match patched {
            Some(value) => value.clone(),
            None => stored.clone(),
        };
        NewVehicle {
            cuna_circulation_number: merge(
                &self.cuna_circulation_number,
                &current.cuna_circulation_number,
            ),
            plancha_circulation_number: merge(
                &self.plancha_circulation_number,
                &current.plancha_circulation_number,
            ),
            cuna_plate_number: merge(&self.cuna_plate_number, &current.cuna_plate_number),
            plancha_plate_number: merge(&self.plancha_plate_number, &current.plancha_plate_number),
            driver_id: match self.driver_id {
                Some(value) => value,
                None => current.driver_id,
            },
        }
    }
}
