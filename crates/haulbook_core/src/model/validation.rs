//! Field-level validation errors for create payloads and patches.

use crate::model::driver::DriverId;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent or blank.
    MissingField(&'static str),
    /// A vehicle create payload carries none of the four identifiers.
    NoVehicleIdentifier,
    /// `trip_payment` is not a non-negative decimal string.
    InvalidPayment(String),
    /// `load_time` is not `HH:MM` or `HH:MM:SS`.
    InvalidLoadTime(String),
    /// `province` is not one of the known administrative regions.
    UnknownProvince(String),
    /// `driver_id` does not reference an existing driver.
    UnknownDriver(DriverId),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "`{field}` is required"),
            Self::NoVehicleIdentifier => write!(
                f,
                "at least one circulation or plate number must be provided"
            ),
            Self::InvalidPayment(value) => {
                write!(f, "trip_payment `{value}` is not a valid decimal amount")
            }
            Self::InvalidLoadTime(value) => {
                write!(f, "load_time `{value}` must be HH:MM or HH:MM:SS")
            }
            Self::UnknownProvince(value) => write!(f, "unknown province `{value}`"),
            Self::UnknownDriver(id) => write!(f, "driver {id} does not exist"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}
