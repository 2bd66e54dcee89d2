//! Trip records.
//!
//! # Invariants
//! - Every trip references a driver.
//! - `trip_payment` is kept as decimal text so amounts never pass through
//!   floating point.
//! - Persisted `load_time` is always `HH:MM:SS`, which keeps descending
//!   text ordering chronological.

use crate::model::double_option;
use crate::model::driver::DriverId;
use crate::model::province::Province;
use crate::model::validation::ValidationError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PAYMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d{1,2})?$").expect("valid payment regex"));
static LOAD_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)(?::([0-5]\d))?$").expect("valid load time regex")
});

/// Store-assigned trip identity.
pub type TripId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: TripId,
    pub driver_id: DriverId,
    #[serde(default)]
    pub container_number: Option<String>,
    #[serde(default)]
    pub load_date: Option<NaiveDate>,
    #[serde(default)]
    pub load_time: Option<String>,
    #[serde(default)]
    pub trip_payment: Option<String>,
    #[serde(default)]
    pub province: Option<Province>,
    #[serde(default)]
    pub product: Option<String>,
}

/// Create payload for one trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrip {
    pub driver_id: DriverId,
    #[serde(default)]
    pub container_number: Option<String>,
    #[serde(default)]
    pub load_date: Option<NaiveDate>,
    #[serde(default)]
    pub load_time: Option<String>,
    #[serde(default)]
    pub trip_payment: Option<String>,
    #[serde(default)]
    pub province: Option<Province>,
    #[serde(default)]
    pub product: Option<String>,
}

impl NewTrip {
    pub fn for_driver(driver_id: DriverId) -> Self {
        Self {
            driver_id,
            container_number: None,
            load_date: None,
            load_time: None,
            trip_payment: None,
            province: None,
            product: None,
        }
    }

    pub fn loaded_at(mut self, date: NaiveDate, time: impl Into<String>) -> Self {
        self.load_date = Some(date);
        self.load_time = Some(time.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(payment) = self.trip_payment.as_deref() {
            validate_payment(payment)?;
        }
        if let Some(time) = self.load_time.as_deref() {
            normalize_load_time(time)?;
        }
        Ok(())
    }
}

/// Field-subset update for one trip. `driver_id` can be reassigned but
/// never cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TripPatch {
    #[serde(default)]
    pub driver_id: Option<DriverId>,
    #[serde(default, deserialize_with = "double_option")]
    pub container_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub load_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub load_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub trip_payment: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub province: Option<Option<Province>>,
    #[serde(default, deserialize_with = "double_option")]
    pub product: Option<Option<String>>,
}

impl TripPatch {
    pub fn is_empty(&self) -> bool {
        self.driver_id.is_none()
            && self.container_number.is_none()
            && self.load_date.is_none()
            && self.load_time.is_none()
            && self.trip_payment.is_none()
            && self.province.is_none()
            && self.product.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(Some(payment)) = self.trip_payment.as_ref() {
            validate_payment(payment)?;
        }
        if let Some(Some(time)) = self.load_time.as_ref() {
            normalize_load_time(time)?;
        }
        Ok(())
    }
}

/// Accepts non-negative amounts with at most two decimals, e.g. `175.50`.
pub fn validate_payment(value: &str) -> Result<(), ValidationError> {
    if PAYMENT_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPayment(value.to_string()))
    }
}

/// Normalizes `HH:MM` or `HH:MM:SS` to `HH:MM:SS`.
pub fn normalize_load_time(value: &str) -> Result<String, ValidationError> {
    let caps = LOAD_TIME_RE
        .captures(value.trim())
        .ok_or_else(|| ValidationError::InvalidLoadTime(value.to_string()))?;
    let seconds = caps.get(3).map_or("00", |m| m.as_str());
    Ok(format!("{}:{}:{}", &caps[1], &caps[2], seconds))
}
