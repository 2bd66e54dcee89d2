//! Driver records.
//!
//! # Invariants
//! - `identification_number` is the natural key; the store keeps it unique.
//! - `full_name`, `identification_number` and `phone_number` are never blank.

use crate::model::double_option;
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Store-assigned driver identity.
pub type DriverId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub driver_id: DriverId,
    pub full_name: String,
    pub identification_number: String,
    pub phone_number: String,
    #[serde(default)]
    pub operative_license: Option<String>,
}

/// Create payload for one driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDriver {
    pub full_name: String,
    pub identification_number: String,
    pub phone_number: String,
    #[serde(default)]
    pub operative_license: Option<String>,
}

impl NewDriver {
    pub fn new(
        full_name: impl Into<String>,
        identification_number: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            identification_number: identification_number.into(),
            phone_number: phone_number.into(),
            operative_license: None,
        }
    }

    pub fn with_operative_license(mut self, license: impl Into<String>) -> Self {
        self.operative_license = Some(license.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("full_name", &self.full_name)?;
        require_text("identification_number", &self.identification_number)?;
        require_text("phone_number", &self.phone_number)?;
        Ok(())
    }
}

/// Field-subset update for one driver.
///
/// `operative_license: Some(None)` clears the license.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DriverPatch {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub identification_number: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub operative_license: Option<Option<String>>,
}

impl DriverPatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.identification_number.is_none()
            && self.phone_number.is_none()
            && self.operative_license.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(value) = self.full_name.as_deref() {
            require_text("full_name", value)?;
        }
        if let Some(value) = self.identification_number.as_deref() {
            require_text("identification_number", value)?;
        }
        if let Some(value) = self.phone_number.as_deref() {
            require_text("phone_number", value)?;
        }
        Ok(())
    }
}
