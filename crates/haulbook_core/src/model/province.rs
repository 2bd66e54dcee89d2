//! Administrative regions a trip can be loaded in.
//!
//! The store keeps the display name as free text; this enum is the only
//! place the closed list is enforced.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Fifteen provinces plus the special municipality, west to east.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Province {
    #[serde(rename = "Pinar del Río")]
    PinarDelRio,
    #[serde(rename = "Artemisa")]
    Artemisa,
    #[serde(rename = "La Habana")]
    LaHabana,
    #[serde(rename = "Mayabeque")]
    Mayabeque,
    #[serde(rename = "Matanzas")]
    Matanzas,
    #[serde(rename = "Cienfuegos")]
    Cienfuegos,
    #[serde(rename = "Villa Clara")]
    VillaClara,
    #[serde(rename = "Sancti Spíritus")]
    SanctiSpiritus,
    #[serde(rename = "Ciego de Ávila")]
    CiegoDeAvila,
    #[serde(rename = "Camagüey")]
    Camaguey,
    #[serde(rename = "Las Tunas")]
    LasTunas,
    #[serde(rename = "Granma")]
    Granma,
    #[serde(rename = "Holguín")]
    Holguin,
    #[serde(rename = "Santiago de Cuba")]
    SantiagoDeCuba,
    #[serde(rename = "Guantánamo")]
    Guantanamo,
    #[serde(rename = "Isla de la Juventud")]
    IslaDeLaJuventud,
}

impl Province {
    pub const ALL: [Province; 16] = [
        Self::PinarDelRio,
        Self::Artemisa,
        Self::LaHabana,
        Self::Mayabeque,
        Self::Matanzas,
        Self::Cienfuegos,
        Self::VillaClara,
        Self::SanctiSpiritus,
        Self::CiegoDeAvila,
        Self::Camaguey,
        Self::LasTunas,
        Self::Granma,
        Self::Holguin,
        Self::SantiagoDeCuba,
        Self::Guantanamo,
        Self::IslaDeLaJuventud,
    ];

    /// Display name, also the persisted value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PinarDelRio => "Pinar del Río",
            Self::Artemisa => "Artemisa",
            Self::LaHabana => "La Habana",
            Self::Mayabeque => "Mayabeque",
            Self::Matanzas => "Matanzas",
            Self::Cienfuegos => "Cienfuegos",
            Self::VillaClara => "Villa Clara",
            Self::SanctiSpiritus => "Sancti Spíritus",
            Self::CiegoDeAvila => "Ciego de Ávila",
            Self::Camaguey => "Camagüey",
            Self::LasTunas => "Las Tunas",
            Self::Granma => "Granma",
            Self::Holguin => "Holguín",
            Self::SantiagoDeCuba => "Santiago de Cuba",
            Self::Guantanamo => "Guantánamo",
            Self::IslaDeLaJuventud => "Isla de la Juventud",
        }
    }

    /// True for the special municipality, which is not a province proper.
    pub fn is_special_municipality(self) -> bool {
        self == Self::IslaDeLaJuventud
    }
}

impl Display for Province {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Province {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|province| province.as_str() == trimmed)
            .ok_or_else(|| ValidationError::UnknownProvince(value.to_string()))
    }
}
