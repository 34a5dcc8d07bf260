//! Area unit conversion.
//!
//! Conversions pivot through square meters: a value is first scaled into the
//! base unit and then divided by each target unit's rate, so the table only
//! needs one multiplier per unit instead of a pairwise matrix.
//!
//! Regional units that share a colloquial name (the bigha in particular) are
//! separate keys, since their square-meter equivalents differ by region.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identifier of an area unit in the conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKey {
    /// Square meters (the base unit).
    SqMeters,
    /// Square feet.
    SqFeet,
    /// Acres.
    Acres,
    /// Hectares.
    Hectares,
    /// Bigha as measured in Uttar Pradesh.
    BighaUp,
    /// Bigha as measured in Gujarat.
    BighaGujarat,
    /// Bigha as measured in West Bengal.
    BighaWestBengal,
    /// Guntha (western and southern India).
    Guntha,
    /// Katha as measured in West Bengal.
    Katha,
}

/// A single entry of the conversion table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionUnit {
    /// The unit identifier.
    pub key: UnitKey,
    /// How many square meters one of this unit covers.
    pub sq_meters: f64,
    /// Human-readable label.
    pub label: &'static str,
}

/// The fixed conversion table.
pub const UNIT_TABLE: [ConversionUnit; 9] = [
    ConversionUnit {
        key: UnitKey::SqMeters,
        sq_meters: 1.0,
        label: "Square Meters",
    },
    ConversionUnit {
        key: UnitKey::SqFeet,
        sq_meters: 0.092_903,
        label: "Square Feet",
    },
    ConversionUnit {
        key: UnitKey::Acres,
        sq_meters: 4_046.86,
        label: "Acres",
    },
    ConversionUnit {
        key: UnitKey::Hectares,
        sq_meters: 10_000.0,
        label: "Hectares",
    },
    ConversionUnit {
        key: UnitKey::BighaUp,
        sq_meters: 2_529.29,
        label: "Bigha (Uttar Pradesh)",
    },
    ConversionUnit {
        key: UnitKey::BighaGujarat,
        sq_meters: 1_618.74,
        label: "Bigha (Gujarat)",
    },
    ConversionUnit {
        key: UnitKey::BighaWestBengal,
        sq_meters: 1_337.8,
        label: "Bigha (West Bengal)",
    },
    ConversionUnit {
        key: UnitKey::Guntha,
        sq_meters: 101.17,
        label: "Guntha",
    },
    ConversionUnit {
        key: UnitKey::Katha,
        sq_meters: 66.89,
        label: "Katha (West Bengal)",
    },
];

impl UnitKey {
    /// All unit keys in table order.
    pub const ALL: [UnitKey; 9] = [
        Self::SqMeters,
        Self::SqFeet,
        Self::Acres,
        Self::Hectares,
        Self::BighaUp,
        Self::BighaGujarat,
        Self::BighaWestBengal,
        Self::Guntha,
        Self::Katha,
    ];

    /// The identifier used on the command line and in serialized output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SqMeters => "sq_meters",
            Self::SqFeet => "sq_feet",
            Self::Acres => "acres",
            Self::Hectares => "hectares",
            Self::BighaUp => "bigha_up",
            Self::BighaGujarat => "bigha_gujarat",
            Self::BighaWestBengal => "bigha_west_bengal",
            Self::Guntha => "guntha",
            Self::Katha => "katha",
        }
    }

    /// The table entry for this unit.
    #[must_use]
    pub fn entry(self) -> &'static ConversionUnit {
        // Table order matches declaration order.
        &UNIT_TABLE[self as usize]
    }

    /// Square meters covered by one of this unit.
    #[must_use]
    pub fn sq_meters(self) -> f64 {
        self.entry().sq_meters
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        self.entry().label
    }

    /// Resolve a free-form unit label as stored on land records.
    ///
    /// Accepts the table keys, their display labels, and common spellings
    /// such as `"sq meters"` or `"sq. ft"`. A bare `"bigha"` does not
    /// resolve because its size depends on the region.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");

        let key = match normalized.as_str() {
            "sq_meters" | "sq_meter" | "sq_m" | "square_meters" | "square_meter" | "m2" => {
                Self::SqMeters
            }
            "sq_feet" | "sq_ft" | "square_feet" | "square_foot" | "ft2" => Self::SqFeet,
            "acres" | "acre" => Self::Acres,
            "hectares" | "hectare" | "ha" => Self::Hectares,
            "bigha_up" | "bigha_uttar_pradesh" => Self::BighaUp,
            "bigha_gujarat" => Self::BighaGujarat,
            "bigha_west_bengal" => Self::BighaWestBengal,
            "guntha" | "gunthas" => Self::Guntha,
            "katha" | "katha_west_bengal" => Self::Katha,
            _ => return None,
        };
        Some(key)
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::UnknownUnit(s.to_string()))
    }
}

/// Convert `value` expressed in `from` into every other unit of the table.
///
/// Returns an empty map when `value` is not finite or not positive. No
/// rounding is applied.
#[must_use]
pub fn convert(value: f64, from: UnitKey) -> BTreeMap<UnitKey, f64> {
    if !value.is_finite() || value <= 0.0 {
        return BTreeMap::new();
    }

    let base = value * from.sq_meters();
    UNIT_TABLE
        .iter()
        .filter(|unit| unit.key != from)
        .map(|unit| (unit.key, base / unit.sq_meters))
        .collect()
}

/// Convert `value` from one unit directly into another.
///
/// Returns `None` for the same inputs [`convert`] rejects. Converting a unit
/// into itself returns the value unchanged.
#[must_use]
pub fn convert_to(value: f64, from: UnitKey, to: UnitKey) -> Option<f64> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    if from == to {
        return Some(value);
    }
    Some(value * from.sq_meters() / to.sq_meters())
}
