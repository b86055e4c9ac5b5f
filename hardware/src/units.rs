// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Dimensioned quantities: sizes and frequencies.
//!
//! This is the unit registry the rest of the engine talks to.  The only entry point the parsers
//! use is [`parse_quantity`], which keeps them unit-agnostic.
//!
//! # Examples
//!
//! ```
//! use hwreq_hardware::units::{parse_quantity, Unit};
//!
//! let size = parse_quantity("8 GiB", Some(Unit::Byte)).unwrap();
//! assert_eq!(size.to_base(), 8.0 * 1024.0 * 1024.0 * 1024.0);
//!
//! // A bare number takes the default unit, no guessing involved.
//! let size = parse_quantity("8", Some(Unit::Byte)).unwrap();
//! assert_eq!(size.to_string(), "8 B");
//! ```

use regex::Regex;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;

static QUANTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<magnitude>[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)\s*(?P<unit>[A-Za-z]+)?\s*$",
    )
    .unwrap_or_else(|_| unreachable!())
});

/// The physical dimension a [`Unit`] measures.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Dimension {
    Information,
    Frequency,
}

/// Units known to the registry.  Parsing is case-sensitive.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
pub enum Unit {
    #[strum(to_string = "B", serialize = "byte", serialize = "bytes")]
    Byte,
    #[strum(to_string = "kB", serialize = "KB", serialize = "kilobyte")]
    Kilobyte,
    #[strum(to_string = "MB", serialize = "megabyte")]
    Megabyte,
    #[strum(to_string = "GB", serialize = "gigabyte")]
    Gigabyte,
    #[strum(to_string = "TB", serialize = "terabyte")]
    Terabyte,
    #[strum(to_string = "PB", serialize = "petabyte")]
    Petabyte,
    #[strum(to_string = "KiB", serialize = "kibibyte")]
    Kibibyte,
    #[strum(to_string = "MiB", serialize = "mebibyte")]
    Mebibyte,
    #[strum(to_string = "GiB", serialize = "gibibyte")]
    Gibibyte,
    #[strum(to_string = "TiB", serialize = "tebibyte")]
    Tebibyte,
    #[strum(to_string = "PiB", serialize = "pebibyte")]
    Pebibyte,
    #[strum(to_string = "Hz", serialize = "hertz")]
    Hertz,
    #[strum(to_string = "kHz", serialize = "kilohertz")]
    Kilohertz,
    #[strum(to_string = "MHz", serialize = "megahertz")]
    Megahertz,
    #[strum(to_string = "GHz", serialize = "gigahertz")]
    Gigahertz,
}

impl Unit {
    #[must_use]
    pub fn dimension(self) -> Dimension {
        match self {
            Unit::Hertz | Unit::Kilohertz | Unit::Megahertz | Unit::Gigahertz => {
                Dimension::Frequency
            }
            _ => Dimension::Information,
        }
    }

    /// How many base units (bytes, hertz) one of this unit is worth.
    #[must_use]
    pub fn factor(self) -> f64 {
        const KILO: f64 = 1_000.0;
        const KIBI: f64 = 1_024.0;
        match self {
            Unit::Byte | Unit::Hertz => 1.0,
            Unit::Kilobyte | Unit::Kilohertz => KILO,
            Unit::Megabyte | Unit::Megahertz => KILO.powi(2),
            Unit::Gigabyte | Unit::Gigahertz => KILO.powi(3),
            Unit::Terabyte => KILO.powi(4),
            Unit::Petabyte => KILO.powi(5),
            Unit::Kibibyte => KIBI,
            Unit::Mebibyte => KIBI.powi(2),
            Unit::Gibibyte => KIBI.powi(3),
            Unit::Tebibyte => KIBI.powi(4),
            Unit::Pebibyte => KIBI.powi(5),
        }
    }
}

/// Errors produced by the unit registry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum QuantityError {
    #[error("'{0}' is not a quantity")]
    InvalidQuantity(String),
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),
    #[error("'{0}' has no unit and there is no default unit")]
    MissingUnit(String),
}

/// A magnitude paired with its [`Unit`].
///
/// Equality and ordering are dimension-aware: `1 GiB == 1024 MiB`, and quantities of different
/// dimensions are not comparable at all.
#[derive(Clone, Copy, Debug)]
pub struct Quantity {
    magnitude: f64,
    unit: Unit,
}

impl Quantity {
    #[must_use]
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }

    /// Magnitude expressed in the base unit of the dimension.
    #[must_use]
    pub fn to_base(&self) -> f64 {
        self.magnitude * self.unit.factor()
    }

    /// Convert to another unit of the same dimension.
    #[must_use]
    pub fn to(&self, unit: Unit) -> Option<Quantity> {
        (unit.dimension() == self.dimension())
            .then(|| Quantity::new(self.to_base() / unit.factor(), unit))
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.dimension() != other.dimension() {
            return None;
        }
        self.to_base().partial_cmp(&other.to_base())
    }
}

/// Format a magnitude without a trailing `.0` when it is integral.
pub(crate) fn fmt_magnitude(magnitude: f64) -> String {
    if magnitude.fract() == 0.0 && magnitude.abs() < 1e15 {
        format!("{magnitude:.0}")
    } else {
        format!("{magnitude}")
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", fmt_magnitude(self.magnitude), self.unit)
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_quantity(s, None)
    }
}

/// Parse `<number> [unit]` into a [`Quantity`].
///
/// A number without a unit takes `default_unit`.
///
/// # Errors
///
/// Returns [`QuantityError`] when the text is not a number followed by an optional known unit,
/// or when the unit is missing and no default was given.
pub fn parse_quantity(text: &str, default_unit: Option<Unit>) -> Result<Quantity, QuantityError> {
    let captures = QUANTITY_PATTERN
        .captures(text)
        .ok_or_else(|| QuantityError::InvalidQuantity(text.to_owned()))?;
    let magnitude = captures
        .name("magnitude")
        .map(|m| m.as_str())
        .unwrap_or_default()
        .parse::<f64>()
        .map_err(|_| QuantityError::InvalidQuantity(text.to_owned()))?;
    let unit = match captures.name("unit") {
        Some(unit) => Unit::from_str(unit.as_str())
            .map_err(|_| QuantityError::UnknownUnit(unit.as_str().to_owned()))?,
        None => default_unit.ok_or_else(|| QuantityError::MissingUnit(text.to_owned()))?,
    };
    Ok(Quantity::new(magnitude, unit))
}
