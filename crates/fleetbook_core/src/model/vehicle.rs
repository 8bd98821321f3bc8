//! Vehicle domain model.
//!
//! # Responsibility
//! - Define the canonical vehicle record persisted by repositories.
//! - Own the structural validation rules applied before every write.
//!
//! # Invariants
//! - `id` is stable once assigned and never reused for another vehicle.
//! - `id == 0` marks a vehicle that has not been assigned an identity yet.
//! - `name` and `brand` are non-blank; `year` is not older than 1950.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Integer identity of a vehicle record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type VehicleId = i64;

/// Identity value used before the store assigns one.
pub const UNASSIGNED_VEHICLE_ID: VehicleId = 0;

/// Maximum accepted `name` length, in characters.
pub const VEHICLE_NAME_MAX_CHARS: usize = 150;
/// Maximum accepted `brand` length, in characters.
pub const VEHICLE_BRAND_MAX_CHARS: usize = 100;
/// Oldest accepted model year.
pub const VEHICLE_MIN_YEAR: i32 = 1950;

/// Structural validation failure for vehicle payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleValidationError {
    /// `name` is empty or whitespace only.
    BlankName,
    /// `name` exceeds `VEHICLE_NAME_MAX_CHARS`.
    NameTooLong { chars: usize },
    /// `brand` is empty or whitespace only.
    BlankBrand,
    /// `brand` exceeds `VEHICLE_BRAND_MAX_CHARS`.
    BrandTooLong { chars: usize },
    /// `year` is older than `VEHICLE_MIN_YEAR`.
    YearTooOld { year: i32 },
    /// `id` is negative.
    NegativeId(VehicleId),
    /// Caller-provided identity must be positive.
    NonPositiveId(VehicleId),
}

impl Display for VehicleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "vehicle name cannot be blank"),
            Self::NameTooLong { chars } => write!(
                f,
                "vehicle name has {chars} characters; at most {VEHICLE_NAME_MAX_CHARS} allowed"
            ),
            Self::BlankBrand => write!(f, "vehicle brand cannot be blank"),
            Self::BrandTooLong { chars } => write!(
                f,
                "vehicle brand has {chars} characters; at most {VEHICLE_BRAND_MAX_CHARS} allowed"
            ),
            Self::YearTooOld { year } => write!(
                f,
                "vehicle year {year} is too old; only {VEHICLE_MIN_YEAR} or later is accepted"
            ),
            Self::NegativeId(id) => write!(f, "vehicle id cannot be negative, got {id}"),
            Self::NonPositiveId(id) => write!(f, "vehicle id must be positive, got {id}"),
        }
    }
}

impl Error for VehicleValidationError {}

/// Canonical vehicle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Store-assigned or caller-provided identity. `0` when unassigned.
    #[serde(default)]
    pub id: VehicleId,
    /// Display name / model, e.g. `Fiat Uno`.
    pub name: String,
    /// Manufacturer, e.g. `Fiat`.
    pub brand: String,
    /// Model year.
    pub year: i32,
}

impl Vehicle {
    /// Creates a vehicle without identity; the repository assigns one on create.
    ///
    /// This constructor does not validate; writes call `validate()`.
    pub fn new(name: impl Into<String>, brand: impl Into<String>, year: i32) -> Self {
        Self {
            id: UNASSIGNED_VEHICLE_ID,
            name: name.into(),
            brand: brand.into(),
            year,
        }
    }

    /// Creates a vehicle with a caller-provided identity.
    ///
    /// Used by import paths where identity already exists externally.
    ///
    /// # Errors
    /// - Returns `NonPositiveId` when `id <= 0`.
    pub fn with_id(
        id: VehicleId,
        name: impl Into<String>,
        brand: impl Into<String>,
        year: i32,
    ) -> Result<Self, VehicleValidationError> {
        if id <= 0 {
            return Err(VehicleValidationError::NonPositiveId(id));
        }
        let mut vehicle = Self::new(name, brand, year);
        vehicle.id = id;
        Ok(vehicle)
    }

    /// Returns whether this vehicle already carries an identity.
    pub fn has_id(&self) -> bool {
        self.id != UNASSIGNED_VEHICLE_ID
    }

    /// Checks structural rules required before persistence.
    ///
    /// # Errors
    /// - Returns the first violated rule in field order: id, name, brand, year.
    pub fn validate(&self) -> Result<(), VehicleValidationError> {
        if self.id < 0 {
            return Err(VehicleValidationError::NegativeId(self.id));
        }

        if self.name.trim().is_empty() {
            return Err(VehicleValidationError::BlankName);
        }
        let name_chars = self.name.chars().count();
        if name_chars > VEHICLE_NAME_MAX_CHARS {
            return Err(VehicleValidationError::NameTooLong { chars: name_chars });
        }

        if self.brand.trim().is_empty() {
            return Err(VehicleValidationError::BlankBrand);
        }
        let brand_chars = self.brand.chars().count();
        if brand_chars > VEHICLE_BRAND_MAX_CHARS {
            return Err(VehicleValidationError::BrandTooLong { chars: brand_chars });
        }

        if self.year < VEHICLE_MIN_YEAR {
            return Err(VehicleValidationError::YearTooOld { year: self.year });
        }

        Ok(())
    }
}
