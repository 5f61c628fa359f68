//! Data models for the pallet loading calculation.
//!
//! This module defines the validated inputs of a calculation:
//! - `BoxDimensions`: the corrugated box (length, width, height)
//! - `PalletFootprint`: the pallet surface the bundles are laid out on
//! - `PalletPreset`: the named pallet sizes in use
//! - `FluteProfile`: flute type with its bundle make-up

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{Axis, AxisValues, DEFAULT_MAX_DIMENSION, validation};

/// Validation error for calculation inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid pallet footprint: {0}")]
    InvalidFootprint(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Dimensions of a box in millimeters.
///
/// Only constructible through [`BoxDimensions::new`] or
/// [`BoxDimensions::with_max`], so every instance is finite and inside
/// `(0, max]`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct BoxDimensions {
    length: f64,
    width: f64,
    height: f64,
}

impl BoxDimensions {
    /// Creates validated box dimensions with the default 999 mm limit.
    ///
    /// # Examples
    /// ```
    /// use pallet_calc::model::BoxDimensions;
    ///
    /// assert!(BoxDimensions::new(400.0, 300.0, 200.0).is_ok());
    /// assert!(BoxDimensions::new(0.0, 300.0, 200.0).is_err());
    /// assert!(BoxDimensions::new(1000.0, 300.0, 200.0).is_err());
    /// ```
    pub fn new(length: f64, width: f64, height: f64) -> Result<Self, ValidationError> {
        Self::with_max(length, width, height, DEFAULT_MAX_DIMENSION)
    }

    /// Creates validated box dimensions with a custom upper bound.
    pub fn with_max(
        length: f64,
        width: f64,
        height: f64,
        max: f64,
    ) -> Result<Self, ValidationError> {
        validation::validate_bounded(length, "Length", max)
            .and_then(|_| validation::validate_bounded(width, "Width", max))
            .and_then(|_| validation::validate_bounded(height, "Height", max))
            .map_err(ValidationError::InvalidDimension)?;
        Ok(Self {
            length,
            width,
            height,
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Magnitudes as `[length, width, height]`.
    pub fn as_array(&self) -> [f64; 3] {
        [self.length, self.width, self.height]
    }
}

impl AxisValues for BoxDimensions {
    fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Length => self.length,
            Axis::Width => self.width,
            Axis::Height => self.height,
        }
    }
}

/// Pallet surface in millimeters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PalletFootprint {
    length: f64,
    width: f64,
}

impl PalletFootprint {
    /// Creates a validated footprint.
    pub fn new(length: f64, width: f64) -> Result<Self, ValidationError> {
        validation::validate_positive(length, "Pallet length")
            .and_then(|_| validation::validate_positive(width, "Pallet width"))
            .map_err(ValidationError::InvalidFootprint)?;
        Ok(Self { length, width })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Surface area in mm².
    pub fn area(&self) -> f64 {
        self.length * self.width
    }
}

/// Named pallet sizes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PalletPreset {
    /// 1000 × 1200 mm pallet.
    Standard,
    /// 1250 × 1300 mm pallet including overhang tolerance.
    Tolerance,
}

impl PalletPreset {
    pub const fn all() -> [PalletPreset; 2] {
        [PalletPreset::Standard, PalletPreset::Tolerance]
    }

    pub const fn name(self) -> &'static str {
        match self {
            PalletPreset::Standard => "standard",
            PalletPreset::Tolerance => "tolerance",
        }
    }

    /// Footprint of the preset. Preset constants are always valid.
    pub const fn footprint(self) -> PalletFootprint {
        match self {
            PalletPreset::Standard => PalletFootprint {
                length: 1000.0,
                width: 1200.0,
            },
            PalletPreset::Tolerance => PalletFootprint {
                length: 1250.0,
                width: 1300.0,
            },
        }
    }

    /// Parses a preset name case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(PalletPreset::Standard),
            "tolerance" => Some(PalletPreset::Tolerance),
            _ => None,
        }
    }
}

/// Flute type of the corrugated board and its bundle make-up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum FluteProfile {
    #[serde(rename = "BAF")]
    Baf,
    #[serde(rename = "AF")]
    Af,
    #[serde(rename = "BF")]
    Bf,
}

impl FluteProfile {
    pub const fn all() -> [FluteProfile; 3] {
        [FluteProfile::Baf, FluteProfile::Af, FluteProfile::Bf]
    }

    /// Trade name as used on the production floor.
    pub const fn name(self) -> &'static str {
        match self {
            FluteProfile::Baf => "BAF",
            FluteProfile::Af => "AF",
            FluteProfile::Bf => "BF",
        }
    }

    /// Number of layers stacked in one bundle.
    pub const fn layers_per_bundle(self) -> u64 {
        match self {
            FluteProfile::Baf => 14,
            FluteProfile::Af => 20,
            FluteProfile::Bf => 16,
        }
    }

    /// Number of pieces in a single layer of a bundle.
    pub const fn pieces_per_layer(self) -> u64 {
        match self {
            FluteProfile::Baf => 10,
            FluteProfile::Af => 10,
            FluteProfile::Bf => 20,
        }
    }

    pub const fn pieces_per_bundle(self) -> u64 {
        self.layers_per_bundle() * self.pieces_per_layer()
    }

    /// Total pieces on a pallet carrying `bundle_count` bundles.
    ///
    /// # Examples
    /// ```
    /// use pallet_calc::model::FluteProfile;
    ///
    /// assert_eq!(FluteProfile::Baf.pieces_per_bundle(), 140);
    /// assert_eq!(FluteProfile::Baf.total_pieces(6), 840);
    /// assert_eq!(FluteProfile::Bf.total_pieces(u64::MAX), u64::MAX);
    /// ```
    pub const fn total_pieces(self, bundle_count: u64) -> u64 {
        bundle_count.saturating_mul(self.pieces_per_bundle())
    }
}
