//! Common types for box axes and the orientation combo table.
//!
//! This module defines the axis vocabulary shared by the layout enumerator
//! and the fixed table of eight orientation combos it walks through.

use std::fmt;

/// Default upper bound for a single box dimension in millimeters.
pub const DEFAULT_MAX_DIMENSION: f64 = 999.0;

/// One of the three box axes.
///
/// The discriminant is the index into a `[length, width, height]` array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Length = 0,
    Width = 1,
    Height = 2,
}

impl Axis {
    /// Index into a `[length, width, height]` array.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Single-letter label used in combo descriptions.
    pub const fn short(self) -> &'static str {
        match self {
            Axis::Length => "L",
            Axis::Width => "W",
            Axis::Height => "H",
        }
    }
}

/// Trait for values that expose one magnitude per box axis.
pub trait AxisValues {
    /// Returns the magnitude along the given axis.
    fn along(&self, axis: Axis) -> f64;
}

/// Two box axes whose magnitudes are summed to form one span.
///
/// The order of the pair only affects the label, addition is commutative.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpanAxes(pub [Axis; 2]);

impl SpanAxes {
    /// Sums the magnitudes of both axes.
    #[inline]
    pub fn span_of(&self, values: &impl AxisValues) -> f64 {
        values.along(self.0[0]) + values.along(self.0[1])
    }

    /// Axis indices of the pair, e.g. `[0, 1]`.
    pub fn indices(&self) -> [usize; 2] {
        [self.0[0].index(), self.0[1].index()]
    }
}

impl fmt::Display for SpanAxes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.0[0].short(), self.0[1].short())
    }
}

/// One entry of the fixed orientation combo table.
///
/// `span_a` lies along the pallet length, `span_b` along the pallet width.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrientationCombo {
    /// 1-based position in the table, also the tie-break order.
    pub index: u8,
    pub span_a: SpanAxes,
    pub span_b: SpanAxes,
}

impl OrientationCombo {
    const fn new(index: u8, span_a: [Axis; 2], span_b: [Axis; 2]) -> Self {
        Self {
            index,
            span_a: SpanAxes(span_a),
            span_b: SpanAxes(span_b),
        }
    }

    /// Human-readable label such as `L+W × W+H`.
    pub fn label(&self) -> String {
        format!("{} × {}", self.span_a, self.span_b)
    }
}

use Axis::{Height as H, Length as L, Width as W};

/// The eight orientation combos, in enumeration order.
///
/// Entries 5 and 6 sum the same magnitudes as entries 2 and 1; they stay in the
/// table so that the candidate list keeps its eight positions.
pub const ORIENTATION_COMBOS: [OrientationCombo; 8] = [
    OrientationCombo::new(1, [L, W], [W, H]),
    OrientationCombo::new(2, [L, W], [L, H]),
    OrientationCombo::new(3, [L, H], [W, H]),
    OrientationCombo::new(4, [L, H], [L, W]),
    OrientationCombo::new(5, [W, L], [L, H]),
    OrientationCombo::new(6, [W, L], [W, H]),
    OrientationCombo::new(7, [W, H], [L, W]),
    OrientationCombo::new(8, [H, W], [L, H]),
];

/// Validation functions shared by the model types.
pub mod validation {
    /// Validates a single magnitude against `(0, max]`.
    ///
    /// # Returns
    /// `Ok(())` for valid values, otherwise error text
    pub fn validate_bounded(value: f64, name: &str, max: f64) -> Result<(), String> {
        validate_positive(value, name)?;
        if value > max {
            return Err(format!("{} must not exceed {}, got: {}", name, max, value));
        }
        Ok(())
    }

    /// Validates a positive, finite magnitude.
    pub fn validate_positive(value: f64, name: &str) -> Result<(), String> {
        if value.is_nan() {
            return Err(format!("{} must not be NaN", name));
        }
        if value.is_infinite() {
            return Err(format!("{} must not be infinite", name));
        }
        if value <= 0.0 {
            return Err(format!("{} must be positive, got: {}", name, value));
        }
        Ok(())
    }
}
