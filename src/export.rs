//! Export document for a finished calculation.
//!
//! The document bundles the inputs, the pallet footprint, the selected layout
//! and the derived totals into one JSON file that can be archived or handed to
//! production planning.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::calculator::PalletPlan;
use crate::layout::LayoutSummary;
use crate::model::{FluteProfile, PalletFootprint};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Stored {field} ({found}) does not match re-derived value ({expected})")]
    TotalsMismatch {
        field: &'static str,
        expected: u64,
        found: u64,
    },
}

/// Box input as entered by the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExportedInput {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub flute: FluteProfile,
}

/// Exported calculation result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExportDocument {
    #[schema(value_type = String, example = "2026-10-19T08:30:00Z")]
    pub generated_at: Timestamp,
    pub input: ExportedInput,
    pub footprint: PalletFootprint,
    pub best: LayoutSummary,
    pub pieces_per_bundle: u64,
    pub total_pieces: u64,
}

impl ExportDocument {
    /// Builds the document for a plan.
    pub fn from_plan(plan: &PalletPlan, generated_at: Timestamp) -> Self {
        Self {
            generated_at,
            input: ExportedInput {
                length: plan.dimensions.length(),
                width: plan.dimensions.width(),
                height: plan.dimensions.height(),
                flute: plan.flute,
            },
            footprint: plan.footprint,
            best: LayoutSummary::from(plan.best()),
            pieces_per_bundle: plan.pieces_per_bundle,
            total_pieces: plan.total_pieces,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Recomputes `(pieces_per_bundle, total_pieces)` from the stored flute
    /// and bundle count.
    pub fn rederive_totals(&self) -> (u64, u64) {
        let flute = self.input.flute;
        (
            flute.pieces_per_bundle(),
            flute.total_pieces(self.best.bundle_count),
        )
    }

    /// Checks the stored totals against the re-derived ones.
    pub fn verify(&self) -> Result<(), ExportError> {
        let (pieces_per_bundle, total_pieces) = self.rederive_totals();
        if pieces_per_bundle != self.pieces_per_bundle {
            return Err(ExportError::TotalsMismatch {
                field: "pieces_per_bundle",
                expected: pieces_per_bundle,
                found: self.pieces_per_bundle,
            });
        }
        if total_pieces != self.total_pieces {
            return Err(ExportError::TotalsMismatch {
                field: "total_pieces",
                expected: total_pieces,
                found: self.total_pieces,
            });
        }
        Ok(())
    }

    /// Suggested download file name.
    pub fn file_name(&self) -> String {
        format!("pallet-calculation-{}.json", self.generated_at.as_second())
    }
}
