//! Pallet loading calculation.
//!
//! Runs the layout enumerator over the fixed combo table, selects the best
//! candidate and derives the piece totals from the flute profile. Each call is
//! self-contained: the full result is returned to the caller and nothing is
//! kept between calculations.

use log::debug;
use serde::Serialize;
use utoipa::ToSchema;

use crate::layout::{LayoutCandidate, enumerate_layouts, select_best_index};
use crate::model::{BoxDimensions, FluteProfile, PalletFootprint};

/// Result of one calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct PalletPlan {
    pub dimensions: BoxDimensions,
    pub flute: FluteProfile,
    pub footprint: PalletFootprint,
    /// All candidates in table order.
    pub candidates: Vec<LayoutCandidate>,
    /// Position of the selected candidate within `candidates`.
    pub best_index: usize,
    pub pieces_per_bundle: u64,
    pub total_pieces: u64,
}

impl PalletPlan {
    /// The selected candidate.
    pub fn best(&self) -> &LayoutCandidate {
        &self.candidates[self.best_index]
    }

    /// Number of bundles on the pallet for the selected layout.
    pub fn bundle_count(&self) -> u64 {
        self.best().bundle_count
    }
}

/// Events emitted while a calculation runs, for live display.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum CalcEvent {
    /// One orientation combo has been evaluated.
    CandidateEvaluated {
        combo_index: u8,
        label: String,
        span_a: f64,
        span_b: f64,
        count_along_length: u64,
        count_along_width: u64,
        bundle_count: u64,
        efficiency_percent: u32,
    },
    /// The best candidate has been chosen.
    BestSelected {
        combo_index: u8,
        bundle_count: u64,
        efficiency_percent: u32,
    },
    /// Calculation complete.
    Finished {
        bundle_count: u64,
        pieces_per_bundle: u64,
        total_pieces: u64,
    },
}

impl CalcEvent {
    fn evaluated(candidate: &LayoutCandidate) -> Self {
        CalcEvent::CandidateEvaluated {
            combo_index: candidate.combo.index,
            label: candidate.combo.label(),
            span_a: candidate.span_a,
            span_b: candidate.span_b,
            count_along_length: candidate.count_along_length,
            count_along_width: candidate.count_along_width,
            bundle_count: candidate.bundle_count,
            efficiency_percent: candidate.efficiency_percent,
        }
    }
}

/// Calculates the pallet plan for a box.
///
/// # Examples
/// ```
/// use pallet_calc::calculator::calculate;
/// use pallet_calc::model::{BoxDimensions, FluteProfile, PalletPreset};
///
/// let dims = BoxDimensions::new(400.0, 300.0, 200.0).unwrap();
/// let plan = calculate(dims, FluteProfile::Baf, PalletPreset::Tolerance.footprint());
/// assert_eq!(plan.bundle_count(), 4);
/// assert_eq!(plan.total_pieces, 560);
/// ```
pub fn calculate(
    dimensions: BoxDimensions,
    flute: FluteProfile,
    footprint: PalletFootprint,
) -> PalletPlan {
    calculate_with_progress(dimensions, flute, footprint, |_| {})
}

/// Calculation with a progress callback.
///
/// The callback receives one `CandidateEvaluated` per combo in table order,
/// then `BestSelected` and `Finished`.
pub fn calculate_with_progress(
    dimensions: BoxDimensions,
    flute: FluteProfile,
    footprint: PalletFootprint,
    mut on_event: impl FnMut(&CalcEvent),
) -> PalletPlan {
    let candidates = enumerate_layouts(&dimensions, &footprint);
    for candidate in &candidates {
        debug!(
            "combo {} ({}): {} x {} = {} bundles, {}%",
            candidate.combo.index,
            candidate.combo.label(),
            candidate.count_along_length,
            candidate.count_along_width,
            candidate.bundle_count,
            candidate.efficiency_percent
        );
        on_event(&CalcEvent::evaluated(candidate));
    }

    // The combo table is never empty.
    let best_index = select_best_index(&candidates).unwrap_or(0);
    let best = &candidates[best_index];
    on_event(&CalcEvent::BestSelected {
        combo_index: best.combo.index,
        bundle_count: best.bundle_count,
        efficiency_percent: best.efficiency_percent,
    });

    let pieces_per_bundle = flute.pieces_per_bundle();
    let total_pieces = flute.total_pieces(best.bundle_count);
    on_event(&CalcEvent::Finished {
        bundle_count: best.bundle_count,
        pieces_per_bundle,
        total_pieces,
    });

    PalletPlan {
        dimensions,
        flute,
        footprint,
        candidates,
        best_index,
        pieces_per_bundle,
        total_pieces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::select_best;
    use crate::model::PalletPreset;

    fn dims(l: f64, w: f64, h: f64) -> BoxDimensions {
        BoxDimensions::new(l, w, h).unwrap()
    }

    #[test]
    fn plan_carries_best_candidate_and_totals() {
        let plan = calculate(
            dims(400.0, 300.0, 200.0),
            FluteProfile::Bf,
            PalletPreset::Tolerance.footprint(),
        );
        assert_eq!(plan.candidates.len(), 8);
        assert_eq!(plan.best_index, 2);
        assert_eq!(Some(plan.best()), select_best(&plan.candidates));
        assert_eq!(plan.pieces_per_bundle, 320);
        assert_eq!(plan.total_pieces, 4 * 320);
    }

    #[test]
    fn six_bundles_of_baf_make_840_pieces() {
        // L+W = W+H = 400: 2 along 1000, 3 along 1200.
        let plan = calculate(
            dims(300.0, 100.0, 300.0),
            FluteProfile::Baf,
            PalletPreset::Standard.footprint(),
        );
        assert_eq!(plan.bundle_count(), 6);
        assert_eq!(plan.pieces_per_bundle, 140);
        assert_eq!(plan.total_pieces, 840);
    }

    #[test]
    fn microscopic_box_reports_saturated_totals() {
        let plan = calculate(
            dims(1e-8, 1e-8, 1e-8),
            FluteProfile::Baf,
            PalletPreset::Standard.footprint(),
        );
        assert_eq!(plan.candidates.len(), 8);
        assert_eq!(plan.best_index, 0);
        assert_eq!(plan.bundle_count(), u64::MAX);
        assert_eq!(plan.total_pieces, u64::MAX);
    }

    #[test]
    fn progress_reports_every_combo_then_result() {
        let mut events = Vec::new();
        let plan = calculate_with_progress(
            dims(400.0, 300.0, 200.0),
            FluteProfile::Af,
            PalletPreset::Tolerance.footprint(),
            |evt| events.push(evt.clone()),
        );

        assert_eq!(events.len(), 10);
        for (pos, evt) in events.iter().take(8).enumerate() {
            match evt {
                CalcEvent::CandidateEvaluated { combo_index, .. } => {
                    assert_eq!(*combo_index as usize, pos + 1)
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert!(matches!(
            events[8],
            CalcEvent::BestSelected { combo_index: 3, bundle_count: 4, .. }
        ));
        match &events[9] {
            CalcEvent::Finished { total_pieces, .. } => {
                assert_eq!(*total_pieces, plan.total_pieces)
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let evt = CalcEvent::Finished {
            bundle_count: 4,
            pieces_per_bundle: 200,
            total_pieces: 800,
        };
        let json = serde_json::to_value(&evt).unwrap();
        assert_eq!(json["type"], "Finished");
        assert_eq!(json["total_pieces"], 800);
    }

    #[test]
    fn repeated_calculation_is_identical() {
        let footprint = PalletPreset::Standard.footprint();
        let a = calculate(dims(250.0, 180.0, 90.0), FluteProfile::Bf, footprint);
        let b = calculate(dims(250.0, 180.0, 90.0), FluteProfile::Bf, footprint);
        assert_eq!(a, b);
    }
}
