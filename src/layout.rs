//! Layout enumeration and selection.
//!
//! For every entry of the fixed orientation combo table the enumerator sums two
//! box magnitudes per pallet axis, floors the pallet dimension by that span and
//! derives how many bundles fit and how much of the pallet area they cover.
//! The selector then picks the candidate with the most bundles, preferring the
//! higher area efficiency and finally the earlier table position.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

use crate::model::{BoxDimensions, PalletFootprint};
use crate::types::{ORIENTATION_COMBOS, OrientationCombo};

/// One evaluated orientation combo.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutCandidate {
    pub combo: OrientationCombo,
    /// Span along the pallet length in mm.
    pub span_a: f64,
    /// Span along the pallet width in mm.
    pub span_b: f64,
    pub count_along_length: u64,
    pub count_along_width: u64,
    pub bundle_count: u64,
    /// Rounded share of the pallet area covered by the bundles.
    ///
    /// Not clamped: a count forced up to 1 on an oversized span yields more
    /// than 100.
    pub efficiency_percent: u32,
}

impl LayoutCandidate {
    /// Evaluates a single combo against the footprint.
    pub fn evaluate(
        combo: OrientationCombo,
        dims: &BoxDimensions,
        footprint: &PalletFootprint,
    ) -> Self {
        let span_a = combo.span_a.span_of(dims);
        let span_b = combo.span_b.span_of(dims);

        let count_along_length = fit_count(footprint.length(), span_a);
        let count_along_width = fit_count(footprint.width(), span_b);
        // Tiny boxes push both counts towards u64::MAX.
        let bundle_count = count_along_length.saturating_mul(count_along_width);

        let covered = span_a * span_b * count_along_length as f64 * count_along_width as f64;
        let efficiency_percent = (100.0 * covered / footprint.area()).round() as u32;

        Self {
            combo,
            span_a,
            span_b,
            count_along_length,
            count_along_width,
            bundle_count,
            efficiency_percent,
        }
    }
}

/// Flattened, serializable view of a candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LayoutSummary {
    pub combo_index: u8,
    #[schema(example = "L+W × W+H")]
    pub label: String,
    #[schema(value_type = [usize; 2], example = json!([0, 1]))]
    pub span_a_axes: [usize; 2],
    #[schema(value_type = [usize; 2], example = json!([1, 2]))]
    pub span_b_axes: [usize; 2],
    pub span_a: f64,
    pub span_b: f64,
    pub count_along_length: u64,
    pub count_along_width: u64,
    pub bundle_count: u64,
    pub efficiency_percent: u32,
}

impl From<&LayoutCandidate> for LayoutSummary {
    fn from(candidate: &LayoutCandidate) -> Self {
        Self {
            combo_index: candidate.combo.index,
            label: candidate.combo.label(),
            span_a_axes: candidate.combo.span_a.indices(),
            span_b_axes: candidate.combo.span_b.indices(),
            span_a: candidate.span_a,
            span_b: candidate.span_b,
            count_along_length: candidate.count_along_length,
            count_along_width: candidate.count_along_width,
            bundle_count: candidate.bundle_count,
            efficiency_percent: candidate.efficiency_percent,
        }
    }
}

/// Number of spans that fit along a pallet side, never less than one.
///
/// The float to integer cast saturates at `u64::MAX`.
fn fit_count(side: f64, span: f64) -> u64 {
    ((side / span).floor() as u64).max(1)
}

/// Evaluates all eight orientation combos in table order.
///
/// # Examples
/// ```
/// use pallet_calc::layout::enumerate_layouts;
/// use pallet_calc::model::{BoxDimensions, PalletFootprint};
///
/// let dims = BoxDimensions::new(400.0, 300.0, 200.0).unwrap();
/// let footprint = PalletFootprint::new(1250.0, 1300.0).unwrap();
/// let candidates = enumerate_layouts(&dims, &footprint);
/// assert_eq!(candidates.len(), 8);
/// assert_eq!(candidates[0].bundle_count, 2);
/// ```
pub fn enumerate_layouts(
    dims: &BoxDimensions,
    footprint: &PalletFootprint,
) -> Vec<LayoutCandidate> {
    ORIENTATION_COMBOS
        .iter()
        .map(|combo| LayoutCandidate::evaluate(*combo, dims, footprint))
        .collect()
}

/// Ranks two candidates.
///
/// `Ordering::Less` means `a` ranks above `b`: more bundles first, then the
/// higher efficiency. Everything else compares equal so that stable sorts and
/// first-wins scans keep table order among ties.
pub fn compare_candidates(a: &LayoutCandidate, b: &LayoutCandidate) -> Ordering {
    b.bundle_count
        .cmp(&a.bundle_count)
        .then_with(|| b.efficiency_percent.cmp(&a.efficiency_percent))
}

/// Returns the top-ranked candidate, or `None` for an empty slice.
///
/// Among exact ties the earliest candidate wins.
pub fn select_best(candidates: &[LayoutCandidate]) -> Option<&LayoutCandidate> {
    // `min_by` returns the first of several equal minima.
    candidates.iter().min_by(|a, b| compare_candidates(a, b))
}

/// Position of the top-ranked candidate within the slice.
pub fn select_best_index(candidates: &[LayoutCandidate]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| compare_candidates(a, b))
        .map(|(idx, _)| idx)
}

/// Returns all candidates in ranked order (stable).
pub fn rank_candidates(candidates: &[LayoutCandidate]) -> Vec<LayoutCandidate> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by(compare_candidates);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PalletPreset;
    use rand::prelude::SmallRng;
    use rand::{Rng, SeedableRng};

    fn tolerance_pallet() -> PalletFootprint {
        PalletFootprint::new(1250.0, 1300.0).unwrap()
    }

    fn candidate(index: u8, bundle_count: u64, efficiency_percent: u32) -> LayoutCandidate {
        LayoutCandidate {
            combo: ORIENTATION_COMBOS[(index - 1) as usize],
            span_a: 100.0,
            span_b: 100.0,
            count_along_length: bundle_count,
            count_along_width: 1,
            bundle_count,
            efficiency_percent,
        }
    }

    #[test]
    fn enumerates_eight_candidates_in_table_order() {
        let dims = BoxDimensions::new(400.0, 300.0, 200.0).unwrap();
        let candidates = enumerate_layouts(&dims, &tolerance_pallet());
        assert_eq!(candidates.len(), 8);
        for (pos, cand) in candidates.iter().enumerate() {
            assert_eq!(cand.combo.index as usize, pos + 1);
            assert!(cand.bundle_count >= 1);
            assert_eq!(
                cand.bundle_count,
                cand.count_along_length * cand.count_along_width
            );
        }
    }

    #[test]
    fn first_combo_matches_hand_computation() {
        let dims = BoxDimensions::new(400.0, 300.0, 200.0).unwrap();
        let candidates = enumerate_layouts(&dims, &tolerance_pallet());
        let first = &candidates[0];
        assert_eq!(first.span_a, 700.0);
        assert_eq!(first.span_b, 500.0);
        assert_eq!(first.count_along_length, 1);
        assert_eq!(first.count_along_width, 2);
        assert_eq!(first.bundle_count, 2);
        // 700 * 500 * 2 / 1_625_000 = 43.08 %
        assert_eq!(first.efficiency_percent, 43);
    }

    #[test]
    fn selector_picks_true_maximum_across_all_combos() {
        let dims = BoxDimensions::new(400.0, 300.0, 200.0).unwrap();
        let candidates = enumerate_layouts(&dims, &tolerance_pallet());

        // Spans per combo: (700,500) (700,600) (600,500) (600,700)
        // (700,600) (700,500) (500,700) (500,600)
        let counts: Vec<u64> = candidates.iter().map(|c| c.bundle_count).collect();
        assert_eq!(counts, vec![2, 2, 4, 2, 2, 2, 2, 4]);

        let efficiencies: Vec<u32> = candidates.iter().map(|c| c.efficiency_percent).collect();
        assert_eq!(efficiencies, vec![43, 52, 74, 52, 52, 43, 43, 74]);

        let best = select_best(&candidates).unwrap();
        assert_eq!(best.combo.index, 3);
        assert_eq!(best.bundle_count, 4);

        let max = candidates.iter().map(|c| c.bundle_count).max().unwrap();
        assert_eq!(best.bundle_count, max);
    }

    #[test]
    fn oversized_span_clamps_count_to_one() {
        // L+W = 1400 exceeds both pallet sides.
        let dims = BoxDimensions::new(800.0, 600.0, 900.0).unwrap();
        let candidates = enumerate_layouts(&dims, &tolerance_pallet());
        let first = &candidates[0];
        assert_eq!(first.span_a, 1400.0);
        assert_eq!(first.count_along_length, 1);
        assert_eq!(first.count_along_width, 1);
        assert_eq!(first.bundle_count, 1);
        assert!(candidates.iter().all(|c| c.bundle_count >= 1));
    }

    #[test]
    fn efficiency_is_reported_above_one_hundred_when_clamped() {
        let dims = BoxDimensions::new(999.0, 999.0, 999.0).unwrap();
        let candidates = enumerate_layouts(&dims, &tolerance_pallet());
        // 1998 * 1998 / 1_625_000 = 245.66 %
        for cand in &candidates {
            assert_eq!(cand.bundle_count, 1);
            assert_eq!(cand.efficiency_percent, 246);
        }
    }

    #[test]
    fn higher_efficiency_wins_equal_bundle_count() {
        let candidates = vec![candidate(1, 4, 58), candidate(2, 4, 61), candidate(3, 3, 90)];
        let best = select_best(&candidates).unwrap();
        assert_eq!(best.efficiency_percent, 61);
        assert_eq!(best.combo.index, 2);

        let reversed = vec![candidate(2, 4, 61), candidate(1, 4, 58)];
        assert_eq!(select_best(&reversed).unwrap().efficiency_percent, 61);
    }

    #[test]
    fn exact_ties_keep_table_order() {
        let candidates = vec![candidate(1, 2, 40), candidate(2, 4, 70), candidate(3, 4, 70)];
        assert_eq!(select_best(&candidates).unwrap().combo.index, 2);
        assert_eq!(select_best_index(&candidates), Some(1));

        let ranked = rank_candidates(&candidates);
        let order: Vec<u8> = ranked.iter().map(|c| c.combo.index).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn duplicate_span_combos_never_displace_earlier_entries() {
        // Combos 5 and 6 sum the same magnitudes as combos 2 and 1.
        let dims = BoxDimensions::new(350.0, 250.0, 150.0).unwrap();
        let candidates = enumerate_layouts(&dims, &tolerance_pallet());
        assert_eq!(candidates[4].bundle_count, candidates[1].bundle_count);
        assert_eq!(candidates[5].bundle_count, candidates[0].bundle_count);

        let best_index = select_best_index(&candidates).unwrap();
        assert!(best_index != 4 && best_index != 5);
    }

    #[test]
    fn select_best_on_empty_is_none() {
        assert!(select_best(&[]).is_none());
        assert!(select_best_index(&[]).is_none());
    }

    #[test]
    fn enumeration_is_idempotent() {
        let dims = BoxDimensions::new(512.5, 233.0, 101.0).unwrap();
        let first = enumerate_layouts(&dims, &tolerance_pallet());
        let second = enumerate_layouts(&dims, &tolerance_pallet());
        assert_eq!(first, second);
        assert_eq!(select_best(&first), select_best(&second));
    }

    #[test]
    fn ranked_head_equals_selected_best() {
        let dims = BoxDimensions::new(310.0, 220.0, 180.0).unwrap();
        let candidates = enumerate_layouts(&dims, &tolerance_pallet());
        let ranked = rank_candidates(&candidates);
        assert_eq!(Some(&ranked[0]), select_best(&candidates));
    }

    #[test]
    fn microscopic_box_saturates_instead_of_overflowing() {
        let dims = BoxDimensions::new(1e-8, 1e-8, 1e-8).unwrap();
        let footprint = PalletPreset::Standard.footprint();
        let candidates = enumerate_layouts(&dims, &footprint);

        assert_eq!(candidates.len(), 8);
        for cand in &candidates {
            // 1000 / 2e-8 and 1200 / 2e-8 still fit, their product does not.
            assert!(cand.count_along_length >= 49_999_999_999);
            assert!(cand.count_along_width >= 59_999_999_999);
            assert_eq!(cand.bundle_count, u64::MAX);
        }
        assert_eq!(select_best_index(&candidates), Some(0));
    }

    /// First-wins scan over (bundle count, efficiency).
    fn reference_best(candidates: &[LayoutCandidate]) -> usize {
        let mut best = 0;
        for (idx, cand) in candidates.iter().enumerate().skip(1) {
            let current = &candidates[best];
            if cand.bundle_count > current.bundle_count
                || (cand.bundle_count == current.bundle_count
                    && cand.efficiency_percent > current.efficiency_percent)
            {
                best = idx;
            }
        }
        best
    }

    fn assert_layout_properties(dims: &BoxDimensions, footprint: &PalletFootprint) {
        let candidates = enumerate_layouts(dims, footprint);
        assert_eq!(candidates.len(), 8, "{:?}", dims);
        for cand in &candidates {
            assert!(cand.bundle_count >= 1, "{:?} combo {}", dims, cand.combo.index);
            let product = cand
                .count_along_length
                .checked_mul(cand.count_along_width)
                .unwrap_or(u64::MAX);
            assert_eq!(cand.bundle_count, product, "{:?}", dims);
        }
        assert_eq!(
            select_best_index(&candidates),
            Some(reference_best(&candidates)),
            "{:?}",
            dims
        );
    }

    #[test]
    fn every_valid_box_yields_eight_usable_candidates() {
        let footprints = [
            PalletPreset::Standard.footprint(),
            PalletPreset::Tolerance.footprint(),
        ];
        let edges = [1e-9, 1e-4, 0.5, 1.0, 333.3, 998.999, 999.0];

        for footprint in &footprints {
            for &l in &edges {
                for &w in &edges {
                    for &h in &edges {
                        let dims = BoxDimensions::new(l, w, h).unwrap();
                        assert_layout_properties(&dims, footprint);
                    }
                }
            }

            let mut rng = SmallRng::seed_from_u64(0);
            for _ in 0..2000 {
                let dims = BoxDimensions::new(
                    rng.random_range(0.01..=999.0),
                    rng.random_range(0.01..=999.0),
                    rng.random_range(0.01..=999.0),
                )
                .unwrap();
                assert_layout_properties(&dims, footprint);
            }
        }
    }
}
