//! Land suitability: reduces a land-cover composition to an effective suitability and the
//! buildable fraction.
//!
//! Hard-excluded classes (built-up, water, wetland, snow/ice, mangroves) are left out of
//! both sums, so a zone that is 80 % water and 20 % grassland scores `1.0 × 0.2 = 0.2`.
//! Labels missing from the suitability table score the configured unknown suitability.

use crate::config::ScoringConfig;
use crate::types::land_cover::{LandCoverClass, LandCoverComposition};
use serde::{Deserialize, Serialize};

/// Output of [`score_land`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandSuitability {
    /// Suitability of the buildable area weighted by its size, 0..1.
    pub effective: f64,
    /// Share of the zone not covered by hard-excluded classes, 0..1.
    pub buildable_fraction: f64,
}

/// Scores a composition with the default suitability of unknown classes.
///
/// # Examples
///
/// ```
/// use skywind::scoring::land::score_land;
/// use skywind::LandCoverComposition;
///
/// let mixed: LandCoverComposition =
///     [("Permanent water", 80.0), ("Grassland", 20.0)].into_iter().collect();
/// let land = score_land(&mixed);
/// assert_eq!((land.effective, land.buildable_fraction), (0.2, 0.2));
/// ```
pub fn score_land(composition: &LandCoverComposition) -> LandSuitability {
    score_land_with(composition, &ScoringConfig::default())
}

pub fn score_land_with(
    composition: &LandCoverComposition,
    config: &ScoringConfig,
) -> LandSuitability {
    let mut buildable_fraction = 0.0;
    let mut weighted = 0.0;
    for share in composition.iter() {
        if !share.percentage.is_finite() || share.percentage <= 0.0 {
            continue;
        }
        let class = LandCoverClass::from_label(&share.label);
        if class.is_some_and(LandCoverClass::is_hard_excluded) {
            continue;
        }
        let fraction = share.percentage / 100.0;
        let suitability = class.map_or(config.unknown_land_suitability, LandCoverClass::suitability);
        buildable_fraction += fraction;
        weighted += fraction * suitability;
    }

    let s_land = if buildable_fraction > 0.0 {
        weighted / buildable_fraction
    } else {
        0.0
    };
    LandSuitability {
        effective: s_land * buildable_fraction,
        buildable_fraction,
    }
}
