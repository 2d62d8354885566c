//! Defines the `LandCoverClass` enum, mapping ESA WorldCover class codes to descriptive
//! variants, and the per-zone land-cover composition built from a class histogram.

use serde::{Deserialize, Serialize};

/// Land-cover class as reported by the ESA WorldCover classification.
///
/// Convert a raw class code from the provider's histogram with [`LandCoverClass::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandCoverClass {
    /// Code 10.
    TreeCover,
    /// Code 20.
    Shrubland,
    /// Code 30.
    Grassland,
    /// Code 40.
    Cropland,
    /// Code 50. Hard-excluded.
    BuiltUp,
    /// Code 60.
    BareSparse,
    /// Code 70. Hard-excluded.
    SnowIce,
    /// Code 80. Hard-excluded.
    PermanentWater,
    /// Code 90. Hard-excluded.
    HerbaceousWetland,
    /// Code 95.
    MossLichen,
    /// Code 100. Hard-excluded.
    Mangroves,
}

impl LandCoverClass {
    pub const ALL: [LandCoverClass; 11] = [
        LandCoverClass::TreeCover,
        LandCoverClass::Shrubland,
        LandCoverClass::Grassland,
        LandCoverClass::Cropland,
        LandCoverClass::BuiltUp,
        LandCoverClass::BareSparse,
        LandCoverClass::SnowIce,
        LandCoverClass::PermanentWater,
        LandCoverClass::HerbaceousWetland,
        LandCoverClass::MossLichen,
        LandCoverClass::Mangroves,
    ];

    pub fn code(self) -> u16 {
        match self {
            LandCoverClass::TreeCover => 10,
            LandCoverClass::Shrubland => 20,
            LandCoverClass::Grassland => 30,
            LandCoverClass::Cropland => 40,
            LandCoverClass::BuiltUp => 50,
            LandCoverClass::BareSparse => 60,
            LandCoverClass::SnowIce => 70,
            LandCoverClass::PermanentWater => 80,
            LandCoverClass::HerbaceousWetland => 90,
            LandCoverClass::MossLichen => 95,
            LandCoverClass::Mangroves => 100,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.code() == code)
    }

    /// The human-readable label used as key in a [`LandCoverComposition`].
    pub fn label(self) -> &'static str {
        match self {
            LandCoverClass::TreeCover => "Tree cover",
            LandCoverClass::Shrubland => "Shrubland",
            LandCoverClass::Grassland => "Grassland",
            LandCoverClass::Cropland => "Cropland",
            LandCoverClass::BuiltUp => "Built-up",
            LandCoverClass::BareSparse => "Bare / sparse",
            LandCoverClass::SnowIce => "Snow / ice",
            LandCoverClass::PermanentWater => "Permanent water",
            LandCoverClass::HerbaceousWetland => "Herbaceous wetland",
            LandCoverClass::MossLichen => "Moss / lichen",
            LandCoverClass::Mangroves => "Mangroves",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.label() == label)
    }

    /// How suitable the class is for turbine placement, from 0.0 (unsuitable) to 1.0 (ideal).
    pub fn suitability(self) -> f64 {
        match self {
            LandCoverClass::Grassland
            | LandCoverClass::BareSparse
            | LandCoverClass::Shrubland => 1.0,
            LandCoverClass::Cropland => 0.9,
            LandCoverClass::TreeCover | LandCoverClass::MossLichen => 0.4,
            LandCoverClass::BuiltUp
            | LandCoverClass::PermanentWater
            | LandCoverClass::HerbaceousWetland
            | LandCoverClass::SnowIce
            | LandCoverClass::Mangroves => 0.0,
        }
    }

    /// Hard-excluded classes never count towards the buildable area.
    pub fn is_hard_excluded(self) -> bool {
        matches!(
            self,
            LandCoverClass::BuiltUp
                | LandCoverClass::PermanentWater
                | LandCoverClass::HerbaceousWetland
                | LandCoverClass::SnowIce
                | LandCoverClass::Mangroves
        )
    }
}

/// Label for a raw class code; codes outside WorldCover become `class_<code>`.
pub fn label_for_code(code: u16) -> String {
    match LandCoverClass::from_code(code) {
        Some(class) => class.label().to_string(),
        None => format!("class_{}", code),
    }
}

/// Share of a zone's area covered by one land-cover label, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandCoverShare {
    pub label: String,
    pub percentage: f64,
}

/// Ordered mapping of land-cover label to percentage of a zone's area.
///
/// Built by the zone metric aggregator sorted by percentage, largest first. Percentages
/// add up to roughly 100 (each share is rounded to one decimal).
///
/// # Examples
///
/// ```
/// use skywind::LandCoverComposition;
///
/// let composition: LandCoverComposition =
///     [("Permanent water", 80.0), ("Grassland", 20.0)].into_iter().collect();
/// assert_eq!(composition.len(), 2);
/// assert_eq!(composition.percentage_of("Grassland"), 20.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandCoverComposition(Vec<LandCoverShare>);

impl LandCoverComposition {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, label: impl Into<String>, percentage: f64) {
        self.0.push(LandCoverShare {
            label: label.into(),
            percentage,
        });
    }

    pub fn shares(&self) -> &[LandCoverShare] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &LandCoverShare> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Summed percentage of all shares carrying `label`, 0.0 if absent.
    pub fn percentage_of(&self, label: &str) -> f64 {
        self.0
            .iter()
            .filter(|share| share.label == label)
            .map(|share| share.percentage)
            .sum()
    }

    /// The first (largest, once sorted) share.
    pub fn dominant(&self) -> Option<&LandCoverShare> {
        self.0.first()
    }
}

impl<L: Into<String>> FromIterator<(L, f64)> for LandCoverComposition {
    fn from_iter<T: IntoIterator<Item = (L, f64)>>(iter: T) -> Self {
        let mut composition = LandCoverComposition::new();
        for (label, percentage) in iter {
            composition.push(label, percentage);
        }
        composition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_labels() {
        for class in LandCoverClass::ALL {
            assert_eq!(LandCoverClass::from_code(class.code()), Some(class));
            assert_eq!(LandCoverClass::from_label(class.label()), Some(class));
        }
    }

    #[test]
    fn test_exactly_five_classes_are_excluded() {
        let excluded: Vec<_> = LandCoverClass::ALL
            .into_iter()
            .filter(|class| class.is_hard_excluded())
            .collect();
        assert_eq!(excluded.len(), 5);
        assert!(excluded.iter().all(|class| class.suitability() == 0.0));
    }

    #[test]
    fn test_unknown_code_label() {
        assert_eq!(label_for_code(42), "class_42");
        assert_eq!(label_for_code(30), "Grassland");
    }

    #[test]
    fn test_composition_serializes_as_list() {
        let composition: LandCoverComposition = [("Grassland", 100.0)].into_iter().collect();
        let json = serde_json::to_string(&composition).unwrap();
        assert_eq!(json, r#"[{"label":"Grassland","percentage":100.0}]"#);
    }
}
