use serde::{Deserialize, Serialize};
use std::fmt;

/// How far the scoring pipeline got for a zone or region.
///
/// Derived from which optional fields are populated, so "genuinely zero" and "not fetched
/// yet" are never confused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComputationStatus {
    /// Nothing computed yet.
    Pending,
    /// Some layers are present, others were never fetched or their stage failed.
    PartiallyComputed,
    /// Every layer is present.
    Computed,
}

impl ComputationStatus {
    /// Status for `present` populated fields out of `total`.
    pub fn from_counts(present: usize, total: usize) -> Self {
        if present == 0 {
            ComputationStatus::Pending
        } else if present >= total {
            ComputationStatus::Computed
        } else {
            ComputationStatus::PartiallyComputed
        }
    }
}

impl fmt::Display for ComputationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComputationStatus::Pending => "pending",
            ComputationStatus::PartiallyComputed => "partially computed",
            ComputationStatus::Computed => "computed",
        };
        write!(f, "{}", name)
    }
}
