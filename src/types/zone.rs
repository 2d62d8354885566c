//! Defines the `Zone` grid cell and its derived metrics.

use crate::types::ids::{GridId, PointId, ZoneId};
use crate::types::land_cover::LandCoverComposition;
use crate::types::status::ComputationStatus;
use serde::{Deserialize, Serialize};

/// Interned corner points of a cell, clockwise from the upper-right (A=NE, B=SE, C=SW, D=NW).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CornerIds {
    pub a: PointId,
    pub b: PointId,
    pub c: PointId,
    pub d: PointId,
}

/// Raster layers merged into a zone by the metric aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneLayer {
    Wind,
    Terrain,
    AirDensity,
    PowerDensity,
    LandCover,
}

impl ZoneLayer {
    pub const ALL: [ZoneLayer; 5] = [
        ZoneLayer::Wind,
        ZoneLayer::Terrain,
        ZoneLayer::AirDensity,
        ZoneLayer::PowerDensity,
        ZoneLayer::LandCover,
    ];

    /// Layers the potential score is computed from.
    pub const POTENTIAL_INPUTS: [ZoneLayer; 3] = [
        ZoneLayer::Terrain,
        ZoneLayer::PowerDensity,
        ZoneLayer::LandCover,
    ];
}

/// Derived per-zone metrics.
///
/// `None` means the layer was never fetched. A layer that was fetched but for which the
/// provider had no data is stored as `Some(0.0)` (or an empty composition).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneMetrics {
    /// Degrees clockwise from north, direction the wind blows from.
    pub wind_direction: Option<f64>,
    /// m/s.
    pub avg_wind_speed: Option<f64>,
    /// m.
    pub min_alt: Option<f64>,
    /// m.
    pub max_alt: Option<f64>,
    /// Terrain ruggedness: standard deviation of elevation within the zone, m.
    pub roughness: Option<f64>,
    /// kg/m³.
    pub air_density: Option<f64>,
    /// Mean wind power density, W/m².
    pub power_avg: Option<f64>,
    pub land_cover: Option<LandCoverComposition>,
    /// Share of the zone not covered by hard-excluded land-cover classes, 0..1.
    pub buildable_fraction: Option<f64>,
    /// Composite 0-100 suitability score.
    pub potential: Option<f64>,
    /// Inputs that were present when `potential` was computed and have not been rewritten
    /// since.
    pub potential_inputs: Vec<ZoneLayer>,
}

impl ZoneMetrics {
    pub fn has_layer(&self, layer: ZoneLayer) -> bool {
        match layer {
            ZoneLayer::Wind => self.avg_wind_speed.is_some() && self.wind_direction.is_some(),
            ZoneLayer::Terrain => {
                self.min_alt.is_some() && self.max_alt.is_some() && self.roughness.is_some()
            }
            ZoneLayer::AirDensity => self.air_density.is_some(),
            ZoneLayer::PowerDensity => self.power_avg.is_some(),
            ZoneLayer::LandCover => self.land_cover.is_some(),
        }
    }

    /// Whether the stored potential reflects every current input layer.
    pub fn potential_is_current(&self) -> bool {
        self.potential.is_some()
            && ZoneLayer::POTENTIAL_INPUTS
                .iter()
                .all(|layer| self.potential_inputs.contains(layer))
    }

    /// Stores a freshly computed potential and remembers which inputs it saw.
    pub fn record_potential(&mut self, potential: f64, buildable_fraction: f64) {
        self.potential = Some(potential);
        self.buildable_fraction = Some(buildable_fraction);
        self.potential_inputs = ZoneLayer::POTENTIAL_INPUTS
            .into_iter()
            .filter(|layer| self.has_layer(*layer))
            .collect();
    }

    /// Called after `layer` was (re)written. A potential computed before no longer counts
    /// as current.
    pub fn layer_written(&mut self, layer: ZoneLayer) {
        self.potential_inputs.retain(|input| *input != layer);
    }

    /// `Computed` once every layer is present and the potential is current.
    pub fn status(&self) -> ComputationStatus {
        let layers = ZoneLayer::ALL
            .iter()
            .filter(|layer| self.has_layer(**layer))
            .count();
        let potential = usize::from(self.potential_is_current());
        ComputationStatus::from_counts(layers + potential, ZoneLayer::ALL.len() + 1)
    }
}

/// One cell of a [`crate::Grid`], the unit of scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub grid: GridId,
    /// 1-based, row-major (northernmost row first, west to east).
    pub index: u32,
    pub corners: CornerIds,
    pub metrics: ZoneMetrics,
}

impl Zone {
    pub fn status(&self) -> ComputationStatus {
        self.metrics.status()
    }
}
