//! Location classification with a fixed precedence.
//!
//! Train tunnel > water > monument > road > river > forest > biome > default.
//! Within the biomes, swamp overrides temperate and alpine overrides
//! tundra/arctic.

use serde::{Deserialize, Serialize};

use skyrace_core::enums::LocationKind;

/// Biome weights are "dominant" only above this share.
const ARID_DOMINANCE: f32 = 0.5;

/// Below this, no biome is dominant and the map counts as temperate.
const BIOME_FLOOR: f32 = 0.1;

/// Topology features present at a map cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topology {
    pub ocean: bool,
    pub lake: bool,
    pub monument: bool,
    pub road: bool,
    pub river: bool,
    pub forest: bool,
    pub swamp: bool,
    pub summit: bool,
}

impl Topology {
    pub fn is_water(&self) -> bool {
        self.ocean || self.lake
    }
}

/// Biome blend at a map cell, each weight in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeWeights {
    pub arid: f32,
    pub temperate: f32,
    pub tundra: f32,
    pub arctic: f32,
}

impl BiomeWeights {
    pub fn temperate() -> Self {
        Self {
            temperate: 1.0,
            ..Self::default()
        }
    }

    fn max(&self) -> f32 {
        self.arid.max(self.temperate).max(self.tundra).max(self.arctic)
    }
}

/// Everything the classifier needs about one position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TerrainSample {
    /// Height of the queried position.
    pub y: f64,
    pub over_water: bool,
    pub topology: Topology,
    pub biome: BiomeWeights,
}

/// Classify a sample. `tunnel_threshold` is `None` when tunnel detection is off.
pub fn classify_location(sample: &TerrainSample, tunnel_threshold: Option<f64>) -> LocationKind {
    if tunnel_threshold.is_some_and(|threshold| sample.y < threshold) {
        return LocationKind::TrainTunnel;
    }
    if sample.over_water {
        return LocationKind::Water;
    }

    let topology = &sample.topology;
    if topology.monument {
        return LocationKind::Monument;
    }
    if topology.road {
        return LocationKind::Road;
    }
    if topology.river {
        return LocationKind::River;
    }
    if topology.forest {
        return LocationKind::Forest;
    }

    classify_biome(&sample.biome, topology)
}

fn classify_biome(biome: &BiomeWeights, topology: &Topology) -> LocationKind {
    let max = biome.max();
    if max <= BIOME_FLOOR {
        return LocationKind::Temperate;
    }

    if biome.arid == max && biome.arid > ARID_DOMINANCE {
        LocationKind::Arid
    } else if biome.temperate == max {
        if topology.swamp {
            LocationKind::Swamp
        } else {
            LocationKind::Temperate
        }
    } else if biome.tundra == max || biome.arctic == max {
        if topology.summit {
            LocationKind::Alpine
        } else if biome.arctic == max {
            LocationKind::Arctic
        } else {
            LocationKind::Tundra
        }
    } else {
        LocationKind::Default
    }
}
