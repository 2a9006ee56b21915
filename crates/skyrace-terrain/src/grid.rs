//! TerrainGrid: heightfield with topology and biome layers.

use skyrace_core::config::SkillRaceConfig;
use skyrace_core::config::LocationMultipliers;
use skyrace_core::sensors::{SensorError, TerrainReading, TerrainSensor};
use skyrace_core::types::Position;

use crate::classify::{classify_location, BiomeWeights, TerrainSample, Topology};
use crate::ground::resolve_ground_distance;

/// Water bodies only count as "below" within this height above the surface.
const WATER_DETECTION_CEILING: f64 = 100.0;

/// Terrain grid header metadata.
#[derive(Debug, Clone)]
pub struct TerrainHeader {
    /// World x of the first column (meters).
    pub origin_x: f64,
    /// World z of the first row (meters).
    pub origin_z: f64,
    /// Meters per grid cell.
    pub cell_size: f64,
    /// Number of columns (along x).
    pub width: u32,
    /// Number of rows (along z).
    pub height: u32,
    /// Sea surface height (y).
    pub water_level: f64,
}

impl TerrainHeader {
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// World x of the far edge.
    pub fn max_x(&self) -> f64 {
        self.origin_x + self.width as f64 * self.cell_size
    }

    /// World z of the far edge.
    pub fn max_z(&self) -> f64 {
        self.origin_z + self.height as f64 * self.cell_size
    }
}

/// Loaded heightfield with per-cell topology and biome layers.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    pub header: TerrainHeader,
    /// Elevation values in meters, row-major (row = z, column = x).
    pub elevations: Vec<f32>,
    topology: Vec<Topology>,
    biomes: Vec<BiomeWeights>,
    multipliers: LocationMultipliers,
    tunnel_threshold: Option<f64>,
}

impl TerrainGrid {
    /// Create a grid from elevations; topology is empty and every cell temperate.
    ///
    /// Missing or surplus elevation samples are padded with 0 or dropped.
    pub fn new(header: TerrainHeader, mut elevations: Vec<f32>) -> Self {
        let cells = header.cell_count();
        elevations.resize(cells, 0.0);
        let config = SkillRaceConfig::default();
        Self {
            header,
            elevations,
            topology: vec![Topology::default(); cells],
            biomes: vec![BiomeWeights::temperate(); cells],
            multipliers: config.locations,
            tunnel_threshold: Some(config.scoring.train_tunnel_y_threshold),
        }
    }

    /// Take location multipliers and tunnel detection from `config`.
    pub fn configure(&mut self, config: &SkillRaceConfig) {
        self.multipliers = config.locations.clone();
        self.tunnel_threshold = config
            .features
            .train_tunnel_detection
            .then_some(config.scoring.train_tunnel_y_threshold);
    }

    pub fn set_topology(&mut self, row: usize, col: usize, topology: Topology) {
        if let Some(idx) = self.index(row, col) {
            self.topology[idx] = topology;
        }
    }

    pub fn set_biome(&mut self, row: usize, col: usize, biome: BiomeWeights) {
        if let Some(idx) = self.index(row, col) {
            self.biomes[idx] = biome;
        }
    }

    /// Apply `biome` to every cell in the inclusive row/column rectangle.
    pub fn paint_biome(
        &mut self,
        rows: std::ops::RangeInclusive<usize>,
        cols: std::ops::RangeInclusive<usize>,
        biome: BiomeWeights,
    ) {
        for row in rows {
            for col in cols.clone() {
                self.set_biome(row, col, biome);
            }
        }
    }

    /// Apply `topology` to every cell in the inclusive row/column rectangle.
    pub fn paint_topology(
        &mut self,
        rows: std::ops::RangeInclusive<usize>,
        cols: std::ops::RangeInclusive<usize>,
        topology: Topology,
    ) {
        for row in rows {
            for col in cols.clone() {
                self.set_topology(row, col, topology);
            }
        }
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        let h = &self.header;
        if row >= h.height as usize || col >= h.width as usize {
            return None;
        }
        Some(row * h.width as usize + col)
    }

    /// Convert a world position to grid row/col (fractional).
    /// Returns None if outside grid bounds.
    fn world_to_grid(&self, pos: &Position) -> Option<(f64, f64)> {
        let h = &self.header;
        let col = (pos.x - h.origin_x) / h.cell_size;
        let row = (pos.z - h.origin_z) / h.cell_size;

        if col < 0.0 || row < 0.0 || col >= h.width as f64 || row >= h.height as f64 {
            return None;
        }

        Some((row, col))
    }

    /// Get raw elevation at integer grid coordinates.
    fn raw_elevation(&self, row: usize, col: usize) -> f32 {
        self.index(row, col)
            .map_or(0.0, |idx| self.elevations[idx])
    }

    /// Elevation at a world position with bilinear interpolation.
    /// Returns None if the position is outside the grid.
    pub fn elevation_at(&self, pos: &Position) -> Option<f64> {
        let (row, col) = self.world_to_grid(pos)?;
        Some(self.bilinear(row, col))
    }

    /// Bilinear interpolation at fractional row/col.
    fn bilinear(&self, row: f64, col: f64) -> f64 {
        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let r1 = (r0 + 1).min(self.header.height as usize - 1);
        let c1 = (c0 + 1).min(self.header.width as usize - 1);

        let fr = row - r0 as f64;
        let fc = col - c0 as f64;

        let e00 = self.raw_elevation(r0, c0) as f64;
        let e01 = self.raw_elevation(r0, c1) as f64;
        let e10 = self.raw_elevation(r1, c0) as f64;
        let e11 = self.raw_elevation(r1, c1) as f64;

        let top = e00 * (1.0 - fc) + e01 * fc;
        let bot = e10 * (1.0 - fc) + e11 * fc;
        top * (1.0 - fr) + bot * fr
    }

    /// Index of the cell nearest to a world position.
    fn nearest_cell(&self, pos: &Position) -> Option<usize> {
        let (row, col) = self.world_to_grid(pos)?;
        let h = &self.header;
        let r = (row.round() as usize).min(h.height as usize - 1);
        let c = (col.round() as usize).min(h.width as usize - 1);
        self.index(r, c)
    }

    /// Over a water body: flagged as ocean/lake, or a submerged cell within
    /// detection height of the surface.
    pub fn is_over_water(&self, pos: &Position) -> bool {
        let Some(idx) = self.nearest_cell(pos) else {
            return false;
        };
        if self.topology[idx].is_water() {
            return true;
        }
        let water = self.header.water_level;
        let submerged = (self.elevations[idx] as f64) < water;
        submerged && pos.y > water && pos.y < water + WATER_DETECTION_CEILING
    }

    /// Gather everything the classifier needs at `pos`.
    pub fn sample(&self, pos: &Position) -> Option<TerrainSample> {
        let idx = self.nearest_cell(pos)?;
        Some(TerrainSample {
            y: pos.y,
            over_water: self.is_over_water(pos),
            topology: self.topology[idx],
            biome: self.biomes[idx],
        })
    }
}

impl TerrainSensor for TerrainGrid {
    fn classify(&self, position: Position) -> Result<TerrainReading, SensorError> {
        if self.elevations.is_empty() {
            return Err(SensorError::TerrainUnavailable("empty heightfield".into()));
        }
        let sample = self
            .sample(&position)
            .ok_or_else(|| SensorError::out_of_bounds(position))?;
        let elevation = self
            .elevation_at(&position)
            .ok_or_else(|| SensorError::out_of_bounds(position))?;

        // Below the heightfield (tunnels) the downward ray has nothing to hit.
        let height_above = position.y - elevation;
        let terrain_hit = (height_above >= 0.0).then_some(height_above);
        let ground_distance = resolve_ground_distance(
            position.y,
            terrain_hit,
            sample.over_water,
            self.header.water_level,
        );

        let location = classify_location(&sample, self.tunnel_threshold);
        Ok(TerrainReading {
            ground_distance,
            location,
            multiplier: self.multipliers.multiplier(location),
        })
    }
}
