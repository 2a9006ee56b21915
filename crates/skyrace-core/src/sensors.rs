//! Sensor interfaces the engine reads each tick.
//!
//! Terrain and vehicle physics live in the host; the engine only sees
//! synchronous snapshots through these traits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{NEUTRAL_MULTIPLIER, NO_GROUND_DISTANCE};
use crate::enums::LocationKind;
use crate::types::{Position, VehicleHandle};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainReading {
    /// Distance to the closer of terrain or water surface below (meters).
    pub ground_distance: f64,
    pub location: LocationKind,
    pub multiplier: f64,
}

impl TerrainReading {
    /// Reading used when the terrain can't be sampled: no ground, neutral location.
    pub fn unavailable() -> Self {
        Self {
            ground_distance: NO_GROUND_DISTANCE,
            location: LocationKind::Default,
            multiplier: NEUTRAL_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleReading {
    /// Speed magnitude (m/s).
    pub speed: f64,
    /// y component of the vehicle's up vector: 1.0 level, -1.0 fully inverted.
    pub up_y: f64,
    pub position: Position,
}

impl VehicleReading {
    /// Reading used when the vehicle can't be sampled: stationary, level, last known position.
    pub fn unavailable(last_position: Position) -> Self {
        Self {
            speed: 0.0,
            up_y: 1.0,
            position: last_position,
        }
    }

    pub fn is_upright(&self, upside_down_threshold: f64) -> bool {
        self.up_y >= upside_down_threshold
    }
}

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("{0} is not available")]
    VehicleUnavailable(VehicleHandle),
    #[error("position ({x:.1}, {y:.1}, {z:.1}) is outside the terrain")]
    OutOfBounds { x: f64, y: f64, z: f64 },
    #[error("terrain data unavailable: {0}")]
    TerrainUnavailable(String),
}

impl SensorError {
    pub fn out_of_bounds(position: Position) -> Self {
        SensorError::OutOfBounds {
            x: position.x,
            y: position.y,
            z: position.z,
        }
    }
}

pub trait TerrainSensor {
    fn classify(&self, position: Position) -> Result<TerrainReading, SensorError>;
}

pub trait VehicleSensor {
    fn read(&self, vehicle: VehicleHandle) -> Result<VehicleReading, SensorError>;
}

/// Latest vehicle readings published by the host's physics loop.
///
/// Cloning shares the same table, so the host keeps one handle to write and
/// hands another to the engine.
#[derive(Debug, Clone, Default)]
pub struct VehicleBoard {
    readings: Arc<Mutex<HashMap<VehicleHandle, VehicleReading>>>,
}

impl VehicleBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, vehicle: VehicleHandle, reading: VehicleReading) {
        if let Ok(mut readings) = self.readings.lock() {
            readings.insert(vehicle, reading);
        }
    }

    pub fn remove(&self, vehicle: VehicleHandle) {
        if let Ok(mut readings) = self.readings.lock() {
            readings.remove(&vehicle);
        }
    }
}

impl VehicleSensor for VehicleBoard {
    fn read(&self, vehicle: VehicleHandle) -> Result<VehicleReading, SensorError> {
        let readings = self
            .readings
            .lock()
            .map_err(|_| SensorError::VehicleUnavailable(vehicle))?;
        readings
            .get(&vehicle)
            .copied()
            .ok_or(SensorError::VehicleUnavailable(vehicle))
    }
}

/// Terrain with the same reading everywhere. Useful for flat test maps.
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain {
    /// Ground height (y).
    pub ground_y: f64,
    pub location: LocationKind,
    pub multiplier: f64,
}

impl FlatTerrain {
    pub fn new(ground_y: f64) -> Self {
        Self {
            ground_y,
            location: LocationKind::Default,
            multiplier: NEUTRAL_MULTIPLIER,
        }
    }
}

impl TerrainSensor for FlatTerrain {
    fn classify(&self, position: Position) -> Result<TerrainReading, SensorError> {
        Ok(TerrainReading {
            ground_distance: (position.y - self.ground_y).clamp(0.0, NO_GROUND_DISTANCE),
            location: self.location,
            multiplier: self.multiplier,
        })
    }
}
