//! Terrain sensing for SKYRACE.
//!
//! Location classification, ground-distance resolution and a heightfield
//! grid that implements the engine's `TerrainSensor`.

pub use skyrace_core as core;

pub mod classify;
pub mod grid;
pub mod ground;

// Re-export key types for convenience.
pub use classify::{classify_location, BiomeWeights, TerrainSample, Topology};
pub use grid::{TerrainGrid, TerrainHeader};
pub use ground::resolve_ground_distance;
