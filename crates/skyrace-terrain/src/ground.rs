//! Distance from a flying vehicle to whatever is below it.

use skyrace_core::constants::NO_GROUND_DISTANCE;

/// Skin subtracted from a terrain hit so resting on the ground reads ~0.
pub const RAY_SKIN: f64 = 0.2;

/// Pick the closer of the terrain hit and the water surface.
///
/// `terrain_hit` is the raw downward ray distance, `None` when the ray found
/// nothing within [`NO_GROUND_DISTANCE`]. Water only counts when the position
/// is over water. With neither, the "no ground" sentinel is returned.
pub fn resolve_ground_distance(
    y: f64,
    terrain_hit: Option<f64>,
    over_water: bool,
    water_level: f64,
) -> f64 {
    let terrain = terrain_hit
        .filter(|hit| *hit <= NO_GROUND_DISTANCE)
        .map(|hit| (hit - RAY_SKIN).max(0.0));
    let water = over_water.then(|| (y - water_level).max(0.0));

    match (terrain, water) {
        (Some(t), Some(w)) => t.min(w),
        (None, Some(w)) => w.min(NO_GROUND_DISTANCE),
        (Some(t), None) => t,
        (None, None) => NO_GROUND_DISTANCE,
    }
}
