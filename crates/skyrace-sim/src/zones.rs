//! Fly-through zones: the shared registry and the per-session bonus evaluator.

use std::collections::{BTreeMap, HashMap};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use skyrace_core::config::ZoneConfig;
use skyrace_core::constants::*;
use skyrace_core::events::FlightEvent;
use skyrace_core::records::Zone;
use skyrace_core::types::{elapsed, Position, Timestamp, ZoneId};

#[derive(Debug, Error, PartialEq)]
pub enum ZoneError {
    #[error("zone radius must be in (0, 200] meters (got {0})")]
    InvalidRadius(f64),
    #[error("zone difficulty must be 1-5 (got {0})")]
    InvalidDifficulty(u8),
    #[error("no zone with id {0}")]
    UnknownZone(ZoneId),
    #[error("no zones exist")]
    NoZones,
}

/// Parameters of a zone to create.
#[derive(Debug, Clone)]
pub struct NewZone {
    /// `None` picks `Zone_<n>`.
    pub name: Option<String>,
    pub center: Position,
    pub radius: f64,
    pub difficulty: u8,
    pub created_by: String,
}

/// All configured zones, keyed by id.
///
/// Mutation needs `&mut`, so administrative edits can never interleave with a
/// scoring pass that borrows the registry.
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: BTreeMap<ZoneId, Zone>,
    rng: ChaCha8Rng,
}

impl ZoneRegistry {
    /// Empty registry; `seed` drives id generation.
    pub fn new(seed: u64) -> Self {
        Self {
            zones: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Registry holding previously saved zones. Zones that `create` would
    /// refuse are dropped with a warning.
    pub fn from_zones(zones: impl IntoIterator<Item = Zone>, seed: u64) -> Self {
        let mut registry = Self::new(seed);
        for zone in zones {
            if let Err(error) = validate(zone.radius, zone.difficulty) {
                tracing::warn!(
                    target: "skyrace::zones",
                    id = %zone.id,
                    %error,
                    "zone.rejected"
                );
                continue;
            }
            registry.zones.insert(zone.id.clone(), zone);
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn get(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    /// Owned copy of every zone, for saving.
    pub fn to_vec(&self) -> Vec<Zone> {
        self.zones.values().cloned().collect()
    }

    pub fn create(&mut self, request: NewZone) -> Result<&Zone, ZoneError> {
        validate(request.radius, request.difficulty)?;

        let id = self.generate_id();
        let name = request
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Zone_{}", self.zones.len() + 1));
        let zone = Zone {
            id: id.clone(),
            name,
            center: request.center,
            radius: request.radius,
            difficulty: request.difficulty,
            created_by: request.created_by,
        };
        tracing::info!(
            target: "skyrace::zones",
            id = %zone.id,
            name = %zone.name,
            radius = zone.radius,
            difficulty = zone.difficulty,
            "zone.created"
        );
        Ok(self.zones.entry(id).or_insert(zone))
    }

    fn generate_id(&mut self) -> ZoneId {
        loop {
            let value: u32 = self.rng.gen();
            let id = ZoneId::new(format!("{value:0width$x}", width = ZONE_ID_LENGTH));
            if !self.zones.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn delete(&mut self, id: &ZoneId) -> Result<Zone, ZoneError> {
        let zone = self
            .zones
            .remove(id)
            .ok_or_else(|| ZoneError::UnknownZone(id.clone()))?;
        tracing::info!(target: "skyrace::zones", id = %zone.id, "zone.deleted");
        Ok(zone)
    }

    /// Zone whose center is nearest to `position`, with its distance.
    pub fn closest(&self, position: Position) -> Option<(&Zone, f64)> {
        self.zones
            .values()
            .map(|zone| (zone, zone.center.distance(position)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn delete_closest(&mut self, position: Position) -> Result<Zone, ZoneError> {
        let id = self
            .closest(position)
            .map(|(zone, _)| zone.id.clone())
            .ok_or(ZoneError::NoZones)?;
        self.delete(&id)
    }

    /// Zones whose center lies within `max_radius` of `position`.
    pub fn nearby(&self, position: Position, max_radius: f64) -> Vec<&Zone> {
        self.zones
            .values()
            .filter(|zone| zone.center.distance(position) <= max_radius)
            .collect()
    }

    /// Up to `limit` zones ordered by distance from `position`.
    pub fn list_by_distance(&self, position: Position, limit: usize) -> Vec<(&Zone, f64)> {
        let mut listed: Vec<(&Zone, f64)> = self
            .zones
            .values()
            .map(|zone| (zone, zone.center.distance(position)))
            .collect();
        listed.sort_by(|a, b| a.1.total_cmp(&b.1));
        listed.truncate(limit);
        listed
    }
}

fn validate(radius: f64, difficulty: u8) -> Result<(), ZoneError> {
    if !(radius > 0.0 && radius <= ZONE_MAX_RADIUS) {
        return Err(ZoneError::InvalidRadius(radius));
    }
    if !(ZONE_MIN_DIFFICULTY..=ZONE_MAX_DIFFICULTY).contains(&difficulty) {
        return Err(ZoneError::InvalidDifficulty(difficulty));
    }
    Ok(())
}

/// Multiplier for reaching a different zone `gap` seconds after the last one.
///
/// Falls linearly from the configured maximum at a zero gap to 1.0 at the
/// chain window.
pub fn chain_multiplier(gap: f64, config: &ZoneConfig) -> f64 {
    let t = (gap / config.chain_window_secs).clamp(0.0, 1.0);
    config.chain_max_multiplier + (1.0 - config.chain_max_multiplier) * t
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneTrigger {
    pub zone_id: ZoneId,
    pub bonus: f64,
    pub chain_multiplier: f64,
}

/// Per-session cooldowns and chain bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct ZoneTracker {
    cooldowns: HashMap<ZoneId, Timestamp>,
    last: Option<(ZoneId, Timestamp)>,
}

impl ZoneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger every zone `position` is inside of, returning the bonuses.
    ///
    /// Each zone triggers at most once per cooldown. Bonuses of overlapping
    /// zones are independent; a second zone in the same pass counts as a
    /// chain from the first.
    pub fn evaluate<'a>(
        &mut self,
        zones: impl IntoIterator<Item = &'a Zone>,
        position: Position,
        speed: f64,
        now: Timestamp,
        config: &ZoneConfig,
        events: &mut Vec<FlightEvent>,
    ) -> Vec<ZoneTrigger> {
        // NaN speed never qualifies.
        if !config.enabled || !(speed >= config.min_speed) {
            return Vec::new();
        }

        let mut triggers = Vec::new();
        for zone in zones {
            if !zone.contains(position) {
                continue;
            }
            if let Some(last) = self.cooldowns.get(&zone.id) {
                if elapsed(now, *last) < config.cooldown_secs {
                    continue;
                }
            }

            let mut bonus = config.bonus_multiplier
                * config.difficulty_multiplier(zone.difficulty)
                * ZONE_BASE_POINTS;
            let mut chain = NEUTRAL_MULTIPLIER;
            if let Some((last_id, last_time)) = &self.last {
                let gap = elapsed(now, *last_time);
                if *last_id != zone.id && gap < config.chain_window_secs {
                    chain = chain_multiplier(gap, config);
                    bonus *= chain;
                }
            }

            self.cooldowns.insert(zone.id.clone(), now);
            self.last = Some((zone.id.clone(), now));

            tracing::info!(
                target: "skyrace::zones",
                id = %zone.id,
                bonus,
                chain,
                "zone.triggered"
            );
            events.push(FlightEvent::ZoneTriggered {
                zone_id: zone.id.clone(),
                name: zone.name.clone(),
                difficulty: zone.difficulty,
                bonus,
                chain_multiplier: chain,
            });
            triggers.push(ZoneTrigger {
                zone_id: zone.id.clone(),
                bonus,
                chain_multiplier: chain,
            });
        }
        triggers
    }
}
