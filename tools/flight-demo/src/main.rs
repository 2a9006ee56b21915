//! flight-demo: fly scripted pilots over a synthetic map and print the leaderboard.
//!
//! Usage:
//!   flight-demo --data-dir ./skyrace-data --seconds 90
//!   RUST_LOG=skyrace=debug flight-demo --config rules.json

use std::f64::consts::PI;
use std::path::PathBuf;
use std::process;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use skyrace_core::config::SkillRaceConfig;
use skyrace_core::sensors::{VehicleBoard, VehicleReading};
use skyrace_core::sinks::LogSink;
use skyrace_core::types::{PlayerId, Position, VehicleHandle};
use skyrace_sim::zones::{NewZone, ZoneRegistry};
use skyrace_sim::{Collaborators, EngineConfig, SkillRaceEngine};
use skyrace_store::{load_zones, save_zones, JsonFileStore};
use skyrace_terrain::{BiomeWeights, Topology, TerrainGrid, TerrainHeader};

const GRID_SIZE: u32 = 128;
const CELL_SIZE: f64 = 10.0;
const CIRCUIT_RADIUS: f64 = 400.0;

const ACE: PlayerId = PlayerId(76561198000000101);
const ROOKIE: PlayerId = PlayerId(76561198000000102);
const ACE_HELI: VehicleHandle = VehicleHandle(101);
const ROOKIE_HELI: VehicleHandle = VehicleHandle(102);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h" || a == "help") {
        print_usage();
        return;
    }

    let config_path = parse_path(&args, "--config");
    let data_dir = parse_path(&args, "--data-dir").unwrap_or_else(|| PathBuf::from("skyrace-data"));
    let seconds = parse_number(&args, "--seconds", 90.0);
    let seed = parse_number(&args, "--seed", 7.0) as u64;
    if seconds < 20.0 {
        eprintln!("Error: --seconds must be at least 20");
        process::exit(1);
    }

    tracing::info!(
        target: "skyrace::demo",
        seconds,
        seed,
        data_dir = %data_dir.display(),
        "demo.started"
    );
    let rules = SkillRaceConfig::load_or_default(config_path.as_deref());
    let mut grid = generate_terrain(seed);
    grid.configure(&rules);

    let zones_path = data_dir.join("zones.json");
    let zones = match load_zones(&zones_path) {
        Ok(zones) => zones,
        Err(e) => {
            eprintln!("Error loading zones: {e}");
            process::exit(1);
        }
    };
    let mut registry = ZoneRegistry::from_zones(zones, seed);
    if registry.is_empty() {
        seed_zones(&mut registry, &grid);
        if let Err(e) = save_zones(&zones_path, &registry.to_vec()) {
            eprintln!("Error saving zones: {e}");
            process::exit(1);
        }
    }
    eprintln!("{} zone(s) on the circuit", registry.len());

    let board = VehicleBoard::new();
    let interval = rules.scoring.interval_secs;
    let mut engine = SkillRaceEngine::new(
        EngineConfig {
            rules,
            zone_seed: seed,
        },
        Collaborators {
            terrain: Box::new(grid.clone()),
            vehicles: Box::new(board.clone()),
            store: Box::new(JsonFileStore::in_dir(&data_dir)),
            sink: Box::new(LogSink),
        },
    )
    .with_zones(registry);

    engine.begin_session(ACE, "ace", ACE_HELI, 0.0);
    engine.begin_session(ROOKIE, "rookie", ROOKIE_HELI, 0.0);

    let crash_at = seconds - 10.0;
    let rookie_lost_at = (seconds * 0.6).floor();
    let mut t = 0.0;
    let mut ace_hit = false;
    while t <= seconds {
        board.publish(ACE_HELI, ace_reading(&grid, t));
        if engine.is_tracking(ROOKIE) {
            board.publish(ROOKIE_HELI, rookie_reading(&grid, t));
        }
        engine.tick(t);

        if !ace_hit && t >= crash_at {
            engine.on_vehicle_damaged(ACE, 25.0, t);
            ace_hit = true;
        }
        if engine.is_tracking(ROOKIE) && t >= rookie_lost_at {
            engine.on_vehicle_destroyed(ROOKIE, t);
        }
        t += interval;
    }
    if let Some(score) = engine.end_session(ACE, t) {
        eprintln!("ace finished the flight with {score:.1} points");
    }

    println!("{:>4}  {:<12} {:>10}", "#", "player", "score");
    for entry in engine.leaderboard() {
        println!(
            "{:>4}  {:<12} {:>10.1}",
            entry.rank, entry.display_name, entry.total_score
        );
    }
}

fn print_usage() {
    eprintln!(
        "flight-demo: SKYRACE scripted flight\n\
         \n\
           --config <path>    Rules file (JSON; missing fields use defaults)\n\
           --data-dir <path>  Where players.json and zones.json live (default: skyrace-data)\n\
           --seconds <N>      Flight length in seconds (default: 90)\n\
           --seed <N>         Terrain and zone id seed (default: 7)\n\
         \n\
         Log verbosity comes from RUST_LOG, e.g. RUST_LOG=skyrace=debug.\n"
    );
}

fn parse_path(args: &[String], flag: &str) -> Option<PathBuf> {
    args.windows(2)
        .find(|pair| pair[0] == flag)
        .map(|pair| PathBuf::from(&pair[1]))
}

fn parse_number(args: &[String], flag: &str, default: f64) -> f64 {
    args.windows(2)
        .find(|pair| pair[0] == flag)
        .and_then(|pair| pair[1].parse().ok())
        .unwrap_or(default)
}

// --- Terrain ---

/// Rolling hills with a lake, a road, a river, a forest and a dry basin.
fn generate_terrain(seed: u64) -> TerrainGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let half = GRID_SIZE as f64 * CELL_SIZE / 2.0;
    let lake = (200.0, -200.0, 120.0);

    let mut elevations = Vec::with_capacity((GRID_SIZE * GRID_SIZE) as usize);
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let x = -half + col as f64 * CELL_SIZE;
            let z = -half + row as f64 * CELL_SIZE;
            let in_lake = ((x - lake.0).powi(2) + (z - lake.1).powi(2)).sqrt() < lake.2;
            let elevation = if in_lake {
                -6.0
            } else {
                12.0 + 10.0 * (x / 150.0).sin() * (z / 200.0).cos() + rng.gen_range(-0.5..0.5)
            };
            elevations.push(elevation as f32);
        }
    }

    let mut grid = TerrainGrid::new(
        TerrainHeader {
            origin_x: -half,
            origin_z: -half,
            cell_size: CELL_SIZE,
            width: GRID_SIZE,
            height: GRID_SIZE,
            water_level: 0.0,
        },
        elevations,
    );
    let last = GRID_SIZE as usize - 1;
    grid.paint_topology(
        63..=64,
        0..=last,
        Topology {
            road: true,
            ..Topology::default()
        },
    );
    grid.paint_topology(
        0..=last,
        90..=91,
        Topology {
            river: true,
            ..Topology::default()
        },
    );
    grid.paint_topology(
        80..=100,
        20..=50,
        Topology {
            forest: true,
            ..Topology::default()
        },
    );
    grid.paint_biome(
        20..=45,
        70..=110,
        BiomeWeights {
            arid: 0.85,
            temperate: 0.15,
            ..BiomeWeights::default()
        },
    );
    grid
}

/// Surface height (terrain or water) below a point.
fn surface_y(grid: &TerrainGrid, x: f64, z: f64) -> f64 {
    let ground = grid.elevation_at(&Position::new(x, 0.0, z)).unwrap_or(0.0);
    ground.max(grid.header.water_level)
}

/// Two zones close together on the circuit so the second one chains.
fn seed_zones(registry: &mut ZoneRegistry, grid: &TerrainGrid) {
    for (angle, name, difficulty) in [(0.6, "Hill Gate", 3), (0.8, "Ridge Gate", 4)] {
        let (x, z) = circuit_point(angle);
        let request = NewZone {
            name: Some(name.to_string()),
            center: Position::new(x, surface_y(grid, x, z) + 4.0, z),
            radius: 25.0,
            difficulty,
            created_by: "flight-demo".into(),
        };
        if let Err(e) = registry.create(request) {
            eprintln!("Skipping zone {name}: {e}");
        }
    }
}

// --- Flight scripts ---

fn circuit_point(angle: f64) -> (f64, f64) {
    (CIRCUIT_RADIUS * angle.cos(), CIRCUIT_RADIUS * angle.sin())
}

fn reading_at(grid: &TerrainGrid, angle: f64, agl: f64, speed: f64, up_y: f64) -> VehicleReading {
    let (x, z) = circuit_point(angle);
    VehicleReading {
        speed,
        up_y,
        position: Position::new(x, surface_y(grid, x, z) + agl, z),
    }
}

/// Low and fast, with a barrel roll at 40 s.
fn ace_reading(grid: &TerrainGrid, t: f64) -> VehicleReading {
    let speed = 30.0;
    let angle = t * speed / CIRCUIT_RADIUS;
    let inverted = (40.0..41.5).contains(&t);
    let up_y = if inverted { -0.9 } else { 1.0 };
    let agl = if inverted { 8.0 } else { 4.0 };
    reading_at(grid, angle, agl, speed, up_y)
}

/// Higher, slower and on the far side of the circuit.
fn rookie_reading(grid: &TerrainGrid, t: f64) -> VehicleReading {
    let speed = 12.0;
    reading_at(grid, PI + t * speed / CIRCUIT_RADIUS, 9.0, speed, 1.0)
}
