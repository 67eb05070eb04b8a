//! Dominance Zone Report
//!
//! Builds one faction's tactical map from a world snapshot (loaded from
//! JSON or generated from a seed) and writes the zone dump.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tactical_map::core::config::{default_config_path, TacticalMapConfig};
use tactical_map::core::types::FactionId;
use tactical_map::core::Result;
use tactical_map::tactical::TacticalAnalysisMap;
use tactical_map::world::{WorldSnapshot, WorldView};

/// Dominance Zone Report - build and dump a faction's tactical map
#[derive(Parser, Debug)]
#[command(name = "zone_report")]
#[command(about = "Build a faction's dominance zones and write a diagnostic dump")]
struct Args {
    /// World snapshot as JSON; a world is generated when omitted
    #[arg(long)]
    world: Option<PathBuf>,

    /// Random seed for the generated world
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Generated map width in cells
    #[arg(long, default_value_t = 40)]
    width: i32,

    /// Generated map height in cells
    #[arg(long, default_value_t = 24)]
    height: i32,

    /// Faction whose view is analysed
    #[arg(long, default_value_t = 0)]
    faction: u32,

    /// Tunables as TOML (defaults to data/tactical_map.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the dump file
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Also write the map snapshot as JSON to this file
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Print a JSON summary of the zones to stdout
    #[arg(long)]
    json: bool,
}

/// One line of the stdout summary
#[derive(Serialize)]
struct ZoneSummary {
    id: i32,
    water: bool,
    settlement: Option<String>,
    territory: String,
    dominance: String,
    posture: String,
    value: i64,
}

fn load_config(args: &Args) -> Result<TacticalMapConfig> {
    match &args.config {
        Some(path) => TacticalMapConfig::load(path),
        None => {
            let path = default_config_path();
            if path.exists() {
                TacticalMapConfig::load(&path)
            } else {
                Ok(TacticalMapConfig::default())
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tactical_map=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let world = match &args.world {
        Some(path) => WorldSnapshot::load(path)?,
        None => WorldSnapshot::generate(args.width, args.height, args.seed),
    };
    tracing::info!(
        "World {}x{}, {} settlements, {} units",
        world.dims.width,
        world.dims.height,
        world.settlements.len(),
        world.units.len()
    );

    let faction = FactionId(args.faction);
    if world.faction(faction).is_none() {
        tracing::warn!("Faction {} is not part of this world", args.faction);
    }

    let mut map = TacticalAnalysisMap::new(faction, config);
    map.refresh(&world, true);
    tracing::info!(
        "Faction {}: {} zones at tactical range {}",
        args.faction,
        map.zone_count(),
        map.tactical_range()
    );

    std::fs::create_dir_all(&args.out)?;
    map.dump_to_file(&world, &args.out)?;

    if let Some(path) = &args.snapshot {
        let file = std::fs::File::create(path)?;
        map.save(std::io::BufWriter::new(file))?;
        tracing::info!("Wrote map snapshot to {}", path.display());
    }

    if args.json {
        let summary: Vec<ZoneSummary> = map
            .zones()
            .iter()
            .map(|z| ZoneSummary {
                id: z.id.0,
                water: z.is_water(),
                settlement: z
                    .settlement
                    .and_then(|id| world.settlement(id))
                    .map(|s| s.name.clone()),
                territory: format!("{:?}", z.territory),
                dominance: z.dominance.to_string(),
                posture: z.posture.to_string(),
                value: z.value,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
