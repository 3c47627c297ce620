//! tilewar CLI: map generation and headless matches.

mod bot;
mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilewar_space::{save_map_file, MapGenerator};

/// tilewar - tick-synchronized territorial conquest
#[derive(Parser, Debug)]
#[command(name = "tilewar")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a random map and write it as the next numbered .map file
    GenMap {
        /// Number of columns
        #[arg(long, default_value = "30")]
        width: usize,

        /// Number of rows
        #[arg(long, default_value = "30")]
        height: usize,

        /// Fraction of cells that are strongholds
        #[arg(long, default_value = "0.05")]
        strongholds: f64,

        /// Fraction of cells that are obstacles
        #[arg(long, default_value = "0.20")]
        obstacles: f64,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output directory
        #[arg(long, default_value = "maps")]
        dir: PathBuf,
    },

    /// Run a headless match between random-walk bots
    Run {
        /// Map file to play on
        #[arg(long, conflicts_with = "map_dir")]
        map: Option<PathBuf>,

        /// Directory to pick a random .map file from
        #[arg(long, default_value = "maps")]
        map_dir: PathBuf,

        /// Number of ticks to play
        #[arg(short, long, default_value = "100")]
        ticks: u64,

        /// Number of bots
        #[arg(short, long, default_value = "2")]
        players: usize,

        /// Random seed (overrides the config file)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Match config TOML file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Run on the realtime tick thread instead of lockstep
        #[arg(long)]
        realtime: bool,

        /// Log standings every N ticks (0 disables)
        #[arg(long, default_value = "10")]
        summary_every: u64,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Args::parse().command {
        Commands::GenMap {
            width,
            height,
            strongholds,
            obstacles,
            seed,
            dir,
        } => {
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            let generator = MapGenerator {
                width,
                height,
                stronghold_ratio: strongholds,
                obstacle_ratio: obstacles,
            };
            let grid = generator.generate(&mut ChaCha8Rng::seed_from_u64(seed))?;
            let path = save_map_file(&dir, &grid)?;
            log::info!("seed {seed}");
            println!("{}", path.display());
        }

        Commands::Run {
            map,
            map_dir,
            ticks,
            players,
            seed,
            config,
            realtime,
            summary_every,
        } => {
            let snapshot = run::run(run::RunOptions {
                map,
                map_dir,
                ticks,
                players,
                seed,
                config,
                realtime,
                summary_every,
            })?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    Ok(())
}
