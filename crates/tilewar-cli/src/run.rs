//! `tilewar run`: a headless match between random-walk bots.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tilewar_core::{JoinError, PlayerId, StateSnapshot};
use tilewar_engine::{ChannelBroadcast, LockstepMatch, MatchConfig, RealtimeMatch, SubmitError};
use tilewar_space::{choose_map_file, load_map_file, TerrainGrid};

use crate::bot::RandomWalkBot;

/// Moves each bot may issue per tick.
const MOVES_PER_TICK: usize = 3;

pub(crate) struct RunOptions {
    pub map: Option<PathBuf>,
    pub map_dir: PathBuf,
    pub ticks: u64,
    pub players: usize,
    pub seed: Option<u64>,
    pub config: Option<PathBuf>,
    pub realtime: bool,
    pub summary_every: u64,
}

pub(crate) fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<MatchConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            MatchConfig::from_toml_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => MatchConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    Ok(config)
}

pub(crate) fn load_grid(map: Option<&Path>, map_dir: &Path, seed: u64) -> Result<TerrainGrid> {
    let path = match map {
        Some(path) => path.to_path_buf(),
        None => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            choose_map_file(map_dir, &mut rng)?
        }
    };
    log::info!("using map {}", path.display());
    Ok(load_map_file(&path)?)
}

fn make_bots(count: usize, seed: u64) -> Vec<RandomWalkBot> {
    (0..count)
        .map(|i| RandomWalkBot::new(PlayerId::new(format!("bot{}", i + 1)), seed ^ (i as u64 + 1)))
        .collect()
}

fn log_summary(snapshot: &StateSnapshot) {
    let standings = snapshot.standings();
    if standings.is_empty() {
        log::info!("tick {}: no players on the board", snapshot.tick);
        return;
    }
    for (player, s) in &standings {
        log::info!(
            "tick {}: {player} holds {} cells, {} army, {} strongholds{}",
            snapshot.tick,
            s.cells,
            s.army,
            s.strongholds,
            if s.has_home { "" } else { ", home lost" }
        );
    }
}

pub(crate) fn run(opts: RunOptions) -> Result<StateSnapshot> {
    if opts.players == 0 {
        bail!("at least one player is required");
    }
    let config = load_config(opts.config.as_deref(), opts.seed)?;
    let grid = load_grid(opts.map.as_deref(), &opts.map_dir, config.seed)?;
    let bots = make_bots(opts.players, config.seed);
    if opts.realtime {
        run_realtime(grid, config, bots, &opts)
    } else {
        run_lockstep(grid, config, bots, &opts)
    }
}

fn run_lockstep(
    grid: TerrainGrid,
    config: MatchConfig,
    mut bots: Vec<RandomWalkBot>,
    opts: &RunOptions,
) -> Result<StateSnapshot> {
    let mut game = LockstepMatch::new(grid.clone(), config)?;
    bots.retain(|bot| match game.join(bot.player()) {
        Ok(_) => true,
        Err(JoinError::NoSpawnAvailable) => {
            log::warn!("{} could not join: map full", bot.player());
            false
        }
    });

    let mut snapshot = game.snapshot();
    for _ in 0..opts.ticks {
        for bot in &mut bots {
            for cmd in bot.plan(&grid, &snapshot, MOVES_PER_TICK) {
                game.submit_move(cmd);
            }
        }
        let result = game.step()?;
        snapshot = Arc::unwrap_or_clone(result.snapshot);
        if opts.summary_every > 0 && snapshot.tick.0 % opts.summary_every == 0 {
            log_summary(&snapshot);
        }
    }
    Ok(snapshot)
}

fn run_realtime(
    grid: TerrainGrid,
    config: MatchConfig,
    mut bots: Vec<RandomWalkBot>,
    opts: &RunOptions,
) -> Result<StateSnapshot> {
    let patience = config
        .tick_period()
        .saturating_mul(5)
        .saturating_add(Duration::from_secs(1));
    let sink = Arc::new(ChannelBroadcast::new());
    let snapshots = sink.subscribe();
    let mut game = RealtimeMatch::start(grid.clone(), config, sink)?;

    let mut joined = Vec::with_capacity(bots.len());
    for bot in bots.drain(..) {
        match game.join(bot.player()) {
            Ok(_) => joined.push(bot),
            Err(SubmitError::Join(e)) => log::warn!("{} could not join: {e}", bot.player()),
            Err(e) => return Err(e.into()),
        }
    }

    let mut last = game.snapshot();
    while last.tick.0 < opts.ticks {
        let snapshot = snapshots
            .recv_timeout(patience)
            .context("no snapshot from the tick thread")?;
        // Join broadcasts repeat the current tick; only react to new ticks.
        if snapshot.tick <= last.tick {
            continue;
        }
        for bot in &mut joined {
            for cmd in bot.plan(&grid, &snapshot, MOVES_PER_TICK) {
                game.submit_move(cmd)?;
            }
        }
        if opts.summary_every > 0 && snapshot.tick.0 > 0 && snapshot.tick.0 % opts.summary_every == 0 {
            log_summary(&snapshot);
        }
        last = Arc::unwrap_or_clone(snapshot);
    }

    game.shutdown();
    Ok(game.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewar_space::{save_map_file, MapGenerator};

    fn options(dir: &Path) -> RunOptions {
        RunOptions {
            map: None,
            map_dir: dir.to_path_buf(),
            ticks: 30,
            players: 3,
            seed: Some(5),
            config: None,
            realtime: false,
            summary_every: 10,
        }
    }

    #[test]
    fn lockstep_run_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let grid = MapGenerator::with_size(10, 10)
            .generate(&mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        save_map_file(dir.path(), &grid).unwrap();

        let a = run(options(dir.path())).unwrap();
        let b = run(options(dir.path())).unwrap();
        assert_eq!(a.tick.0, 30);
        assert_eq!(a, b);
        assert_eq!(a.standings().len(), 3);
    }

    #[test]
    fn config_file_and_seed_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.toml");
        std::fs::write(&path, "seed = 3\nbonus_interval = 10\n").unwrap();
        let cfg = load_config(Some(&path), None).unwrap();
        assert_eq!((cfg.seed, cfg.bonus_interval), (3, 10));
        let cfg = load_config(Some(&path), Some(8)).unwrap();
        assert_eq!(cfg.seed, 8);
    }

    #[test]
    fn unusable_tick_rate_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slow.toml");
        std::fs::write(&path, "tick_rate_hz = 1e-20\n").unwrap();
        let err = load_config(Some(&path), None).unwrap_err();
        assert!(format!("{err:#}").contains("tick_rate_hz"));

        let map = dir.path().join("arena.map");
        std::fs::write(&map, "000\n000\n").unwrap();
        let opts = RunOptions {
            map: Some(map),
            config: Some(path),
            realtime: true,
            ..options(dir.path())
        };
        assert!(run(opts).is_err());
    }

    #[test]
    fn empty_map_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(options(dir.path())).is_err());
    }

    #[test]
    fn realtime_run_reaches_tick_count() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_path = dir.path().join("fast.toml");
        std::fs::write(&cfg_path, "tick_rate_hz = 200.0\n").unwrap();
        let map = dir.path().join("arena.map");
        std::fs::write(&map, "00000\n00200\n00000\n").unwrap();
        let opts = RunOptions {
            map: Some(map),
            ticks: 5,
            players: 2,
            config: Some(cfg_path),
            realtime: true,
            ..options(dir.path())
        };
        let snap = run(opts).unwrap();
        assert!(snap.tick.0 >= 5);
    }
}
