//! tilewar quickstart: a complete lockstep match from scratch.
//!
//! Demonstrates:
//!   1. Generating a terrain grid
//!   2. Building a MatchConfig and LockstepMatch
//!   3. Joining players and submitting moves
//!   4. Stepping ticks and reading snapshots and metrics
//!
//! Run with:
//!   cargo run --example quickstart

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tilewar_core::{Direction, MoveCommand, PlayerId};
use tilewar_engine::{LockstepMatch, MatchConfig};
use tilewar_space::MapGenerator;

// ─── Match parameters ───────────────────────────────────────────

const SIZE: usize = 12;
const TICKS: u64 = 60;
const SEED: u64 = 42;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== tilewar quickstart ===\n");

    // 1. Terrain.
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let grid = MapGenerator::with_size(SIZE, SIZE).generate(&mut rng)?;
    print!("{}", grid.to_map_text());

    // 2. Match.
    let config = MatchConfig {
        seed: SEED,
        ..MatchConfig::default()
    };
    let mut game = LockstepMatch::new(grid, config)?;

    // 3. Players.
    let players: Vec<PlayerId> = ["north", "south"].into_iter().map(PlayerId::new).collect();
    let mut homes = Vec::new();
    for p in &players {
        let spawn = game.join(p)?;
        println!("{p} spawned at {}", spawn.home);
        homes.push(spawn.home);
    }

    // 4. Each player pushes out of their home in a rotating direction.
    println!();
    for t in 0..TICKS {
        for (p, home) in players.iter().zip(&homes) {
            let dir = Direction::ALL[(t as usize) % 4];
            game.submit_move(MoveCommand::new(p.clone(), *home, dir));
        }
        let result = game.step()?;
        if result.snapshot.tick.0 % 10 == 0 {
            let standings = result.snapshot.standings();
            let summary: Vec<String> = standings
                .iter()
                .map(|(p, s)| format!("{p}: {} cells / {} army", s.cells, s.army))
                .collect();
            println!(
                "  tick {:>3}: {}  ({}us)",
                result.snapshot.tick,
                summary.join(", "),
                result.metrics.total_us
            );
        }
    }

    Ok(())
}
