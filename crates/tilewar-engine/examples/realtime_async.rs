//! Realtime match: a background tick thread broadcasting snapshots.
//!
//! Run with:
//!   cargo run --example realtime_async

use std::sync::Arc;
use std::time::Duration;

use tilewar_core::{Direction, MoveCommand, PlayerId};
use tilewar_engine::{ChannelBroadcast, MatchConfig, RealtimeMatch};
use tilewar_space::TerrainGrid;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let grid = TerrainGrid::parse(
        "00000000\n\
         00100200\n\
         00000000\n\
         02001000\n\
         00000000",
    )?;
    let config = MatchConfig {
        tick_rate_hz: 20.0,
        ..MatchConfig::default()
    };

    let sink = Arc::new(ChannelBroadcast::new());
    let snapshots = sink.subscribe();
    let mut game = RealtimeMatch::start(grid, config, sink)?;

    let me = PlayerId::new("solo");
    let home = game.join(&me)?.home;
    println!("joined at {home}");

    for _ in 0..20 {
        let snap = snapshots.recv_timeout(Duration::from_secs(1))?;
        let outcome = game.submit_move(MoveCommand::new(me.clone(), home, Direction::Right))?;
        println!("tick {:>3}: move -> {outcome:?}", snap.tick);
    }

    let ticks = game.shutdown().unwrap_or(0);
    println!("\nstopped after {ticks} ticks");
    println!("{}", game.snapshot().to_json()?);
    Ok(())
}
