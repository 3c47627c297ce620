//! Realtime mode under concurrent request handlers.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tilewar_core::{Direction, MoveCommand, PlayerId, StateSnapshot};
use tilewar_engine::{ChannelBroadcast, MatchConfig, RealtimeMatch};
use tilewar_test_utils::{c, Scenario};

fn assert_consistent(snap: &StateSnapshot) {
    let mut homes: HashMap<&PlayerId, usize> = HashMap::new();
    for cell in snap.cells.iter().flatten() {
        match &cell.owner {
            None => assert!(!cell.is_home),
            Some(owner) if cell.is_home => *homes.entry(owner).or_default() += 1,
            Some(_) => {}
        }
    }
    assert!(homes.values().all(|&n| n == 1));
}

#[test]
fn concurrent_handlers_keep_state_consistent() {
    let config = MatchConfig {
        tick_rate_hz: 500.0,
        seed: 9,
        ..MatchConfig::default()
    };
    let engine = Scenario::open(12, 12).config(config).build_engine();
    let sink = Arc::new(ChannelBroadcast::new());
    let rx = sink.subscribe();
    let game = Arc::new(RealtimeMatch::with_engine(engine, sink).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let game = Arc::clone(&game);
            thread::spawn(move || {
                let me = PlayerId::new(format!("p{i}"));
                let home = game.join(&me).unwrap().home;
                for n in 0..200 {
                    let dir = Direction::ALL[(n + i) % 4];
                    game.submit_move(MoveCommand::new(me.clone(), home, dir))
                        .unwrap();
                    if n % 20 == 0 {
                        thread::sleep(Duration::from_millis(1));
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let snap = game.snapshot();
    assert_consistent(&snap);
    assert_eq!(snap.standings().len(), 4);
    while let Ok(s) = rx.try_recv() {
        assert_consistent(&s);
    }
    game.stop();
    assert!(!game.is_running());
}

#[test]
fn snapshots_arrive_in_tick_order() {
    let config = MatchConfig {
        tick_rate_hz: 300.0,
        ..MatchConfig::default()
    };
    let engine = Scenario::open(4, 4)
        .config(config)
        .home("a", c(0, 0), 1)
        .build_engine();
    let sink = Arc::new(ChannelBroadcast::new());
    let rx = sink.subscribe();
    let mut game = RealtimeMatch::with_engine(engine, sink).unwrap();

    let mut last = 0;
    for _ in 0..10 {
        let snap = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(snap.tick.0 > last);
        last = snap.tick.0;
        // Home growth tracks the tick exactly.
        assert_eq!(snap.cell(c(0, 0)).unwrap().army as u64, 1 + snap.tick.0);
    }
    let ticks = game.shutdown().unwrap();
    assert!(ticks >= 10);
    assert_eq!(game.current_tick().0, ticks);
}
