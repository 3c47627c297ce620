//! Property tests: match invariants hold under arbitrary command streams.

use proptest::prelude::*;
use tilewar_core::{CellCoord, Direction, MoveCommand, MoveOutcome, PlayerId, Terrain};
use tilewar_engine::{check_invariants, check_moved_flags_clear, LockstepMatch, MatchConfig};
use tilewar_space::MapGenerator;

const PLAYERS: [&str; 3] = ["red", "green", "blue"];

#[derive(Clone, Debug)]
enum Action {
    Join(usize),
    Move {
        player: usize,
        row: usize,
        col: usize,
        dir: Direction,
    },
    Tick,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        1 => (0..PLAYERS.len()).prop_map(Action::Join),
        8 => (0..PLAYERS.len(), 0usize..10, 0usize..10, 0usize..4).prop_map(
            |(player, row, col, d)| Action::Move {
                player,
                row,
                col,
                dir: Direction::ALL[d],
            }
        ),
        3 => Just(Action::Tick),
    ]
}

fn new_match(seed: u64) -> LockstepMatch {
    use rand::SeedableRng;
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
    let grid = MapGenerator::with_size(8, 8).generate(&mut rng).unwrap();
    let config = MatchConfig {
        seed,
        bonus_interval: 5,
        ..MatchConfig::default()
    };
    LockstepMatch::new(grid, config).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold(seed in 0u64..1000, actions in prop::collection::vec(action(), 1..200)) {
        let mut game = new_match(seed);
        let initial = game.snapshot();

        for action in actions {
            match action {
                Action::Join(p) => {
                    let _ = game.join(&PlayerId::new(PLAYERS[p]));
                }
                Action::Move { player, row, col, dir } => {
                    let cmd = MoveCommand::new(PLAYERS[player], CellCoord::new(row, col), dir);
                    let outcome = game.submit_move(cmd);
                    if let MoveOutcome::Buffered { .. } = outcome {
                        prop_assert!(game.engine().pending_moves() > 0);
                    }
                }
                Action::Tick => {
                    let pending = game.engine().pending_moves();
                    let result = game.step().unwrap();
                    prop_assert_eq!(result.metrics.buffered_drained, pending);
                    prop_assert_eq!(game.engine().pending_moves(), 0);
                    if pending == 0 {
                        prop_assert!(check_moved_flags_clear(game.state()).is_empty());
                    }
                }
            }

            let violations = check_invariants(game.state());
            prop_assert!(violations.is_empty(), "{:?}", violations);

            let snap = game.snapshot();
            for (row, cells) in snap.cells.iter().enumerate() {
                for (col, cell) in cells.iter().enumerate() {
                    let start = &initial.cells[row][col];
                    prop_assert_eq!(cell.terrain, start.terrain);
                    // Unclaimed strongholds only ever lose units.
                    if cell.terrain == Terrain::Stronghold && cell.owner.is_none() {
                        prop_assert!(cell.army <= start.army);
                    }
                    if cell.terrain == Terrain::Obstacle {
                        prop_assert_eq!(cell.army, 0);
                    }
                }
            }
        }
    }

    #[test]
    fn ticks_are_monotonic(seed in 0u64..100, n in 1u64..40) {
        let mut game = new_match(seed);
        let mut last = game.current_tick();
        for _ in 0..n {
            let tick = game.step().unwrap().snapshot.tick;
            prop_assert_eq!(tick, last.next());
            last = tick;
        }
    }
}
