//! Match-state invariants: sanity checks that detect engine bugs.
//!
//! These should never trigger. The tick engine runs them after every tick
//! in debug builds and the property tests run them after every command.

use std::collections::HashMap;

use tilewar_core::{PlayerId, Terrain};

use crate::state::MatchState;

/// Invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all match-state invariants.
///
/// Returns every violation found, or an empty list if all hold.
#[must_use]
pub fn check_invariants(state: &MatchState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut homes: HashMap<&PlayerId, usize> = HashMap::new();

    for (coord, cell) in state.cells() {
        match &cell.owner {
            None if cell.is_home => violations.push(InvariantViolation {
                message: format!("unowned cell {coord} is marked as a home"),
            }),
            Some(owner) if cell.is_home => *homes.entry(owner).or_default() += 1,
            _ => {}
        }

        if cell.terrain == Terrain::Obstacle {
            if let Some(owner) = &cell.owner {
                violations.push(InvariantViolation {
                    message: format!("obstacle {coord} is owned by {owner}"),
                });
            }
            if cell.army != 0 {
                violations.push(InvariantViolation {
                    message: format!("obstacle {coord} holds army {}", cell.army),
                });
            }
        }
    }

    for (player, count) in homes {
        if count > 1 {
            violations.push(InvariantViolation {
                message: format!("player {player} has {count} home cells"),
            });
        }
    }

    violations
}

/// Check that no cell is flagged as moved. Holds at the start of every tick.
#[must_use]
pub fn check_moved_flags_clear(state: &MatchState) -> Vec<InvariantViolation> {
    state
        .cells()
        .filter(|(_, c)| c.moved_this_tick)
        .map(|(coord, _)| InvariantViolation {
            message: format!("cell {coord} still flagged as moved"),
        })
        .collect()
}
