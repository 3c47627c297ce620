//! Move resolution: one [`MoveCommand`] applied to a [`MatchState`].

use tilewar_core::{MoveCommand, MoveEffect, MoveRejection, Resolution, Terrain};

use crate::state::MatchState;

/// Apply one move to `state`.
///
/// The preconditions are checked in order and any failure leaves the
/// state untouched:
///
/// 1. the origin lies on the grid;
/// 2. the origin belongs to the issuing player;
/// 3. the origin holds more than one unit;
/// 4. the target lies on the grid;
/// 5. the target is not an obstacle.
///
/// Once they pass, every unit but one leaves the origin and the origin is
/// marked as moved. Enemy-held targets are then rejected with
/// [`MoveRejection::EnemyTerritory`] and the departed units are lost.
pub fn resolve_move(state: &mut MatchState, cmd: &MoveCommand) -> Resolution {
    match try_resolve(state, cmd) {
        Ok(effect) => Resolution::Applied(effect),
        Err(reason) => Resolution::Rejected(reason),
    }
}

fn try_resolve(state: &mut MatchState, cmd: &MoveCommand) -> Result<MoveEffect, MoveRejection> {
    let origin = state
        .cell(cmd.origin)
        .ok_or(MoveRejection::OriginOutOfBounds)?;
    if !origin.is_owned_by(&cmd.player) {
        return Err(MoveRejection::NotOwner);
    }
    if origin.army <= 1 {
        return Err(MoveRejection::InsufficientArmy);
    }
    let target_coord = state
        .terrain()
        .step(cmd.origin, cmd.direction)
        .ok_or(MoveRejection::TargetOutOfBounds)?;

    let (from, to) = state
        .cell_pair_mut(cmd.origin, target_coord)
        .ok_or(MoveRejection::TargetOutOfBounds)?;
    if to.terrain == Terrain::Obstacle {
        return Err(MoveRejection::Obstacle);
    }

    let moving = from.army - 1;
    from.army = 1;
    from.moved_this_tick = true;

    match &to.owner {
        None if to.terrain == Terrain::Stronghold => {
            if moving > to.army {
                to.army = (moving - to.army).max(1);
                to.owner = Some(cmd.player.clone());
                to.is_home = false;
                Ok(MoveEffect::StrongholdCaptured { army: to.army })
            } else {
                to.army -= moving;
                Ok(MoveEffect::StrongholdHeld { army: to.army })
            }
        }
        None => {
            to.owner = Some(cmd.player.clone());
            to.army = moving;
            to.is_home = false;
            Ok(MoveEffect::Claimed { army: to.army })
        }
        Some(owner) if *owner == cmd.player => {
            to.army = to.army.saturating_add(moving);
            Ok(MoveEffect::Reinforced { army: to.army })
        }
        // No combat against held cells: the departed units are gone.
        Some(_) => Err(MoveRejection::EnemyTerritory),
    }
}
