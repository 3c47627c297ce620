//! Terrain kinds and the per-cell simulation record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::PlayerId;

/// Static terrain type of a cell. Fixed when the map is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    /// Passable land that can be claimed and used as a spawn point.
    Open,
    /// Impassable; never owned, never holds an army.
    Obstacle,
    /// Fortified cell with a standing garrison. Grows like a home once owned.
    Stronghold,
}

impl Terrain {
    /// Map-file code for this terrain.
    pub fn code(self) -> char {
        match self {
            Self::Open => '0',
            Self::Obstacle => '1',
            Self::Stronghold => '2',
        }
    }

    /// Decode a map-file character.
    ///
    /// Both `'2'` and `'3'` decode to [`Terrain::Stronghold`]; older map
    /// files used `'3'` for strongholds.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            '0' => Some(Self::Open),
            '1' => Some(Self::Obstacle),
            '2' | '3' => Some(Self::Stronghold),
            _ => None,
        }
    }

    /// Whether armies may enter a cell of this type.
    pub fn is_passable(self) -> bool {
        !matches!(self, Self::Obstacle)
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Obstacle => write!(f, "obstacle"),
            Self::Stronghold => write!(f, "stronghold"),
        }
    }
}

/// Mutable state of one grid cell.
///
/// Invariants maintained by the engine:
/// - an unowned cell is never a home;
/// - obstacles are never owned and their army never changes;
/// - `moved_this_tick` is cleared for every cell at the start of a tick.
///
/// `army` is unsigned, so it can never go negative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Terrain type, immutable after load.
    pub terrain: Terrain,
    /// Owning player, `None` when unclaimed.
    pub owner: Option<PlayerId>,
    /// Army strength stationed on the cell.
    pub army: u32,
    /// True only for the owner's original spawn cell.
    pub is_home: bool,
    /// True once a move originated here during the current tick.
    pub moved_this_tick: bool,
}

impl Cell {
    /// A fresh unowned cell of `terrain` holding `army` units.
    pub fn new(terrain: Terrain, army: u32) -> Self {
        Self {
            terrain,
            owner: None,
            army,
            is_home: false,
            moved_this_tick: false,
        }
    }

    /// Whether `player` owns this cell.
    pub fn is_owned_by(&self, player: &PlayerId) -> bool {
        self.owner.as_ref() == Some(player)
    }

    /// Whether the cell grows by one every tick (owned home or owned stronghold).
    pub fn is_growth_cell(&self) -> bool {
        self.owner.is_some() && (self.is_home || self.terrain == Terrain::Stronghold)
    }
}
