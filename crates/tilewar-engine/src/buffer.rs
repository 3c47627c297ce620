//! Pending-move buffer with last-write-wins per origin cell.
//!
//! [`CommandBuffer`] holds moves whose origin already moved during the
//! current tick. At most one command is kept per origin; a newer command
//! for the same origin replaces the older one regardless of which player
//! sent it. Commands drain in row-major origin order so that tick
//! resolution is deterministic.

use std::collections::BTreeMap;

use tilewar_core::{CellCoord, MoveCommand};

/// Pending moves keyed by origin cell.
#[derive(Clone, Debug, Default)]
pub struct CommandBuffer {
    pending: BTreeMap<CellCoord, MoveCommand>,
}

impl CommandBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `cmd` for its origin. Returns true if it replaced an
    /// earlier command for the same origin.
    pub fn insert(&mut self, cmd: MoveCommand) -> bool {
        self.pending.insert(cmd.origin, cmd).is_some()
    }

    /// The pending command for `origin`, if any.
    pub fn get(&self, origin: CellCoord) -> Option<&MoveCommand> {
        self.pending.get(&origin)
    }

    /// Remove and return every pending command in row-major origin order.
    pub fn drain(&mut self) -> Vec<MoveCommand> {
        std::mem::take(&mut self.pending).into_values().collect()
    }

    /// Number of pending commands.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilewar_core::Direction;

    fn cmd(player: &str, row: usize, col: usize, d: Direction) -> MoveCommand {
        MoveCommand::new(player, CellCoord::new(row, col), d)
    }

    #[test]
    fn new_buffer_is_empty() {
        let buf = CommandBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn later_command_replaces_earlier() {
        let mut buf = CommandBuffer::new();
        assert!(!buf.insert(cmd("a", 1, 1, Direction::Up)));
        assert!(buf.insert(cmd("a", 1, 1, Direction::Down)));
        assert_eq!(buf.len(), 1);
        assert_eq!(
            buf.get(CellCoord::new(1, 1)).map(|c| c.direction),
            Some(Direction::Down)
        );
    }

    #[test]
    fn replacement_ignores_player() {
        let mut buf = CommandBuffer::new();
        buf.insert(cmd("a", 0, 0, Direction::Up));
        assert!(buf.insert(cmd("b", 0, 0, Direction::Left)));
        assert_eq!(buf.drain()[0].player.as_str(), "b");
    }

    #[test]
    fn drain_is_row_major_and_clears() {
        let mut buf = CommandBuffer::new();
        buf.insert(cmd("a", 2, 0, Direction::Up));
        buf.insert(cmd("a", 0, 3, Direction::Up));
        buf.insert(cmd("a", 0, 1, Direction::Up));
        let origins: Vec<_> = buf.drain().into_iter().map(|c| c.origin).collect();
        assert_eq!(
            origins,
            vec![
                CellCoord::new(0, 1),
                CellCoord::new(0, 3),
                CellCoord::new(2, 0)
            ]
        );
        assert!(buf.is_empty());
    }
}
