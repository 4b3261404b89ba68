use serde::{Deserialize, Serialize};

use crate::Position;

/// The single action a strategy submits for a turn.
///
/// `Idle` is a regular choice (e.g. staying put on a recharge tile), not an
/// error or a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Mine,
    PickUpResource,
    Idle,
}

impl TurnAction {
    /// Single axis-aligned step from `current` toward `target`.
    ///
    /// The x axis is closed first; y is only considered once the columns
    /// match. Once x is aligned any remaining case, including standing on the
    /// target, reports `MoveUp`.
    pub fn step_toward(current: Position, target: Position) -> TurnAction {
        if current.x > target.x {
            TurnAction::MoveLeft
        } else if current.x < target.x {
            TurnAction::MoveRight
        } else if current.y > target.y {
            TurnAction::MoveDown
        } else {
            TurnAction::MoveUp
        }
    }

    /// Coordinate offset for movement actions.
    pub fn offset(self) -> Option<(isize, isize)> {
        match self {
            TurnAction::MoveUp => Some((0, 1)),
            TurnAction::MoveDown => Some((0, -1)),
            TurnAction::MoveLeft => Some((-1, 0)),
            TurnAction::MoveRight => Some((1, 0)),
            TurnAction::Mine | TurnAction::PickUpResource | TurnAction::Idle => None,
        }
    }

    pub fn is_move(self) -> bool {
        self.offset().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_axis_is_closed_before_y() {
        let origin = Position::new(0, 0);
        assert_eq!(
            TurnAction::step_toward(origin, Position::new(1, 1)),
            TurnAction::MoveRight
        );
        assert_eq!(
            TurnAction::step_toward(Position::new(2, 0), Position::new(1, 2)),
            TurnAction::MoveLeft
        );
        assert_eq!(
            TurnAction::step_toward(Position::new(1, 2), Position::new(1, 0)),
            TurnAction::MoveDown
        );
        assert_eq!(
            TurnAction::step_toward(Position::new(1, 0), Position::new(1, 2)),
            TurnAction::MoveUp
        );
    }

    #[test]
    fn only_moves_have_offsets() {
        assert_eq!(TurnAction::MoveLeft.offset(), Some((-1, 0)));
        assert!(TurnAction::MoveDown.is_move());
        assert!(!TurnAction::Mine.is_move());
        assert!(!TurnAction::Idle.is_move());
    }
}
