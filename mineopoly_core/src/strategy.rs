use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::{InventoryItem, Position, Side, TurnAction, board::BoardView, board::Economy};

/// Fatal configuration problems a strategy can hit while deciding a turn.
///
/// These mean the board violates the game's contract (a required landmark
/// type is missing); callers should abort the round rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    #[error("board has no market tiles for this player")]
    NoMarketTiles,
    #[error("board has no recharge tiles")]
    NoRechargeTiles,
}

/// Fixed parameters of a round, handed to every strategy at `initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSettings {
    /// Length and width of the square board.
    pub board_size: usize,
    /// Maximum number of items a robot can carry at once.
    pub max_inventory_size: usize,
    /// Charge a robot starts with; one charge is spent per tile moved.
    pub max_charge: u32,
    /// First player to reach this score wins the round.
    pub winning_score: u32,
}

impl Default for RoundSettings {
    fn default() -> Self {
        RoundSettings {
            board_size: 3,
            max_inventory_size: 5,
            max_charge: 80,
            winning_score: 200,
        }
    }
}

/// Trait defining the behavior of a mining robot's controller.
///
/// Object safe so a round can drive a `Box<dyn MinerStrategy>`.
pub trait MinerStrategy {
    /// Called at the start of every round. `starting_board` can be used to
    /// pre-compute fixed information such as market and recharge locations.
    fn initialize(
        &mut self,
        settings: &RoundSettings,
        starting_board: &BoardView,
        start: Position,
        side: Side,
        rng: &mut StdRng,
    );

    /// Decides the action for this turn.
    ///
    /// `is_red_turn` settles collisions: when both robots move onto the same
    /// tile the side holding the turn gets it.
    fn get_turn_action(
        &mut self,
        view: &BoardView,
        economy: &Economy,
        current_charge: u32,
        is_red_turn: bool,
    ) -> Result<TurnAction, StrategyError>;

    /// The item picked up by last turn's action.
    fn on_receive_item(&mut self, item: &InventoryItem);

    /// Total price received for the whole inventory after a sale.
    fn on_sold_inventory(&mut self, total_sell_price: u32);

    /// Display name for scoreboards.
    fn name(&self) -> &str;

    /// Called at the end of every round so the strategy can reset.
    fn end_round(&mut self, points_scored: u32, opponent_points_scored: u32);
}
