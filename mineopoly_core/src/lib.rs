use serde::{Deserialize, Serialize};

pub mod action;
pub mod board;
pub mod greedy;
pub mod map;
pub mod round;
pub mod strategy;

pub use action::TurnAction;
pub use board::{BoardError, BoardView, Economy};
pub use greedy::{GreedyMiner, Landmarks};
pub use round::{HarnessSettings, RobotState, Round, RoundError, RoundOutcome, TurnEvent};
pub use strategy::{MinerStrategy, RoundSettings, StrategyError};

/// Represents a 2D board coordinate. `(0, 0)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Sum of the absolute coordinate differences.
    #[inline]
    pub fn manhattan_distance(&self, other: &Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// The player a strategy is controlling. Red is the primary side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Red,
    Blue,
}

impl Side {
    /// The market tile type this side is allowed to sell on.
    pub fn market_tile(self) -> TileType {
        match self {
            Side::Red => TileType::RedMarket,
            Side::Blue => TileType::BlueMarket,
        }
    }
}

/// Static type of a board tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Empty,
    ResourceDiamond,
    ResourceEmerald,
    ResourceRuby,
    RedMarket,
    BlueMarket,
    Recharge,
}

impl TileType {
    /// The item produced by mining this tile, if it is a resource tile.
    pub fn resource(self) -> Option<ItemType> {
        match self {
            TileType::ResourceDiamond => Some(ItemType::Diamond),
            TileType::ResourceEmerald => Some(ItemType::Emerald),
            TileType::ResourceRuby => Some(ItemType::Ruby),
            _ => None,
        }
    }

    pub fn is_resource(self) -> bool {
        self.resource().is_some()
    }
}

/// Kinds of items a robot can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Diamond,
    Emerald,
    Ruby,
}

/// An item lying on the ground or held in a robot's inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_type: ItemType,
}

impl InventoryItem {
    pub fn new(item_type: ItemType) -> Self {
        InventoryItem { item_type }
    }
}
