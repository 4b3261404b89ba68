//! Greedy mining policy.
//!
//! Each turn the rules below are tried in order and the first one that
//! applies decides the action:
//!
//! 1. full inventory: head for the nearest market and sell,
//! 2. items on the current tile: pick one up,
//! 3. low charge: sit on, or head for, the nearest recharge tile,
//! 4. otherwise: mine the nearest resource tile.
//!
//! Market and recharge tiles never move, so they are cached once per round in
//! [`Landmarks`]. Resource tiles change as they are mined out, so they are
//! rescanned from the board every turn and never cached.

use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::{
    InventoryItem, Position, Side, TileType, TurnAction,
    board::{BoardView, Economy},
    strategy::{MinerStrategy, RoundSettings, StrategyError},
};

/// Returns the candidate closest to `from` with its distance. Ties go to the
/// earliest candidate.
fn nearest<I>(from: Position, candidates: I) -> Option<(Position, usize)>
where
    I: IntoIterator<Item = Position>,
{
    let mut best: Option<(Position, usize)> = None;
    for candidate in candidates {
        let distance = from.manhattan_distance(&candidate);
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((candidate, distance)),
        }
    }
    best
}

/// Board positions whose tile type is fixed for the whole round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Landmarks {
    markets: Vec<Position>,
    recharges: Vec<Position>,
}

impl Landmarks {
    /// Collects `side`'s market tiles and every recharge tile.
    pub fn scan(board: &BoardView, side: Side) -> Self {
        let market = side.market_tile();
        let mut landmarks = Landmarks::default();
        for (position, tile) in board.tiles.scan() {
            if *tile == market {
                landmarks.markets.push(position);
            } else if *tile == TileType::Recharge {
                landmarks.recharges.push(position);
            }
        }
        landmarks
    }

    pub fn markets(&self) -> &[Position] {
        &self.markets
    }

    pub fn recharges(&self) -> &[Position] {
        &self.recharges
    }

    pub fn clear(&mut self) {
        self.markets.clear();
        self.recharges.clear();
    }

    pub fn nearest_market(&self, from: Position) -> Result<Position, StrategyError> {
        nearest(from, self.markets.iter().copied())
            .map(|(position, _)| position)
            .ok_or(StrategyError::NoMarketTiles)
    }

    pub fn nearest_recharge(&self, from: Position) -> Result<Position, StrategyError> {
        nearest(from, self.recharges.iter().copied())
            .map(|(position, _)| position)
            .ok_or(StrategyError::NoRechargeTiles)
    }
}

/// Resource tiles currently on the board, in scan order.
fn resource_tiles(view: &BoardView) -> Vec<Position> {
    view.tiles
        .scan()
        .filter(|(_, tile)| tile.is_resource())
        .map(|(position, _)| position)
        .collect()
}

/// A strategy that always goes for the closest thing it needs.
#[derive(Debug, Clone, Default)]
pub struct GreedyMiner {
    settings: RoundSettings,
    landmarks: Landmarks,
    inventory_count: usize,
}

impl GreedyMiner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inventory_count(&self) -> usize {
        self.inventory_count
    }

    /// Overrides the tracked item count, e.g. to resume mid-round.
    pub fn set_inventory_count(&mut self, count: usize) {
        self.inventory_count = count;
    }

    pub fn landmarks(&self) -> &Landmarks {
        &self.landmarks
    }

    fn inventory_full(&self) -> bool {
        self.inventory_count >= self.settings.max_inventory_size
    }

    fn go_sell(&mut self, location: Position) -> Result<TurnAction, StrategyError> {
        let market = self.landmarks.nearest_market(location)?;
        if market == location {
            debug!(?location, "on market tile, inventory sold");
            self.inventory_count = 0;
        } else {
            debug!(?location, ?market, "inventory full, heading to market");
        }
        Ok(TurnAction::step_toward(location, market))
    }

    fn standing_on_items(&self, view: &BoardView, location: Position) -> bool {
        !view.items_at(location).is_empty() && !self.inventory_full()
    }

    fn go_mine(view: &BoardView, location: Position) -> TurnAction {
        match nearest(location, resource_tiles(view)) {
            None => {
                debug!(?location, "no resource tiles left");
                TurnAction::Idle
            }
            Some((_, 0)) => TurnAction::Mine,
            Some((resource, distance)) => {
                debug!(?location, ?resource, distance, "heading to resource");
                TurnAction::step_toward(location, resource)
            }
        }
    }
}

impl MinerStrategy for GreedyMiner {
    fn initialize(
        &mut self,
        settings: &RoundSettings,
        starting_board: &BoardView,
        start: Position,
        side: Side,
        _rng: &mut StdRng,
    ) {
        // the item count is left alone; `end_round` owns that reset
        self.settings = *settings;
        self.landmarks = Landmarks::scan(starting_board, side);
        info!(
            ?start,
            ?side,
            markets = self.landmarks.markets.len(),
            recharges = self.landmarks.recharges.len(),
            "round initialized"
        );
    }

    fn get_turn_action(
        &mut self,
        view: &BoardView,
        _economy: &Economy,
        current_charge: u32,
        _is_red_turn: bool,
    ) -> Result<TurnAction, StrategyError> {
        let location = view.your_location;

        if self.inventory_full() {
            return self.go_sell(location);
        }

        if self.standing_on_items(view, location) {
            self.inventory_count += 1;
            debug!(?location, count = self.inventory_count, "picking up item");
            return Ok(TurnAction::PickUpResource);
        }

        let recharge = self.landmarks.nearest_recharge(location)?;
        let max_charge = self.settings.max_charge;
        if recharge == location && current_charge < max_charge {
            debug!(current_charge, max_charge, "charging");
            return Ok(TurnAction::Idle);
        }
        if current_charge <= max_charge / 4 {
            debug!(current_charge, ?recharge, "low charge, heading to recharge");
            return Ok(TurnAction::step_toward(location, recharge));
        }

        Ok(Self::go_mine(view, location))
    }

    fn on_receive_item(&mut self, _item: &InventoryItem) {}

    fn on_sold_inventory(&mut self, _total_sell_price: u32) {}

    fn name(&self) -> &str {
        "Greedy Miner"
    }

    fn end_round(&mut self, points_scored: u32, opponent_points_scored: u32) {
        info!(points_scored, opponent_points_scored, "round over");
        self.inventory_count = 0;
        self.landmarks.clear();
    }
}
