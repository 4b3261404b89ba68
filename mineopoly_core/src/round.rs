//! Single-player practice round.
//!
//! Applies a strategy's actions to a board so it can be watched or tested end
//! to end. This is a simplified stand-in for the real game engine: there is
//! no opponent, mining finishes in one turn and resources do not regenerate.

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    InventoryItem, Position, Side, TileType, TurnAction,
    board::{BoardView, Economy},
    strategy::{MinerStrategy, RoundSettings, StrategyError},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoundError {
    #[error("strategy failed: {0}")]
    Strategy(#[from] StrategyError),
    #[error("board size {board} does not match configured size {configured}")]
    BoardSizeMismatch { board: usize, configured: usize },
    #[error("round is already over")]
    Finished,
}

/// Knobs of the practice harness that are not part of the game contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessSettings {
    /// Round ends after this many turns even if nobody has won.
    pub turn_limit: u32,
    /// Charge restored for each turn ended on a recharge tile.
    pub recharge_rate: u32,
    pub seed: u64,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        HarnessSettings {
            turn_limit: 500,
            recharge_rate: 10,
            seed: 0,
        }
    }
}

/// Why a round stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Won { turns: u32 },
    TurnLimit,
    /// The strategy reported a configuration error.
    Aborted,
}

/// What happened when an action was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    Moved(Position),
    Blocked(String),
    Mined(InventoryItem),
    PickedUp(InventoryItem),
    Waited,
}

/// State of the robot controlled by the strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotState {
    pub position: Position,
    pub charge: u32,
    pub inventory: Vec<InventoryItem>,
    pub score: u32,
}

/// Drives one strategy through one round on one board.
pub struct Round {
    pub board: BoardView,
    pub robot: RobotState,
    pub economy: Economy,
    pub turn: u32,
    settings: RoundSettings,
    harness: HarnessSettings,
    side: Side,
    strategy: Box<dyn MinerStrategy>,
    outcome: Option<RoundOutcome>,
}

impl Round {
    /// Sets up the round and calls the strategy's `initialize`.
    pub fn new(
        board: BoardView,
        settings: RoundSettings,
        harness: HarnessSettings,
        mut strategy: Box<dyn MinerStrategy>,
    ) -> Result<Self, RoundError> {
        if board.size() != settings.board_size {
            return Err(RoundError::BoardSizeMismatch {
                board: board.size(),
                configured: settings.board_size,
            });
        }
        let side = Side::Red;
        let start = board.your_location;
        let mut rng = StdRng::seed_from_u64(harness.seed);
        strategy.initialize(&settings, &board, start, side, &mut rng);
        info!(strategy = strategy.name(), ?start, "starting round");

        Ok(Round {
            robot: RobotState {
                position: start,
                charge: settings.max_charge,
                inventory: Vec::new(),
                score: 0,
            },
            board,
            economy: Economy::default(),
            turn: 0,
            settings,
            harness,
            side,
            strategy,
            outcome: None,
        })
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Asks the strategy for an action and applies it.
    pub fn process_turn(&mut self) -> Result<TurnEvent, RoundError> {
        if self.is_over() {
            return Err(RoundError::Finished);
        }

        self.board.your_location = self.robot.position;
        let decision = self.strategy.get_turn_action(
            &self.board,
            &self.economy,
            self.robot.charge,
            self.turn % 2 == 0,
        );
        let action = match decision {
            Ok(action) => action,
            Err(err) => {
                warn!(%err, turn = self.turn, "strategy failed, aborting round");
                self.finish(RoundOutcome::Aborted);
                return Err(err.into());
            }
        };
        let event = self.process_action(action);
        self.turn += 1;
        debug!(turn = self.turn, ?action, ?event, charge = self.robot.charge, "turn");

        self.settle_tile();

        if self.robot.score >= self.settings.winning_score {
            self.finish(RoundOutcome::Won { turns: self.turn });
        } else if self.turn >= self.harness.turn_limit {
            self.finish(RoundOutcome::TurnLimit);
        }
        Ok(event)
    }

    /// Plays turns until the round ends.
    pub fn run(&mut self) -> Result<RoundOutcome, RoundError> {
        loop {
            if let Some(outcome) = self.outcome {
                return Ok(outcome);
            }
            self.process_turn()?;
        }
    }

    fn finish(&mut self, outcome: RoundOutcome) {
        info!(?outcome, score = self.robot.score, "round finished");
        self.outcome = Some(outcome);
        self.strategy.end_round(self.robot.score, 0);
    }

    /// Applies a single action to the robot and board.
    pub fn process_action(&mut self, action: TurnAction) -> TurnEvent {
        match action {
            TurnAction::Idle => TurnEvent::Waited,
            TurnAction::Mine => {
                let position = self.robot.position;
                match self.board.tile_at(position).resource() {
                    Some(item_type) => {
                        let item = InventoryItem::new(item_type);
                        self.board.tiles[position] = TileType::Empty;
                        self.board
                            .items_on_ground
                            .entry(position)
                            .or_default()
                            .push(item);
                        TurnEvent::Mined(item)
                    }
                    None => TurnEvent::Blocked("nothing to mine here".to_string()),
                }
            }
            TurnAction::PickUpResource => {
                if self.robot.inventory.len() >= self.settings.max_inventory_size {
                    return TurnEvent::Blocked("inventory is full".to_string());
                }
                let picked = self
                    .board
                    .items_on_ground
                    .get_mut(&self.robot.position)
                    .and_then(Vec::pop);
                match picked {
                    Some(item) => {
                        self.robot.inventory.push(item);
                        self.strategy.on_receive_item(&item);
                        TurnEvent::PickedUp(item)
                    }
                    None => TurnEvent::Blocked("no item on the ground".to_string()),
                }
            }
            TurnAction::MoveUp
            | TurnAction::MoveDown
            | TurnAction::MoveLeft
            | TurnAction::MoveRight => self.move_robot(action),
        }
    }

    fn move_robot(&mut self, action: TurnAction) -> TurnEvent {
        let Some((dx, dy)) = action.offset() else {
            return TurnEvent::Waited;
        };
        if self.robot.charge == 0 {
            warn!("robot is out of charge");
            return TurnEvent::Blocked("out of charge".to_string());
        }
        let current = self.robot.position;
        let target = match (
            current.x.checked_add_signed(dx),
            current.y.checked_add_signed(dy),
        ) {
            (Some(x), Some(y)) if self.board.tiles.contains(Position { x, y }) => {
                Position { x, y }
            }
            _ => return TurnEvent::Blocked("target position is out of bounds".to_string()),
        };
        self.robot.charge -= 1;
        self.robot.position = target;
        TurnEvent::Moved(target)
    }

    /// End-of-turn tile effects: recharging and selling.
    fn settle_tile(&mut self) {
        let tile = self.board.tile_at(self.robot.position);
        if tile == TileType::Recharge {
            self.robot.charge =
                (self.robot.charge + self.harness.recharge_rate).min(self.settings.max_charge);
        } else if tile == self.side.market_tile() && !self.robot.inventory.is_empty() {
            let total = self.economy.value_of(&self.robot.inventory);
            self.robot.inventory.clear();
            self.robot.score += total;
            info!(total, score = self.robot.score, "sold inventory");
            self.strategy.on_sold_inventory(total);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::{GreedyMiner, ItemType};

    fn settings(board_size: usize, max_inventory_size: usize) -> RoundSettings {
        RoundSettings {
            board_size,
            max_inventory_size,
            max_charge: 20,
            winning_score: 1_000,
        }
    }

    fn round(map: &str, settings: RoundSettings) -> Round {
        let board = BoardView::from_map_str(map).unwrap();
        Round::new(
            board,
            settings,
            HarnessSettings::default(),
            Box::new(GreedyMiner::new()),
        )
        .unwrap()
    }

    #[test]
    fn rejects_board_of_wrong_size() {
        let board = BoardView::from_map_str("ST ..\n.. ..").unwrap();
        let result = Round::new(
            board,
            settings(3, 5),
            HarnessSettings::default(),
            Box::new(GreedyMiner::new()),
        );
        assert!(matches!(
            result,
            Err(RoundError::BoardSizeMismatch {
                board: 2,
                configured: 3
            })
        ));
    }

    #[test]
    fn moves_spend_charge_and_stay_on_board() {
        let mut round = round("RC ..\nST MR", settings(2, 5));
        assert_eq!(
            round.process_action(TurnAction::MoveLeft),
            TurnEvent::Blocked("target position is out of bounds".to_string())
        );
        assert_eq!(round.robot.charge, 20);
        assert_eq!(
            round.process_action(TurnAction::MoveRight),
            TurnEvent::Moved(Position::new(1, 0))
        );
        assert_eq!(round.robot.charge, 19);

        round.robot.charge = 0;
        assert_eq!(
            round.process_action(TurnAction::MoveUp),
            TurnEvent::Blocked("out of charge".to_string())
        );
        assert_eq!(round.robot.position, Position::new(1, 0));
    }

    #[test]
    fn mining_drops_item_and_pickup_collects_it() {
        let mut round = round("RC MR\nST ..", settings(2, 5));
        round.board.tiles[Position::new(0, 0)] = TileType::ResourceRuby;

        let ruby = InventoryItem::new(ItemType::Ruby);
        assert_eq!(round.process_action(TurnAction::Mine), TurnEvent::Mined(ruby));
        assert_eq!(round.board.tile_at(Position::new(0, 0)), TileType::Empty);
        assert_eq!(round.board.items_at(Position::new(0, 0)), &[ruby]);

        assert_eq!(
            round.process_action(TurnAction::PickUpResource),
            TurnEvent::PickedUp(ruby)
        );
        assert_eq!(round.robot.inventory, vec![ruby]);
        assert!(round.board.items_at(Position::new(0, 0)).is_empty());
    }

    #[test]
    fn plays_a_full_loop_and_sells() {
        // mine the emerald, pick it up, walk to the market, sell
        let mut round = round(
            "RC .. ..
             .. .. ..
             ST .. MR",
            settings(3, 1),
        );
        round.board.tiles[Position::new(0, 0)] = TileType::ResourceEmerald;

        let events: Vec<TurnEvent> = (0..4).map(|_| round.process_turn().unwrap()).collect();
        assert_eq!(
            events,
            vec![
                TurnEvent::Mined(InventoryItem::new(ItemType::Emerald)),
                TurnEvent::PickedUp(InventoryItem::new(ItemType::Emerald)),
                TurnEvent::Moved(Position::new(1, 0)),
                TurnEvent::Moved(Position::new(2, 0)),
            ]
        );
        assert!(round.robot.inventory.is_empty());
        assert_eq!(round.robot.score, Economy::default().emerald);
    }

    #[test]
    fn recharges_while_idling_on_recharge_tile() {
        let mut round = round("RC ..\nST MR", settings(2, 5));
        round.robot.position = Position::new(0, 1);
        round.robot.charge = 3;
        round.process_turn().unwrap();
        assert_eq!(round.robot.charge, 13);
        round.process_turn().unwrap();
        assert_eq!(round.robot.charge, 20);
    }

    #[test]
    fn stops_at_turn_limit() {
        let board = BoardView::from_map_str("RC ..\nST MR").unwrap();
        let harness = HarnessSettings {
            turn_limit: 3,
            ..HarnessSettings::default()
        };
        let mut round =
            Round::new(board, settings(2, 5), harness, Box::new(GreedyMiner::new())).unwrap();
        assert_eq!(round.run(), Ok(RoundOutcome::TurnLimit));
        assert_eq!(round.turn, 3);
        assert_eq!(round.process_turn(), Err(RoundError::Finished));
    }

    /// Wraps a miner and records whether `end_round` ran.
    struct TeardownWatcher {
        inner: GreedyMiner,
        ended: Rc<Cell<bool>>,
    }

    impl MinerStrategy for TeardownWatcher {
        fn initialize(
            &mut self,
            settings: &RoundSettings,
            starting_board: &BoardView,
            start: Position,
            side: Side,
            rng: &mut StdRng,
        ) {
            self.inner.initialize(settings, starting_board, start, side, rng);
        }

        fn get_turn_action(
            &mut self,
            view: &BoardView,
            economy: &Economy,
            current_charge: u32,
            is_red_turn: bool,
        ) -> Result<TurnAction, StrategyError> {
            self.inner
                .get_turn_action(view, economy, current_charge, is_red_turn)
        }

        fn on_receive_item(&mut self, item: &InventoryItem) {
            self.inner.on_receive_item(item);
        }

        fn on_sold_inventory(&mut self, total_sell_price: u32) {
            self.inner.on_sold_inventory(total_sell_price);
        }

        fn name(&self) -> &str {
            self.inner.name()
        }

        fn end_round(&mut self, points_scored: u32, opponent_points_scored: u32) {
            self.ended.set(true);
            self.inner.end_round(points_scored, opponent_points_scored);
        }
    }

    #[test]
    fn strategy_errors_abort_the_round() {
        let ended = Rc::new(Cell::new(false));
        let board = BoardView::from_map_str(".. ..\nST ..").unwrap();
        let watcher = TeardownWatcher {
            inner: GreedyMiner::new(),
            ended: Rc::clone(&ended),
        };
        let mut round = Round::new(
            board,
            settings(2, 5),
            HarnessSettings::default(),
            Box::new(watcher),
        )
        .unwrap();

        assert_eq!(
            round.process_turn(),
            Err(RoundError::Strategy(StrategyError::NoRechargeTiles))
        );
        assert!(ended.get());
        assert_eq!(round.outcome(), Some(RoundOutcome::Aborted));
        assert_eq!(round.process_turn(), Err(RoundError::Finished));
    }
}
