use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{InventoryItem, ItemType, Position, TileType, map::Grid};

/// Errors produced while building a board from a textual map or tile rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("map is empty")]
    Empty,
    #[error("map is not square: row {row} has {found} tiles, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown map code '{code}' at ({x}, {y})")]
    UnknownCode { code: String, x: usize, y: usize },
    #[error("multiple start positions ('ST') found")]
    MultipleStarts,
    #[error("no start position ('ST') found in map")]
    MissingStart,
}

/// Current sell price for each kind of item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    pub diamond: u32,
    pub emerald: u32,
    pub ruby: u32,
}

impl Default for Economy {
    fn default() -> Self {
        Economy {
            diamond: 40,
            emerald: 25,
            ruby: 15,
        }
    }
}

impl Economy {
    pub fn price(&self, item_type: ItemType) -> u32 {
        match item_type {
            ItemType::Diamond => self.diamond,
            ItemType::Emerald => self.emerald,
            ItemType::Ruby => self.ruby,
        }
    }

    /// Combined sell price of a whole inventory.
    pub fn value_of(&self, items: &[InventoryItem]) -> u32 {
        items.iter().map(|item| self.price(item.item_type)).sum()
    }
}

/// The part of the game state a strategy is allowed to see on a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub tiles: Grid<TileType>,
    /// Items lying on the ground. Cells without items may be absent or map to
    /// an empty list.
    pub items_on_ground: HashMap<Position, Vec<InventoryItem>>,
    pub your_location: Position,
    pub other_location: Option<Position>,
    pub other_score: u32,
}

impl BoardView {
    pub fn new(tiles: Grid<TileType>, your_location: Position) -> Self {
        BoardView {
            tiles,
            items_on_ground: HashMap::new(),
            your_location,
            other_location: None,
            other_score: 0,
        }
    }

    /// Builds a view from rows of tiles written top row first, the way a
    /// board is drawn on screen. `rows[0]` ends up at `y = size - 1`.
    pub fn from_rows<R>(rows: &[R], your_location: Position) -> Result<Self, BoardError>
    where
        R: AsRef<[TileType]>,
    {
        let size = rows.len();
        if size == 0 {
            return Err(BoardError::Empty);
        }
        for (row, tiles) in rows.iter().enumerate() {
            let found = tiles.as_ref().len();
            if found != size {
                return Err(BoardError::NotSquare {
                    row,
                    expected: size,
                    found,
                });
            }
        }
        let tiles = Grid::from_generator(size, |p| rows[size - 1 - p.y].as_ref()[p.x]);
        Ok(BoardView::new(tiles, your_location))
    }

    /// Parses a whitespace separated map, top row first.
    ///
    /// Codes: `..` empty, `RD`/`RE`/`RR` diamond, emerald and ruby resources,
    /// `MR`/`MB` red and blue markets, `RC` recharge, `ST` the (empty) start
    /// tile. Exactly one `ST` is required.
    pub fn from_map_str(map_string: &str) -> Result<Self, BoardError> {
        let lines: Vec<&str> = map_string
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(BoardError::Empty);
        }

        let size = lines.len();
        let mut rows: Vec<Vec<TileType>> = Vec::with_capacity(size);
        let mut start: Option<Position> = None;

        for (row, line) in lines.iter().enumerate() {
            let y = size - 1 - row;
            let codes: Vec<&str> = line.split_whitespace().collect();
            if codes.len() != size {
                return Err(BoardError::NotSquare {
                    row,
                    expected: size,
                    found: codes.len(),
                });
            }

            let mut tiles = Vec::with_capacity(size);
            for (x, code) in codes.iter().enumerate() {
                let tile = match *code {
                    ".." => TileType::Empty,
                    "ST" => {
                        if start.is_some() {
                            return Err(BoardError::MultipleStarts);
                        }
                        start = Some(Position { x, y });
                        TileType::Empty
                    }
                    "RD" => TileType::ResourceDiamond,
                    "RE" => TileType::ResourceEmerald,
                    "RR" => TileType::ResourceRuby,
                    "MR" => TileType::RedMarket,
                    "MB" => TileType::BlueMarket,
                    "RC" => TileType::Recharge,
                    unknown => {
                        return Err(BoardError::UnknownCode {
                            code: unknown.to_string(),
                            x,
                            y,
                        });
                    }
                };
                tiles.push(tile);
            }
            rows.push(tiles);
        }

        let start = start.ok_or(BoardError::MissingStart)?;
        BoardView::from_rows(&rows, start)
    }

    pub fn size(&self) -> usize {
        self.tiles.size()
    }

    /// Tile type at `position`; positions off the board read as `Empty`.
    pub fn tile_at(&self, position: Position) -> TileType {
        self.tiles.get(position).copied().unwrap_or_default()
    }

    /// Items lying at `position`, empty if there are none.
    pub fn items_at(&self, position: Position) -> &[InventoryItem] {
        self.items_on_ground
            .get(&position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
