use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::Position;

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Position ({x}, {y}) is out of bounds for a board of size {size}")]
    OutOfBounds { x: usize, y: usize, size: usize },
}

/// A square 2D grid addressed by [`Position`].
///
/// Cells are stored row by row starting from the bottom row (`y = 0`), so
/// the in-memory layout matches the board's coordinate system rather than
/// the order rows are written down in a map file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a `size` x `size` grid filled with default values.
    ///
    /// # Panics
    ///
    /// Panics if `size * size` overflows `usize`.
    pub fn new(size: usize) -> Self
    where
        T: Default + Clone,
    {
        let len = size.checked_mul(size).expect("Grid size overflow");
        Grid {
            size,
            cells: vec![T::default(); len],
        }
    }

    /// Creates a grid whose cells are produced by `f(position)`.
    ///
    /// # Panics
    ///
    /// Panics if `size * size` overflows `usize`.
    pub fn from_generator<F>(size: usize, mut f: F) -> Self
    where
        F: FnMut(Position) -> T,
    {
        let len = size.checked_mul(size).expect("Grid size overflow");
        let mut cells = Vec::with_capacity(len);
        for y in 0..size {
            for x in 0..size {
                cells.push(f(Position { x, y }));
            }
        }
        Grid { size, cells }
    }

    /// Length of one side of the board.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index_of(&self, position: Position) -> Option<usize> {
        if self.contains(position) {
            Some(position.y * self.size + position.x)
        } else {
            None
        }
    }

    /// Checks if the position lies on the board.
    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        position.x < self.size && position.y < self.size
    }

    /// Returns `None` if the position is off the board.
    pub fn get(&self, position: Position) -> Option<&T> {
        self.index_of(position).and_then(|i| self.cells.get(i))
    }

    pub fn get_mut(&mut self, position: Position) -> Option<&mut T> {
        self.index_of(position).and_then(|i| self.cells.get_mut(i))
    }

    /// Overwrites the cell at `position`.
    pub fn set(&mut self, position: Position, value: T) -> Result<(), GridError> {
        let index = self.index_of(position).ok_or(GridError::OutOfBounds {
            x: position.x,
            y: position.y,
            size: self.size,
        })?;
        self.cells[index] = value;
        Ok(())
    }

    /// Visits every cell column by column: `x` is the outer loop, `y` the
    /// inner one. Scans that break ties by encounter order rely on this.
    pub fn scan(&self) -> impl Iterator<Item = (Position, &T)> {
        let size = self.size;
        (0..size).flat_map(move |x| {
            (0..size).map(move |y| {
                let position = Position { x, y };
                (position, &self.cells[y * size + x])
            })
        })
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, position: Position) -> &Self::Output {
        match self.index_of(position) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for board size {}",
                position.x, position.y, self.size
            ),
        }
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, position: Position) -> &mut Self::Output {
        let size = self.size;
        match self.index_of(position) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for board size {}",
                position.x, position.y, size
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_walks_columns_bottom_to_top() {
        let grid = Grid::from_generator(2, |p| (p.x, p.y));
        let order: Vec<_> = grid.scan().map(|(p, _)| (p.x, p.y)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        for (position, value) in grid.scan() {
            assert_eq!(*value, (position.x, position.y));
        }
    }

    #[test]
    fn set_rejects_positions_off_the_board() {
        let mut grid: Grid<u8> = Grid::new(3);
        assert!(grid.set(Position::new(2, 2), 7).is_ok());
        assert_eq!(grid[Position::new(2, 2)], 7);
        assert_eq!(
            grid.set(Position::new(3, 0), 1),
            Err(GridError::OutOfBounds { x: 3, y: 0, size: 3 })
        );
        assert!(grid.get(Position::new(0, 3)).is_none());
    }
}
