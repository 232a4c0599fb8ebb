//! The 9x9 board
//!
//! Cells are indexed `[x][y]`. Rows, columns and the nine 3x3 sectors are the
//! groups that clear once fully covered.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::shape::Shape;
use crate::consts::*;
use crate::on_board;

/// A single board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub x: u8,
    pub y: u8,
    /// A block occupies this cell
    pub placed: bool,
    /// Part of a full group, will clear on commit
    pub highlighted: bool,
    /// Preview of the shape being dragged
    pub marked: bool,
    /// Clear animation; starts at or below zero, done at 100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_progress: Option<i32>,
    /// Logically empty but still fading out
    pub removed: bool,
}

impl Cell {
    pub fn new(x: u8, y: u8) -> Self {
        Self {
            x,
            y,
            placed: false,
            highlighted: false,
            marked: false,
            animation_progress: None,
            removed: false,
        }
    }

    /// Placed or previewed
    #[inline]
    pub fn is_covered(&self) -> bool {
        self.placed || self.marked
    }

    /// Whether this cell stops a drop. With `include_marked`, cells about to
    /// clear are free and previewed cells that will stay block.
    #[inline]
    pub fn blocks(&self, include_marked: bool) -> bool {
        if include_marked {
            !self.highlighted && (self.placed || self.marked)
        } else {
            self.placed
        }
    }

    /// Back to an empty, idle cell
    pub fn reset(&mut self) {
        *self = Cell::new(self.x, self.y);
    }

    fn clear_markings(&mut self) {
        self.highlighted = false;
        self.marked = false;
    }
}

/// The playing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Empty board
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|x| std::array::from_fn(|y| Cell::new(x as u8, y as u8))),
        }
    }

    pub fn cell(&self, pos: IVec2) -> Option<&Cell> {
        on_board(pos).then(|| &self.cells[pos.x as usize][pos.y as usize])
    }

    pub fn cell_mut(&mut self, pos: IVec2) -> Option<&mut Cell> {
        if on_board(pos) {
            Some(&mut self.cells[pos.x as usize][pos.y as usize])
        } else {
            None
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut().flatten()
    }

    /// Number of cells holding a block
    pub fn placed_count(&self) -> usize {
        self.cells().filter(|c| c.placed).count()
    }

    /// No placed blocks (fading cells count as empty)
    pub fn is_empty(&self) -> bool {
        self.cells().all(|c| !c.placed)
    }

    /// Any clear animation still running
    pub fn is_animating(&self) -> bool {
        self.cells().any(|c| c.removed)
    }

    /// Clear preview and highlight flags everywhere
    pub fn reset_markings(&mut self) {
        self.cells_mut().for_each(Cell::clear_markings);
    }

    /// Whether `shape` fits with its origin at `pos`
    pub fn can_drop(&self, shape: &Shape, pos: IVec2, include_marked: bool) -> bool {
        shape
            .cells_at(pos)
            .all(|p| self.cell(p).is_some_and(|cell| !cell.blocks(include_marked)))
    }

    /// Whether `shape` fits anywhere on the board
    pub fn fits_anywhere(&self, shape: &Shape, include_marked: bool) -> bool {
        let size = BOARD_SIZE as i32;
        (0..=size - shape.width()).any(|x| {
            (0..=size - shape.height()).any(|y| self.can_drop(shape, IVec2::new(x, y), include_marked))
        })
    }

    /// Flag the cells `shape` would cover as previewed
    pub fn mark(&mut self, shape: &Shape, pos: IVec2) {
        for p in shape.cells_at(pos) {
            if let Some(cell) = self.cell_mut(p) {
                cell.marked = true;
            }
        }
    }

    /// Put `shape` down; returns the number of cells it covered. A cell that
    /// is still fading out drops its fade, so placed and removed never overlap.
    pub fn place(&mut self, shape: &Shape, pos: IVec2) -> usize {
        let mut placed = 0;
        for p in shape.cells_at(pos) {
            if let Some(cell) = self.cell_mut(p) {
                cell.placed = true;
                cell.removed = false;
                cell.animation_progress = None;
                placed += 1;
            }
        }
        placed
    }

    /// All 27 clearable groups: 9 rows, 9 columns, 9 sectors
    fn groups() -> impl Iterator<Item = [(usize, usize); BOARD_SIZE]> {
        let rows = (0..BOARD_SIZE).map(|y| std::array::from_fn(|x| (x, y)));
        let columns = (0..BOARD_SIZE).map(|x| std::array::from_fn(|y| (x, y)));
        let per_side = BOARD_SIZE / SECTOR_SIZE;
        let sectors = (0..per_side * per_side).map(move |s| {
            let (sx, sy) = ((s % per_side) * SECTOR_SIZE, (s / per_side) * SECTOR_SIZE);
            std::array::from_fn(|i| (sx + i % SECTOR_SIZE, sy + i / SECTOR_SIZE))
        });
        rows.chain(columns).chain(sectors)
    }

    /// Highlight every fully covered group; returns how many groups qualified
    pub fn check_elimination_marking(&mut self) -> u32 {
        let mut eliminations = 0;
        for group in Self::groups() {
            if group.iter().all(|&(x, y)| self.cells[x][y].is_covered()) {
                eliminations += 1;
                for (x, y) in group {
                    self.cells[x][y].highlighted = true;
                }
            }
        }
        eliminations
    }

    /// Clear every highlighted cell and start its fade. The anchor is the
    /// cleared cell with the smallest `x + y`, topmost on ties; cells further
    /// from it start later, so the clear sweeps outward.
    /// Returns the number of cells cleared.
    pub fn eliminate_highlighted(&mut self) -> u32 {
        let anchor = self
            .cells()
            .filter(|c| c.highlighted)
            .min_by_key(|c| (c.x + c.y, c.y, c.x))
            .map(|c| (c.x as i32, c.y as i32));
        let Some((ax, ay)) = anchor else {
            return 0;
        };

        let mut eliminated = 0;
        for cell in self.cells_mut().filter(|c| c.highlighted) {
            let distance = (cell.x as i32 - ax).abs() + (cell.y as i32 - ay).abs();
            cell.highlighted = false;
            cell.placed = false;
            cell.marked = false;
            cell.removed = true;
            cell.animation_progress = Some(-distance * CLEAR_STAGGER);
            eliminated += 1;
        }
        eliminated
    }

    /// Structural check for boards coming back from storage
    pub fn validate(&self) -> Result<(), String> {
        for (x, column) in self.cells.iter().enumerate() {
            for (y, cell) in column.iter().enumerate() {
                if (cell.x as usize, cell.y as usize) != (x, y) {
                    return Err(format!(
                        "cell at [{x}][{y}] claims position ({}, {})",
                        cell.x, cell.y
                    ));
                }
                if cell.placed && cell.removed {
                    return Err(format!("cell ({x}, {y}) is both placed and removed"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, y: i32, skip: Option<i32>) {
        for x in 0..BOARD_SIZE as i32 {
            if Some(x) != skip {
                board.cell_mut(IVec2::new(x, y)).unwrap().placed = true;
            }
        }
    }

    #[test]
    fn test_new_board_coordinates() {
        let board = Board::new();
        assert_eq!(board.cells().count(), 81);
        let cell = board.cell(IVec2::new(4, 7)).unwrap();
        assert_eq!((cell.x, cell.y), (4, 7));
        assert!(board.is_empty());
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_can_drop_bounds_and_occupancy() {
        let mut board = Board::new();
        let domino = Shape::from_rows(0, &["##"]);
        assert!(board.can_drop(&domino, IVec2::new(7, 0), false));
        assert!(!board.can_drop(&domino, IVec2::new(8, 0), false));
        assert!(!board.can_drop(&domino, IVec2::new(-1, 0), false));
        board.cell_mut(IVec2::new(1, 0)).unwrap().placed = true;
        assert!(!board.can_drop(&domino, IVec2::new(0, 0), false));
        assert!(board.can_drop(&domino, IVec2::new(2, 0), false));
    }

    #[test]
    fn test_include_marked_semantics() {
        let mut board = Board::new();
        let single = Shape::from_rows(0, &["#"]);
        let pos = IVec2::new(3, 3);

        board.cell_mut(pos).unwrap().marked = true;
        assert!(board.can_drop(&single, pos, false));
        assert!(!board.can_drop(&single, pos, true));

        // Placed but about to clear counts as free for hints
        let cell = board.cell_mut(pos).unwrap();
        cell.marked = false;
        cell.placed = true;
        cell.highlighted = true;
        assert!(!board.can_drop(&single, pos, false));
        assert!(board.can_drop(&single, pos, true));
    }

    #[test]
    fn test_removed_cells_are_free() {
        let mut board = Board::new();
        let cell = board.cell_mut(IVec2::new(0, 0)).unwrap();
        cell.removed = true;
        cell.animation_progress = Some(30);
        assert!(board.can_drop(&Shape::from_rows(0, &["#"]), IVec2::ZERO, false));

        board.place(&Shape::from_rows(0, &["#"]), IVec2::ZERO);
        let cell = board.cell(IVec2::ZERO).unwrap();
        assert!(cell.placed && !cell.removed);
        assert_eq!(cell.animation_progress, None);
    }

    #[test]
    fn test_fits_anywhere() {
        let mut board = Board::new();
        let five = Shape::from_rows(0, &["#####"]);
        assert!(board.fits_anywhere(&five, false));
        // Checkerboard of placed cells leaves no two adjacent free cells
        for cell in board.cells_mut() {
            cell.placed = (cell.x + cell.y) % 2 == 0;
        }
        assert!(!board.fits_anywhere(&five, false));
        assert!(board.fits_anywhere(&Shape::from_rows(0, &["#"]), false));
        assert!(board.fits_anywhere(&Shape::from_rows(0, &["#.", ".#"]), false));
    }

    #[test]
    fn test_row_elimination() {
        let mut board = Board::new();
        fill_row(&mut board, 3, Some(5));
        assert_eq!(board.check_elimination_marking(), 0);
        board.place(&Shape::from_rows(0, &["#"]), IVec2::new(5, 3));
        assert_eq!(board.check_elimination_marking(), 1);
        assert_eq!(board.eliminate_highlighted(), 9);
        for x in 0..9 {
            let cell = board.cell(IVec2::new(x, 3)).unwrap();
            assert!(!cell.placed && cell.removed);
        }
        assert!(board.is_empty());
    }

    #[test]
    fn test_marked_cells_complete_groups() {
        let mut board = Board::new();
        fill_row(&mut board, 0, Some(8));
        board.mark(&Shape::from_rows(0, &["#"]), IVec2::new(8, 0));
        assert_eq!(board.check_elimination_marking(), 1);
        assert!(board.cells().filter(|c| c.highlighted).count() == 9);
        board.reset_markings();
        assert!(board.cells().all(|c| !c.highlighted && !c.marked));
    }

    #[test]
    fn test_row_column_and_sector_together() {
        let mut board = Board::new();
        // Row y=0, column x=0 and the top-left sector, all missing (0, 0)
        for i in 1..9 {
            board.cell_mut(IVec2::new(i, 0)).unwrap().placed = true;
            board.cell_mut(IVec2::new(0, i)).unwrap().placed = true;
        }
        for x in 1..3 {
            for y in 1..3 {
                board.cell_mut(IVec2::new(x, y)).unwrap().placed = true;
            }
        }
        board.place(&Shape::from_rows(0, &["#"]), IVec2::ZERO);
        assert_eq!(board.check_elimination_marking(), 3);
        // 9 + 9 + 9 minus the overlaps
        assert_eq!(board.eliminate_highlighted(), 21);
    }

    #[test]
    fn test_clear_stagger_from_anchor() {
        let mut board = Board::new();
        fill_row(&mut board, 4, None);
        board.check_elimination_marking();
        board.eliminate_highlighted();
        assert_eq!(board.cell(IVec2::new(0, 4)).unwrap().animation_progress, Some(0));
        assert_eq!(
            board.cell(IVec2::new(3, 4)).unwrap().animation_progress,
            Some(-3 * CLEAR_STAGGER)
        );
        assert_eq!(
            board.cell(IVec2::new(8, 4)).unwrap().animation_progress,
            Some(-8 * CLEAR_STAGGER)
        );
    }

    #[test]
    fn test_clear_anchor_prefers_topmost_on_ties() {
        let mut board = Board::new();
        // Column 2 and row 2; (2, 0) and (0, 2) tie on x + y
        for i in 0..BOARD_SIZE as i32 {
            board.cell_mut(IVec2::new(2, i)).unwrap().placed = true;
            board.cell_mut(IVec2::new(i, 2)).unwrap().placed = true;
        }
        assert_eq!(board.check_elimination_marking(), 2);
        board.eliminate_highlighted();
        assert_eq!(board.cell(IVec2::new(2, 0)).unwrap().animation_progress, Some(0));
        assert_eq!(
            board.cell(IVec2::new(0, 2)).unwrap().animation_progress,
            Some(-4 * CLEAR_STAGGER)
        );
    }

    #[test]
    fn test_eliminate_without_highlight_is_noop() {
        let mut board = Board::new();
        fill_row(&mut board, 2, Some(0));
        assert_eq!(board.eliminate_highlighted(), 0);
        assert_eq!(board.placed_count(), 8);
    }

    #[test]
    fn test_validate_rejects_placed_and_removed() {
        let mut board = Board::new();
        let cell = board.cell_mut(IVec2::new(2, 2)).unwrap();
        cell.placed = true;
        cell.removed = true;
        assert!(board.validate().is_err());
    }
}
