use super::side::Side;

/// A single cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    /// Byte tag used by the canonical state encoding.
    pub fn to_byte(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::X => 1,
            Cell::O => 2,
        }
    }

    pub fn from_byte(b: u8) -> Option<Cell> {
        match b {
            0 => Some(Cell::Empty),
            1 => Some(Cell::X),
            2 => Some(Cell::O),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    ColumnFull,
    InvalidColumn,
}

/// A rectangular Connect-N board with gravity fill.
///
/// Row 0 is the bottom row; a dropped piece lands in the lowest empty cell
/// of its column. Dimensions are fixed at construction and validated once,
/// so later accesses index without re-checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
}

impl Board {
    /// Create a new empty board. Callers arrive through validated
    /// configuration, so zero-sized dimensions are a programming error.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "board dimensions must be nonzero");
        Board {
            cells: vec![Cell::Empty; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the cell at (row, col). Row 0 is the bottom.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.width + col]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row * self.width + col] = cell;
    }

    /// Check if a column is full (or out of range).
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= self.width {
            return true;
        }
        self.get(self.height - 1, col) != Cell::Empty
    }

    /// Drop a piece for `side` into a column, returning the row it landed in.
    pub fn drop_piece(&mut self, col: usize, side: Side) -> Result<usize, MoveError> {
        if col >= self.width {
            return Err(MoveError::InvalidColumn);
        }
        for row in 0..self.height {
            if self.get(row, col) == Cell::Empty {
                self.set(row, col, side.to_cell());
                return Ok(row);
            }
        }
        Err(MoveError::ColumnFull)
    }

    /// Check if the board is completely full.
    pub fn is_full(&self) -> bool {
        (0..self.width).all(|col| self.is_column_full(col))
    }

    /// Columns that can still accept a piece, in ascending order.
    pub fn available_columns(&self) -> Vec<usize> {
        (0..self.width)
            .filter(|&col| !self.is_column_full(col))
            .collect()
    }

    /// Raw cells in row-major order, bottom row first. Used by the state
    /// encoding.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(7, 6);
        for row in 0..6 {
            for col in 0..7 {
                assert_eq!(board.get(row, col), Cell::Empty);
            }
        }
    }

    #[test]
    fn test_drop_piece_stacks_upward() {
        let mut board = Board::new(7, 6);

        let row = board.drop_piece(3, Side::X).unwrap();
        assert_eq!(row, 0);
        assert_eq!(board.get(0, 3), Cell::X);

        let row = board.drop_piece(3, Side::O).unwrap();
        assert_eq!(row, 1);
        assert_eq!(board.get(1, 3), Cell::O);
    }

    #[test]
    fn test_column_full() {
        let mut board = Board::new(5, 3);
        for _ in 0..3 {
            board.drop_piece(0, Side::X).unwrap();
        }
        assert!(board.is_column_full(0));
        assert_eq!(board.drop_piece(0, Side::O), Err(MoveError::ColumnFull));
    }

    #[test]
    fn test_invalid_column() {
        let mut board = Board::new(5, 3);
        assert_eq!(board.drop_piece(5, Side::X), Err(MoveError::InvalidColumn));
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new(3, 3);
        for col in 0..3 {
            for _ in 0..3 {
                board.drop_piece(col, Side::X).unwrap();
            }
        }
        assert!(board.is_full());
        assert!(board.available_columns().is_empty());
    }

    #[test]
    fn test_available_columns_ascending() {
        let mut board = Board::new(4, 2);
        board.drop_piece(1, Side::X).unwrap();
        board.drop_piece(1, Side::O).unwrap();
        assert_eq!(board.available_columns(), vec![0, 2, 3]);
    }

    #[test]
    fn test_cell_byte_roundtrip() {
        for cell in [Cell::Empty, Cell::X, Cell::O] {
            assert_eq!(Cell::from_byte(cell.to_byte()), Some(cell));
        }
        assert_eq!(Cell::from_byte(7), None);
    }
}
