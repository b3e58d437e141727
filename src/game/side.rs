use super::board::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    X,
    O,
}

impl Side {
    /// Get the opposing side.
    pub fn other(self) -> Side {
        match self {
            Side::X => Side::O,
            Side::O => Side::X,
        }
    }

    /// Convert side to cell type.
    pub fn to_cell(self) -> Cell {
        match self {
            Side::X => Cell::X,
            Side::O => Cell::O,
        }
    }

    /// Get side name for display.
    pub fn name(self) -> &'static str {
        match self {
            Side::X => "X",
            Side::O => "O",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_side() {
        assert_eq!(Side::X.other(), Side::O);
        assert_eq!(Side::O.other(), Side::X);
    }

    #[test]
    fn test_side_name() {
        assert_eq!(Side::X.name(), "X");
        assert_eq!(Side::O.name(), "O");
    }
}
